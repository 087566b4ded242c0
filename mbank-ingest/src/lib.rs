//! mbank-ingest: parsers for mBank CSV statement exports (Czech and Slovak).
//!
//! Both exports share one layout and differ only in header labels and
//! transaction type wording, so a single parser runs on a [`Locale`].

pub mod classifier;
pub mod error;
pub mod header;
pub mod locale;
pub mod normalizer;
pub mod numbers;
pub mod parser;
pub mod reader;
pub mod txn_id;

pub use classifier::{Classification, Classifier};
pub use error::{IngestError, Result};
pub use locale::{load_locale, Locale, LocaleConfig};
pub use parser::{parse_statement, MBankParser};
pub use reader::RawRow;
