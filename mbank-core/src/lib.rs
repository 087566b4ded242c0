//! mbank-core: statement container types and the parser protocol shared by the
//! mBank CSV parsers.

pub mod parser;
pub mod statement;

pub use parser::StatementParser;
pub use statement::{
    BankAccount, Currency, Statement, StatementHeader, TransactionRecord, TransactionType,
};
