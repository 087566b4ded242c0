use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid {encoding} text")]
    Decode { path: PathBuf, encoding: &'static str },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid number: '{0}'")]
    Number(String),

    #[error("invalid date: '{0}'")]
    Date(String),

    #[error("row {row}: {source}")]
    AtRow {
        row: usize,
        #[source]
        source: Box<IngestError>,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern '{0}' needs three capture groups (day, month, year)")]
    DatePattern(String),

    #[error("UTC offset out of range: {0} hours")]
    UtcOffset(i32),

    #[error("invalid locale config: {0}")]
    Config(String),

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("unknown locale: {0}")]
    UnknownLocale(String),
}

impl IngestError {
    /// Attach the 1-based row number the error was raised at.
    pub fn at_row(self, row: usize) -> Self {
        match self {
            IngestError::AtRow { .. } => self,
            other => IngestError::AtRow {
                row,
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
