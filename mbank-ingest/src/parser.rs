//! mBank CSV statement parser, one instance per export file.

use std::path::{Path, PathBuf};

use mbank_core::{Statement, StatementHeader, StatementParser, TransactionRecord};

use crate::error::{IngestError, Result};
use crate::header::HeaderExtractor;
use crate::locale::{Locale, LocaleConfig};
use crate::normalizer::{is_transaction_row, normalize};
use crate::reader::{read_rows, RawRow, RowReader};

pub struct MBankParser {
    path: PathBuf,
    locale: Locale,
    header: StatementHeader,
    extractor: HeaderExtractor,
    rows_seen: usize,
}

impl MBankParser {
    pub fn new(path: impl Into<PathBuf>, locale: Locale) -> Self {
        Self {
            path: path.into(),
            locale,
            header: StatementHeader::default(),
            extractor: HeaderExtractor::new(),
            rows_seen: 0,
        }
    }

    /// Parser for one of the built-in locales (`mbank_cz`, `mbank_sk`).
    pub fn for_locale(path: impl Into<PathBuf>, name: &str) -> Result<Self> {
        let locale = LocaleConfig::by_name(name)?.compile()?;
        Ok(Self::new(path, locale))
    }

    pub fn header(&self) -> &StatementHeader {
        &self.header
    }

    fn process(&mut self, row: RawRow) -> Result<Option<TransactionRecord>> {
        self.extractor.observe(&self.locale, &row, &mut self.header)?;

        if !is_transaction_row(&self.locale, &row) {
            log::trace!("row {}: not a transaction, skipped", self.rows_seen);
            return Ok(None);
        }
        let record = normalize(&self.locale, &self.header, row)?;
        log::debug!("row {}: {}", self.rows_seen, record);
        Ok(Some(record))
    }
}

impl StatementParser for MBankParser {
    type Row = RawRow;
    type Error = IngestError;
    type Rows = RowReader;

    fn split_records(&mut self) -> Result<RowReader> {
        read_rows(&self.path, self.locale.encoding)
    }

    fn parse_record(&mut self, row: RawRow) -> Result<Option<TransactionRecord>> {
        self.rows_seen += 1;
        self.process(row).map_err(|e| e.at_row(self.rows_seen))
    }

    fn finish(self, transactions: Vec<TransactionRecord>) -> Statement {
        log::info!(
            "{}: {} rows, {} transactions ({})",
            self.path.display(),
            self.rows_seen,
            transactions.len(),
            self.locale.name
        );
        Statement::new(self.header, transactions)
    }
}

/// Parse an export file with the given locale.
pub fn parse_statement(path: impl AsRef<Path>, locale: Locale) -> Result<Statement> {
    MBankParser::new(path.as_ref(), locale).parse()
}
