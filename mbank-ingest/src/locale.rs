//! Locale configuration: everything that differs between the Czech and the
//! Slovak mBank exports.
//!
//! Label patterns replace accented letters with `.` so exports written with or
//! without diacritics both match.

use std::fs;
use std::path::Path;

use chrono::FixedOffset;
use encoding_rs::Encoding;
use mbank_core::TransactionType;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::{compile_pattern, Classification, Classifier, PatternRule, PhraseRule};
use crate::error::{IngestError, Result};

/// Lead-field patterns of the marker rows. The value sits on the next row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderLabels {
    pub currency: String,
    pub bank_id: String,
    pub account_id: String,
    pub period: String,
    /// Matched against field 6 of the row holding the balance itself
    pub opening_balance: String,
    pub closing_balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub name: String,
    /// WHATWG encoding label of the export
    pub encoding: String,
    pub utc_offset_hours: i32,
    /// Finds the execution date inside the memo. The bank prints it as
    /// year-month-day, so the groups are read back to front.
    pub executed_on: String,
    pub labels: HeaderLabels,
    pub classification: Classification,
}

impl LocaleConfig {
    /// mBank Czech Republic
    pub fn mbank_cz() -> Self {
        Self {
            name: "mbank_cz".to_string(),
            encoding: "windows-1250".to_string(),
            utc_offset_hours: 1,
            labels: HeaderLabels {
                currency: r"^#M.na ..tu".to_string(),
                bank_id: r"^#BIC".to_string(),
                account_id: r"^#..slo ..tu:".to_string(),
                period: r"^#Za obdob.".to_string(),
                opening_balance: r"^#Po..te.n. z.statek:".to_string(),
                closing_balance: r"^#Kone.n. z.statek:".to_string(),
            },
            executed_on: r"DATUM PROVEDEN. TRANSAKCE: (\d+)-(\d+)-(\d+)".to_string(),
            classification: Classification::PatternTable {
                fallback: TransactionType::Other,
                rules: vec![
                    rule(TransactionType::Credit, &["P..CHOZ. PLATBA Z"]),
                    rule(TransactionType::Debit, &["ODCHOZ. PLATBA DO", ".V.R"]),
                    rule(TransactionType::Atm, &["BANKOMAT"]),
                    rule(TransactionType::Payment, &["KARTOU"]),
                    rule(TransactionType::DirectDebit, &["INKASO", "SIPO"]),
                ],
            },
        }
    }

    /// mBank Slovakia
    pub fn mbank_sk() -> Self {
        Self {
            name: "mbank_sk".to_string(),
            encoding: "windows-1250".to_string(),
            utc_offset_hours: 1,
            labels: HeaderLabels {
                currency: r"^#Mena ..tu".to_string(),
                bank_id: r"^#BIC".to_string(),
                account_id: r"^#..slo ..tu:".to_string(),
                period: r"^#Za obdob.".to_string(),
                opening_balance: r"^#Po.iato.n. zostatok:".to_string(),
                closing_balance: r"^#Kone.n. zostatok:".to_string(),
            },
            executed_on: r"D.TUM VYKONANIA TRANSAKCIE: (\d+)-(\d+)-(\d+)".to_string(),
            classification: Classification::Equality {
                fallback: TransactionType::Xfer,
                phrases: vec![
                    phrase("PLATBA KARTOU", TransactionType::Payment),
                    phrase("VÝBER V BANKOMATE", TransactionType::Atm),
                    phrase("INKASO", TransactionType::DirectDebit),
                ],
            },
        }
    }

    /// Look up a built-in locale by name.
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "mbank_cz" => Ok(Self::mbank_cz()),
            "mbank_sk" => Ok(Self::mbank_sk()),
            other => Err(IngestError::UnknownLocale(other.to_string())),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| IngestError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| IngestError::Config(e.to_string()))
    }

    /// Validate and compile every pattern.
    pub fn compile(&self) -> Result<Locale> {
        let encoding = Encoding::for_label(self.encoding.as_bytes())
            .ok_or_else(|| IngestError::UnknownEncoding(self.encoding.clone()))?;
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or(IngestError::UtcOffset(self.utc_offset_hours))?;

        let executed_on = compile_pattern(&self.executed_on)?;
        if executed_on.captures_len() < 4 {
            return Err(IngestError::DatePattern(self.executed_on.clone()));
        }

        Ok(Locale {
            name: self.name.clone(),
            encoding,
            offset,
            labels: LabelPatterns {
                currency: compile_pattern(&self.labels.currency)?,
                bank_id: compile_pattern(&self.labels.bank_id)?,
                account_id: compile_pattern(&self.labels.account_id)?,
                period: compile_pattern(&self.labels.period)?,
                opening_balance: compile_pattern(&self.labels.opening_balance)?,
                closing_balance: compile_pattern(&self.labels.closing_balance)?,
            },
            executed_on,
            row_date: compile_pattern(r"^\d{2}-\d{2}-\d{4}$")?,
            classifier: Classifier::compile(&self.classification)?,
        })
    }
}

/// Load a locale override from a TOML file.
pub fn load_locale(path: impl AsRef<Path>) -> Result<LocaleConfig> {
    let p = path.as_ref();
    let s = fs::read_to_string(p).map_err(|source| IngestError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    LocaleConfig::from_toml_str(&s).map_err(|e| match e {
        IngestError::Config(msg) => IngestError::Config(format!("{}: {msg}", p.display())),
        other => other,
    })
}

fn rule(category: TransactionType, markers: &[&str]) -> PatternRule {
    PatternRule {
        category,
        markers: markers.iter().map(|m| m.to_string()).collect(),
    }
}

fn phrase(phrase: &str, category: TransactionType) -> PhraseRule {
    PhraseRule {
        phrase: phrase.to_string(),
        category,
    }
}

#[derive(Debug, Clone)]
pub struct LabelPatterns {
    pub currency: Regex,
    pub bank_id: Regex,
    pub account_id: Regex,
    pub period: Regex,
    pub opening_balance: Regex,
    pub closing_balance: Regex,
}

/// Compiled locale, ready for parsing
#[derive(Debug, Clone)]
pub struct Locale {
    pub name: String,
    pub encoding: &'static Encoding,
    pub offset: FixedOffset,
    pub labels: LabelPatterns,
    pub executed_on: Regex,
    /// Shape of the two leading date fields of a transaction row
    pub row_date: Regex,
    pub classifier: Classifier,
}

impl Locale {
    pub fn mbank_cz() -> Result<Self> {
        LocaleConfig::mbank_cz().compile()
    }

    pub fn mbank_sk() -> Result<Self> {
        LocaleConfig::mbank_sk().compile()
    }
}
