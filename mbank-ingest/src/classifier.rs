//! Transaction type classification from the bank's free-text transaction
//! description.
//!
//! Two policies exist because the two exports describe transactions
//! differently: the Czech export varies its wording, so it is matched against
//! an ordered marker table; the Slovak one uses a handful of fixed phrases.

use mbank_core::TransactionType;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// One row of a marker table: any marker found in the description selects `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    pub category: TransactionType,
    /// Regex fragments, matched anywhere on the description's first line
    pub markers: Vec<String>,
}

/// Exact description -> category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseRule {
    pub phrase: String,
    pub category: TransactionType,
}

/// Classification policy as written in a locale config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Classification {
    /// Rules are tried top to bottom; first hit wins.
    PatternTable {
        fallback: TransactionType,
        rules: Vec<PatternRule>,
    },
    Equality {
        fallback: TransactionType,
        phrases: Vec<PhraseRule>,
    },
}

/// Compiled classification policy
#[derive(Debug, Clone)]
pub enum Classifier {
    PatternTable {
        rules: Vec<(TransactionType, Vec<Regex>)>,
        fallback: TransactionType,
    },
    Equality {
        phrases: Vec<(String, TransactionType)>,
        fallback: TransactionType,
    },
}

impl Classifier {
    pub fn compile(policy: &Classification) -> Result<Self> {
        Ok(match policy {
            Classification::PatternTable { rules, fallback } => {
                let mut compiled = Vec::with_capacity(rules.len());
                for rule in rules {
                    let markers = rule
                        .markers
                        .iter()
                        .map(|m| compile_pattern(&anchored(m)))
                        .collect::<Result<Vec<_>>>()?;
                    compiled.push((rule.category, markers));
                }
                Classifier::PatternTable {
                    rules: compiled,
                    fallback: *fallback,
                }
            }
            Classification::Equality { phrases, fallback } => Classifier::Equality {
                phrases: phrases
                    .iter()
                    .map(|p| (p.phrase.clone(), p.category))
                    .collect(),
                fallback: *fallback,
            },
        })
    }

    /// Always returns exactly one category.
    pub fn classify(&self, description: &str) -> TransactionType {
        match self {
            Classifier::PatternTable { rules, fallback } => rules
                .iter()
                .find(|(_, markers)| markers.iter().any(|m| m.is_match(description)))
                .map(|(category, _)| *category)
                .unwrap_or(*fallback),
            Classifier::Equality { phrases, fallback } => phrases
                .iter()
                .find(|(phrase, _)| phrase == description)
                .map(|(_, category)| *category)
                .unwrap_or(*fallback),
        }
    }
}

/// A marker hits when it occurs on the first line of the description.
/// `.` stays line-bound, so text after an embedded newline is not searched.
fn anchored(marker: &str) -> String {
    format!("^.*(?:{marker})")
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| IngestError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleConfig;

    fn cz() -> Classifier {
        Classifier::compile(&LocaleConfig::mbank_cz().classification).unwrap()
    }

    fn sk() -> Classifier {
        Classifier::compile(&LocaleConfig::mbank_sk().classification).unwrap()
    }

    #[test]
    fn test_bankomat_anywhere_is_atm() {
        let c = cz();
        assert_eq!(c.classify("VÝBĚR Z BANKOMATU"), TransactionType::Atm);
        assert_eq!(c.classify("BANKOMAT"), TransactionType::Atm);
        assert_eq!(c.classify("vklad BANKOMAT praha"), TransactionType::Atm);
    }

    #[test]
    fn test_cz_marker_table() {
        let c = cz();
        assert_eq!(c.classify("PŘÍCHOZÍ PLATBA Z MBANK"), TransactionType::Credit);
        assert_eq!(c.classify("PRICHOZI PLATBA Z JINE BANKY"), TransactionType::Credit);
        assert_eq!(c.classify("ODCHOZÍ PLATBA DO JINÉ BANKY"), TransactionType::Debit);
        assert_eq!(c.classify("PLATBA KARTOU"), TransactionType::Payment);
        assert_eq!(c.classify("INKASO"), TransactionType::DirectDebit);
        assert_eq!(c.classify("PLATBA SIPO"), TransactionType::DirectDebit);
        assert_eq!(c.classify("POPLATEK ZA VEDENÍ ÚČTU"), TransactionType::Other);
    }

    #[test]
    fn test_cz_first_rule_wins() {
        assert_eq!(cz().classify("VÝBĚR Z BANKOMATU KARTOU"), TransactionType::Atm);
        assert_eq!(cz().classify("SPLÁTKA ÚVĚRU KARTOU"), TransactionType::Debit);
    }

    #[test]
    fn test_markers_only_search_first_line() {
        let c = cz();
        assert_eq!(c.classify("POPLATEK\nBANKOMAT"), TransactionType::Other);
        assert_eq!(c.classify("BANKOMAT\nPOPLATEK"), TransactionType::Atm);
    }

    #[test]
    fn test_sk_exact_phrases() {
        let c = sk();
        assert_eq!(c.classify("PLATBA KARTOU"), TransactionType::Payment);
        assert_eq!(c.classify("VÝBER V BANKOMATE"), TransactionType::Atm);
        assert_eq!(c.classify("INKASO"), TransactionType::DirectDebit);
        assert_eq!(c.classify("PLATBA KARTOU ZAHRANICIE"), TransactionType::Xfer);
        assert_eq!(c.classify(""), TransactionType::Xfer);
    }

    #[test]
    fn test_invalid_marker_is_pattern_error() {
        let policy = Classification::PatternTable {
            rules: vec![PatternRule {
                category: TransactionType::Atm,
                markers: vec!["(".to_string()],
            }],
            fallback: TransactionType::Other,
        };
        assert!(matches!(Classifier::compile(&policy), Err(IngestError::Pattern { .. })));
    }
}
