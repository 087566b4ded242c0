//! Statement header extraction.
//!
//! mBank writes metadata as a label row (`#Měna účtu:`) followed by a value
//! row (`CZK`). The scanner remembers which label the previous row carried and
//! reads the value from the current one. Balances are the exception: label and
//! value share a row, in fields 6 and 7.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use mbank_core::StatementHeader;

use crate::error::{IngestError, Result};
use crate::locale::Locale;
use crate::numbers::parse_balance;

/// Label seen on the previous row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Currency,
    BankId,
    AccountId,
    Period,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Normal,
    AwaitingValue(Marker),
}

#[derive(Debug, Clone, Default)]
pub struct HeaderExtractor {
    state: ScanState,
}

impl HeaderExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feed one row. Fields already set are never overwritten.
    pub fn observe(&mut self, locale: &Locale, row: &[String], header: &mut StatementHeader) -> Result<()> {
        let lead = row.first().map(String::as_str).unwrap_or("");

        if let ScanState::AwaitingValue(marker) = self.state {
            match marker {
                Marker::Currency => set_once(&mut header.currency, "currency", || Ok(lead.to_string()))?,
                Marker::BankId => set_once(&mut header.bank_id, "bank_id", || Ok(lead.to_string()))?,
                Marker::AccountId => {
                    set_once(&mut header.account_id, "account_id", || Ok(lead.to_string()))?
                }
                Marker::Period => {
                    if header.start_date.is_none() {
                        let end = row.get(1).map(String::as_str).unwrap_or("");
                        header.start_date = Some(period_bound(lead, locale.offset, NaiveTime::MIN)?);
                        header.end_date = Some(period_bound(end, locale.offset, end_of_day(end)?)?);
                        log::trace!("header period: {lead} - {end}");
                    } else {
                        log::warn!("ignoring repeated statement period {lead}");
                    }
                }
            }
        }

        if let Some(label) = row.get(6) {
            let value = row.get(7).map(String::as_str).unwrap_or("");
            if locale.labels.opening_balance.is_match(label) {
                set_once(&mut header.start_balance, "start_balance", || parse_balance(value))?;
            }
            if locale.labels.closing_balance.is_match(label) {
                set_once(&mut header.end_balance, "end_balance", || parse_balance(value))?;
            }
        }

        self.state = match marker_for(locale, lead) {
            Some(marker) => ScanState::AwaitingValue(marker),
            None => ScanState::Normal,
        };
        Ok(())
    }
}

fn marker_for(locale: &Locale, lead: &str) -> Option<Marker> {
    let labels = &locale.labels;
    if labels.currency.is_match(lead) {
        Some(Marker::Currency)
    } else if labels.bank_id.is_match(lead) {
        Some(Marker::BankId)
    } else if labels.account_id.is_match(lead) {
        Some(Marker::AccountId)
    } else if labels.period.is_match(lead) {
        Some(Marker::Period)
    } else {
        None
    }
}

fn set_once<T: std::fmt::Debug>(
    slot: &mut Option<T>,
    field: &str,
    value: impl FnOnce() -> Result<T>,
) -> Result<()> {
    if slot.is_some() {
        log::warn!("header field {field} already set, ignoring repeated marker");
        return Ok(());
    }
    let v = value()?;
    log::trace!("header {field} = {v:?}");
    *slot = Some(v);
    Ok(())
}

fn end_of_day(text: &str) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(|| IngestError::Date(text.to_string()))
}

/// `01.03.2023` at `time` in the locale's fixed offset
fn period_bound(text: &str, offset: FixedOffset, time: NaiveTime) -> Result<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y")
        .map_err(|_| IngestError::Date(text.to_string()))?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| IngestError::Date(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn scan(locale: &Locale, rows: &[Vec<String>]) -> Result<StatementHeader> {
        let mut header = StatementHeader::default();
        let mut ex = HeaderExtractor::new();
        for r in rows {
            ex.observe(locale, r, &mut header)?;
        }
        Ok(header)
    }

    #[test]
    fn test_period_bounds() {
        let cz = Locale::mbank_cz().unwrap();
        let h = scan(&cz, &[row(&["#Za období:", ""]), row(&["01.03.2023", "31.03.2023"])]).unwrap();
        assert_eq!(h.start_date.unwrap().to_rfc3339(), "2023-03-01T00:00:00+01:00");
        assert_eq!(h.end_date.unwrap().to_rfc3339(), "2023-03-31T23:59:59+01:00");
    }

    #[test]
    fn test_first_currency_wins() {
        let cz = Locale::mbank_cz().unwrap();
        let h = scan(
            &cz,
            &[
                row(&["#Měna účtu:"]),
                row(&["CZK"]),
                row(&["#Měna účtu:"]),
                row(&["EUR"]),
            ],
        )
        .unwrap();
        assert_eq!(h.currency.as_deref(), Some("CZK"));
    }

    #[test]
    fn test_label_value_pairs() {
        let cz = Locale::mbank_cz().unwrap();
        let h = scan(
            &cz,
            &[
                row(&["#Číslo účtu:", ""]),
                row(&["670100-2201234567/6210", ""]),
                row(&["#BIC", ""]),
                row(&["BREXCZPP", ""]),
            ],
        )
        .unwrap();
        assert_eq!(h.account_id.as_deref(), Some("670100-2201234567/6210"));
        assert_eq!(h.bank_id.as_deref(), Some("BREXCZPP"));
        assert_eq!(h.currency, None);
    }

    #[test]
    fn test_value_must_directly_follow_label() {
        let cz = Locale::mbank_cz().unwrap();
        let h = scan(&cz, &[row(&["#BIC"]), row(&[""]), row(&["BREXCZPP"])]).unwrap();
        assert_eq!(h.bank_id.as_deref(), Some(""));
    }

    #[test]
    fn test_balances_from_fields_6_and_7() {
        let cz = Locale::mbank_cz().unwrap();
        let opening = row(&["", "", "", "", "", "", "#Počáteční zůstatek:", "12.345,67 CZK"]);
        let closing = row(&["", "", "", "", "", "", "#Konečný zůstatek:", "-1 000,50 CZK"]);
        let again = row(&["", "", "", "", "", "", "#Počáteční zůstatek:", "0,00 CZK"]);
        let h = scan(&cz, &[opening, closing, again]).unwrap();
        assert_eq!(h.start_balance, Some(12345.67));
        assert_eq!(h.end_balance, Some(-1000.5));
    }

    #[test]
    fn test_bad_balance_is_error() {
        let cz = Locale::mbank_cz().unwrap();
        let bad = row(&["", "", "", "", "", "", "#Konečný zůstatek:", "n/a"]);
        assert!(matches!(scan(&cz, &[bad]), Err(IngestError::Number(_))));
    }

    #[test]
    fn test_state_transitions() {
        let cz = Locale::mbank_cz().unwrap();
        let mut header = StatementHeader::default();
        let mut ex = HeaderExtractor::new();
        assert_eq!(ex.state(), ScanState::Normal);
        ex.observe(&cz, &row(&["#Za období:"]), &mut header).unwrap();
        assert_eq!(ex.state(), ScanState::AwaitingValue(Marker::Period));
        ex.observe(&cz, &row(&["01.01.2024", "31.01.2024"]), &mut header).unwrap();
        assert_eq!(ex.state(), ScanState::Normal);
    }
}
