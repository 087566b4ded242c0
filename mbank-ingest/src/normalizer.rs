//! Turns one transaction row into a `TransactionRecord`.
//!
//! Column layout of both exports:
//!   0 date (dd-mm-yyyy)  1 booking date  2 type  3 description  4 payee
//!   5 counter-party account  6 KS  7 VS  8 SS  9 amount  10 balance

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use mbank_core::{BankAccount, Currency, StatementHeader, TransactionRecord, TransactionType};

use crate::error::{IngestError, Result};
use crate::locale::Locale;
use crate::numbers::parse_amount;
use crate::reader::RawRow;
use crate::txn_id::transaction_id;

const DATE_USER: usize = 0;
const DATE: usize = 1;
const TRN_TYPE: usize = 2;
const MEMO: usize = 3;
const PAYEE: usize = 4;
const ACCOUNT_TO: usize = 5;
const AMOUNT: usize = 9;

/// Reference segments in output order: (tag, column)
const REFERENCE_FIELDS: [(&str, usize); 3] = [("VS", 7), ("SS", 8), ("KS", 6)];

const MIN_FIELDS: usize = 11;
const DATE_FORMAT: &str = "%d-%m-%Y";

/// More than 10 fields and two leading `dd-mm-yyyy` dates.
pub fn is_transaction_row(locale: &Locale, row: &[String]) -> bool {
    row.len() >= MIN_FIELDS
        && locale.row_date.is_match(&row[DATE_USER])
        && locale.row_date.is_match(&row[DATE])
}

/// Build the record for a row that passed [`is_transaction_row`].
pub fn normalize(locale: &Locale, header: &StatementHeader, mut row: RawRow) -> Result<TransactionRecord> {
    // The leading date is sometimes the processing date; the memo carries the
    // real execution date as year-month-day.
    if let Some(caps) = locale.executed_on.captures(field(&row, MEMO)) {
        let part = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let executed = format!("{}-{}-{}", part(3), part(2), part(1));
        row[DATE_USER] = executed;
    }

    let mut record = TransactionRecord {
        id: None,
        date: parse_row_date(field(&row, DATE), locale.offset)?,
        date_user: None,
        memo: field(&row, MEMO).to_string(),
        payee: field(&row, PAYEE).to_string(),
        amount: parse_amount(field(&row, AMOUNT))?,
        currency: header.currency.clone().map(Currency::new),
        trntype: TransactionType::Other,
        refnum: reference(&row),
        bank_account_to: counter_account(field(&row, ACCOUNT_TO)),
    };

    let date_user = field(&row, DATE_USER);
    if !date_user.is_empty() {
        record.date_user = Some(parse_row_date(date_user, locale.offset)?);
    }

    record.trntype = locale.classifier.classify(field(&row, TRN_TYPE));
    if record.trntype == TransactionType::Payment {
        // Card payments: "SHOP NAME/card number/..."
        if let Some(shop) = field(&row, MEMO).split('/').next() {
            record.payee = shop.trim().to_string();
        }
    }

    record.id = Some(transaction_id(&record));
    Ok(record)
}

/// `/VS<vs>/SS<ss>/KS<ks>`, empty segments left out
pub fn reference(row: &[String]) -> String {
    REFERENCE_FIELDS
        .iter()
        .filter(|(_, col)| !field(row, *col).is_empty())
        .map(|(tag, col)| format!("/{}{}", tag, field(row, *col)))
        .collect()
}

fn counter_account(text: &str) -> Option<BankAccount> {
    if text.is_empty() {
        return None;
    }
    let acct: String = text.chars().filter(|c| *c != ' ' && *c != '\'').collect();
    Some(BankAccount::new("", acct))
}

fn parse_row_date(text: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| IngestError::Date(text.to_string()))?;
    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .ok_or_else(|| IngestError::Date(text.to_string()))
}

fn field(row: &[String], i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}
