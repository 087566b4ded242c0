//! Statement container types shared by every bank parser.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// ISO currency code attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
}

impl Currency {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Reference to the other side of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Bank routing code; mBank exports embed it in `acct_id` so this is usually empty
    pub bank_id: String,
    pub acct_id: String,
}

impl BankAccount {
    pub fn new(bank_id: impl Into<String>, acct_id: impl Into<String>) -> Self {
        Self {
            bank_id: bank_id.into(),
            acct_id: acct_id.into(),
        }
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bank_id.is_empty() {
            f.write_str(&self.acct_id)
        } else {
            write!(f, "{}/{}", self.acct_id, self.bank_id)
        }
    }
}

/// Transaction categories, named after the OFX `TRNTYPE` values they map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Generic credit
    Credit,
    /// Generic debit
    Debit,
    /// ATM debit or credit
    Atm,
    /// Electronic (card) payment
    Payment,
    /// Merchant initiated debit
    DirectDebit,
    /// Transfer
    Xfer,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Atm => "ATM",
            TransactionType::Payment => "PAYMENT",
            TransactionType::DirectDebit => "DIRECTDEBIT",
            TransactionType::Xfer => "XFER",
            TransactionType::Other => "OTHER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized statement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Stable identifier derived from the other fields; `None` until computed
    pub id: Option<String>,
    /// Date the bank booked the transaction
    pub date: DateTime<FixedOffset>,
    /// Date the user executed the transaction
    pub date_user: Option<DateTime<FixedOffset>>,
    pub memo: String,
    pub payee: String,
    /// Positive = incoming, negative = outgoing
    pub amount: f64,
    pub currency: Option<Currency>,
    pub trntype: TransactionType,
    /// Composite payment reference, e.g. `/VS123/KS0308`
    pub refnum: String,
    pub bank_account_to: Option<BankAccount>,
}

/// Canonical textual form. Transaction ids are hashed from this, so changing
/// the layout changes every id ever generated.
impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransactionRecord(date={}, date_user={}, memo={:?}, payee={:?}, amount={}, currency={}, trntype={}, refnum={:?}, bank_account_to={})",
            self.date.to_rfc3339(),
            self.date_user
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "None".to_string()),
            self.memo,
            self.payee,
            self.amount,
            self.currency
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "None".to_string()),
            self.trntype,
            self.refnum,
            self.bank_account_to
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "None".to_string()),
        )
    }
}

/// Statement-level metadata. Every field starts unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementHeader {
    pub currency: Option<String>,
    pub bank_id: Option<String>,
    pub account_id: Option<String>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub start_balance: Option<f64>,
    pub end_balance: Option<f64>,
}

/// Full parse result for one export file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub header: StatementHeader,
    /// In source row order
    pub transactions: Vec<TransactionRecord>,
}

impl Statement {
    pub fn new(header: StatementHeader, transactions: Vec<TransactionRecord>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Sum of all transaction amounts
    pub fn transactions_total(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    /// Check opening balance + movements against the closing balance.
    ///
    /// Returns `None` when either balance is missing from the header.
    pub fn balance_consistent(&self, tolerance: f64) -> Option<bool> {
        let start = self.header.start_balance?;
        let end = self.header.end_balance?;
        Some((start + self.transactions_total() - end).abs() <= tolerance)
    }
}
