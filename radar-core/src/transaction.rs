//! Transaction record extracted from a single bank SMS

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::date;

/// Direction of money movement relative to the account holder
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxnType {
    /// Money leaving the account
    #[default]
    #[serde(rename = "debit")]
    Debit,
    /// Money entering the account
    #[serde(rename = "credit")]
    Credit,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Debit => "debit",
            TxnType::Credit => "credit",
        }
    }
}

/// A transaction parsed out of a bank or payment-service SMS.
///
/// Values are never edited in place: `with_category` and `with_bank`
/// consume the record and hand back a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique identifier, generated at extraction time
    pub id: String,
    /// Amount in rupees, never negative
    pub amount: f64,
    /// Bank-local date text (dd-mm-yy or dd-mm-yyyy, sometimes with '/')
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    /// Post-transaction balance, only when the message reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    /// Whitespace-normalized source text
    #[serde(rename = "originalSMS")]
    pub original_sms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Transaction {
    /// Create a new uncategorized transaction with a fresh id.
    ///
    /// Negative or non-finite amounts are clamped to zero so the record
    /// always carries a usable, non-negative amount.
    pub fn new(
        amount: f64,
        date: impl Into<String>,
        description: impl Into<String>,
        txn_type: TxnType,
        original_sms: impl Into<String>,
    ) -> Self {
        let amount = if amount.is_finite() && amount > 0.0 { amount } else { 0.0 };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            date: date.into(),
            description: description.into(),
            txn_type,
            balance: None,
            bank: None,
            original_sms: original_sms.into(),
            category: None,
        }
    }

    pub fn with_balance(self, balance: Option<f64>) -> Self {
        Self { balance, ..self }
    }

    pub fn with_bank(self, bank: Option<&str>) -> Self {
        Self {
            bank: bank.map(str::to_string),
            ..self
        }
    }

    pub fn with_category(self, category: Category) -> Self {
        Self {
            category: Some(category),
            ..self
        }
    }

    pub fn is_debit(&self) -> bool {
        self.txn_type == TxnType::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.txn_type == TxnType::Credit
    }

    /// Signed amount: credits positive, debits negative
    pub fn signed_amount(&self) -> f64 {
        match self.txn_type {
            TxnType::Credit => self.amount,
            TxnType::Debit => -self.amount,
        }
    }

    /// Calendar date derived from the textual `date`, if it is in a known form
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        date::parse_sms_date(&self.date)
    }
}
