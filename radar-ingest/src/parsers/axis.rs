//! Axis Bank UPI alerts (multi-line; normalized to one line before matching)
//!
//! Expected text:
//!   INR 250.00 debited A/c no. XX9012 10-03-24, 14:22:10 UPI/P2M/412345678901/ZOMATO Not you? SMS BLOCKUPI Cust ID to 919951860002 Axis Bank
//!   INR 1,000.00 credited A/c no. XX9012 10-03-24, 09:01:44 UPI/P2A/412345678902/RAHUL SHARMA Not you? SMS BLOCKUPI - Axis Bank

use radar_core::TxnType;
use regex::Captures;

use crate::patterns::{Template, cap_amount, cap_text, cap_verbatim_date};
use crate::types::Fields;

const UPI_DEBIT: &str = concat!(
    r"(?i)(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) debited ",
    r"A/c no\. \w+ (?P<date>\d{2}-\d{2}-\d{2,4}),? [\d:]+ ",
    r"UPI/\w+/\d+/(?P<desc>.+?)(?: Not you|\.?$)"
);

const UPI_CREDIT: &str = concat!(
    r"(?i)(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) credited ",
    r"A/c no\. \w+ (?P<date>\d{2}-\d{2}-\d{2,4}),? [\d:]+ ",
    r"UPI/\w+/\d+/(?P<desc>.+?)(?: Not you|\.?$)"
);

fn extract(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_verbatim_date(caps, "date")?,
        description: cap_text(caps, "desc")?,
        balance: None,
    })
}

pub fn templates() -> [Template; 2] {
    [
        Template {
            name: "axis_upi_debit",
            bank: Some("AXIS"),
            txn_type: TxnType::Debit,
            pattern: UPI_DEBIT,
            extract,
        },
        Template {
            name: "axis_upi_credit",
            bank: Some("AXIS"),
            txn_type: TxnType::Credit,
            pattern: UPI_CREDIT,
            extract,
        },
    ]
}
