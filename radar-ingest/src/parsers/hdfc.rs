//! HDFC Bank account alerts
//!
//! Expected text (after whitespace normalization):
//!   HDFC Bank: INR 1,499.00 debited from a/c XX1234 on 12-04-23 AMAZON. Avl bal: INR 24,599.35
//!   HDFC Bank: Rs 52,000.00 credited to a/c XX1234 on 01-05-24 by NEFT-ACME CORP SALARY. Avl bal: INR 76,599.35

use radar_core::TxnType;
use regex::Captures;

use crate::patterns::{Template, cap_amount, cap_text, cap_verbatim_date};
use crate::types::Fields;

const DEBIT: &str = concat!(
    r"(?i)HDFC Bank:? (?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"debited from a/c \w+ on (?P<date>\d{2}-\d{2}-\d{2,4}) ",
    r"(?P<desc>.+?)",
    r"(?:\.?\s+Avl bal:? (?:INR|Rs\.?)\s?(?P<balance>\d[\d,]*(?:\.\d+)?)|\.\s|\.?$)"
);

const CREDIT: &str = concat!(
    r"(?i)HDFC Bank:? (?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"credited to a/c \w+ on (?P<date>\d{2}-\d{2}-\d{2,4})(?: by| from)? ",
    r"(?P<desc>.+?)",
    r"(?:\.?\s+Avl bal:? (?:INR|Rs\.?)\s?(?P<balance>\d[\d,]*(?:\.\d+)?)|\.\s|\.?$)"
);

fn extract(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_verbatim_date(caps, "date")?,
        description: cap_text(caps, "desc")?,
        balance: cap_amount(caps, "balance"),
    })
}

pub fn templates() -> [Template; 2] {
    [
        Template {
            name: "hdfc_debit",
            bank: Some("HDFC"),
            txn_type: TxnType::Debit,
            pattern: DEBIT,
            extract,
        },
        Template {
            name: "hdfc_credit",
            bank: Some("HDFC"),
            txn_type: TxnType::Credit,
            pattern: CREDIT,
            extract,
        },
    ]
}
