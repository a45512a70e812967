//! ICICI Bank card and account alerts
//!
//! Expected text:
//!   INR 2,350.00 spent using ICICI Bank Card XX5678 on 05-Mar-24 on SWIGGY. Avl Limit: INR 1,20,000.00. If not you, call 18002662.
//!   ICICI Bank Acct XX123 debited for Rs 500.00 on 01-Jan-24; SWIGGY credited. UPI:412345678901. Call 18002662 for dispute.
//!   ICICI Bank Account XX123 credited:Rs. 1,500.00 on 02-Jan-24. Info NEFT-ACME. Available Balance is Rs. 10,000.00.

use radar_core::TxnType;
use regex::Captures;

use crate::patterns::{Template, cap_amount, cap_month_date, cap_text};
use crate::types::Fields;

const CARD_SPEND: &str = concat!(
    r"(?i)(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"spent (?:using|on) ICICI Bank Card \w+ ",
    r"on (?P<date>\d{1,2}-[A-Za-z]{3}-\d{2,4}) ",
    r"(?:at|on) (?P<desc>.+?)(?:\.\s|\.?$)"
);

const ACCT_DEBIT: &str = concat!(
    r"(?i)ICICI Bank Acc(?:oun)?t \w+ debited (?:for|with) ",
    r"(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"on (?P<date>\d{1,2}-[A-Za-z]{3}-\d{2,4}); ",
    r"(?P<desc>.+?) credited"
);

const ACCT_CREDIT: &str = concat!(
    r"(?i)ICICI Bank Acc(?:oun)?t \w+ credited:?\s?",
    r"(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"on (?P<date>\d{1,2}-[A-Za-z]{3}-\d{2,4})\.? ",
    r"Info:? (?P<desc>.+?)\.\s?",
    r"Avail(?:able)? Bal(?:ance)?(?: is)?:? (?:INR|Rs\.?)\s?(?P<balance>\d[\d,]*(?:\.\d+)?)"
);

fn extract(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_month_date(caps, "date")?,
        description: cap_text(caps, "desc")?,
        balance: cap_amount(caps, "balance"),
    })
}

pub fn templates() -> [Template; 3] {
    [
        Template {
            name: "icici_card_spend",
            bank: Some("ICICI"),
            txn_type: TxnType::Debit,
            pattern: CARD_SPEND,
            extract,
        },
        Template {
            name: "icici_acct_debit",
            bank: Some("ICICI"),
            txn_type: TxnType::Debit,
            pattern: ACCT_DEBIT,
            extract,
        },
        Template {
            name: "icici_acct_credit",
            bank: Some("ICICI"),
            txn_type: TxnType::Credit,
            pattern: ACCT_CREDIT,
            extract,
        },
    ]
}
