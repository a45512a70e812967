//! Kotak Mahindra Bank UPI alerts
//!
//! Expected text:
//!   Sent Rs.150.00 from Kotak Bank AC X7788 to merchant@okaxis on 11-03-24.UPI Ref 407123456789. Not you, https://kotak.com/KBANKT/Fraud
//!   Received Rs.500.00 in your Kotak Bank AC X7788 from rahul@okicici on 11-03-24.UPI Ref:407123456790.

use radar_core::TxnType;
use regex::Captures;

use crate::patterns::{Template, cap_amount, cap_text, cap_verbatim_date};
use crate::types::Fields;

const SENT: &str = concat!(
    r"(?i)Sent (?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"from Kotak Bank AC \w+ to (?P<desc>\S+) ",
    r"on (?P<date>\d{2}-\d{2}-\d{2,4})"
);

const RECEIVED: &str = concat!(
    r"(?i)Received (?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"in your Kotak Bank AC \w+ from (?P<desc>\S+) ",
    r"on (?P<date>\d{2}-\d{2}-\d{2,4})"
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
            name: "kotak_upi_sent",
            bank: Some("KOTAK"),
            txn_type: TxnType::Debit,
            pattern: SENT,
            extract,
        },
        Template {
            name: "kotak_upi_received",
            bank: Some("KOTAK"),
            txn_type: TxnType::Credit,
            pattern: RECEIVED,
            extract,
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::patterns::BankPattern;

    use super::*;

    #[test]
    fn test_sent() {
        let p = BankPattern::compile(templates()[0]).unwrap();
        let txn = p
            .apply("Sent Rs.150.00 from Kotak Bank AC X7788 to merchant@okaxis on 11-03-24.UPI Ref 407123456789. Not you, https://kotak.com/KBANKT/Fraud")
            .unwrap();
        assert_eq!(txn.amount, 150.0);
        assert_eq!(txn.description, "merchant@okaxis");
        assert_eq!(txn.date, "11-03-24");
    }

    #[test]
    fn test_received() {
        let p = BankPattern::compile(templates()[1]).unwrap();
        let txn = p
            .apply("Received Rs.500.00 in your Kotak Bank AC X7788 from rahul@okicici on 11-03-24.UPI Ref:407123456790.")
            .unwrap();
        assert_eq!(txn.amount, 500.0);
        assert_eq!(txn.txn_type, TxnType::Credit);
        assert_eq!(txn.description, "rahul@okicici");
    }
}
