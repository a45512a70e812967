//! State Bank of India UPI alerts
//!
//! Expected text:
//!   Dear UPI user A/C X4963 debited by 60.0 on date 18Feb25 trf to Jamal Store Refno 541567581752. If not u? call 1800111109. -SBI
//!   Dear SBI UPI User, ur A/cX4963 credited by Rs500 on 18Feb25 by (Ref no 541234567890)

use radar_core::TxnType;
use regex::Captures;

use crate::patterns::{Template, cap_amount, cap_month_date, cap_text};
use crate::types::Fields;

const UPI_DEBIT: &str = concat!(
    r"(?i)Dear UPI user A/C \w+ debited by (?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"on date (?P<date>\d{1,2}[A-Za-z]{3}\d{2,4}) ",
    r"trf to (?P<desc>.+?) Refno (?P<reference>\d+)"
);

const UPI_CREDIT: &str = concat!(
    r"(?i)Dear SBI UPI User,? ur A/c\s?\w+ credited by (?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"on (?P<date>\d{1,2}[A-Za-z]{3}\d{2,4}) ",
    r"by\s+\(Ref no (?P<reference>\d+)\)"
);

fn extract_debit(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_month_date(caps, "date")?,
        description: cap_text(caps, "desc")?,
        balance: None,
    })
}

fn extract_credit(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_month_date(caps, "date")?,
        description: format!("UPI credit (Ref {})", caps.name("reference")?.as_str()),
        balance: None,
    })
}

pub fn templates() -> [Template; 2] {
    [
        Template {
            name: "sbi_upi_debit",
            bank: Some("SBI"),
            txn_type: TxnType::Debit,
            pattern: UPI_DEBIT,
            extract: extract_debit,
        },
        Template {
            name: "sbi_upi_credit",
            bank: Some("SBI"),
            txn_type: TxnType::Credit,
            pattern: UPI_CREDIT,
            extract: extract_credit,
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::patterns::BankPattern;

    use super::*;

    #[test]
    fn test_upi_debit_fixture() {
        let p = BankPattern::compile(templates()[0]).unwrap();
        let text = "Dear UPI user A/C X4963 debited by 60.0 on date 18Feb25 trf to Jamal Store Refno 541567581752. If not u? call 1800111109. -SBI";
        let txn = p.apply(text).unwrap();
        assert_eq!(txn.amount, 60.0);
        assert_eq!(txn.date, "18-02-25");
        assert_eq!(txn.txn_type, TxnType::Debit);
        assert_eq!(txn.description, "Jamal Store");
        assert_eq!(txn.bank.as_deref(), Some("SBI"));
    }

    #[test]
    fn test_upi_debit_bad_month_is_no_match() {
        let p = BankPattern::compile(templates()[0]).unwrap();
        let text = "Dear UPI user A/C X4963 debited by 60.0 on date 18Xyz25 trf to Jamal Store Refno 541567581752";
        assert!(p.is_match(text));
        assert!(p.apply(text).is_none());
    }

    #[test]
    fn test_upi_credit() {
        let p = BankPattern::compile(templates()[1]).unwrap();
        let text = "Dear SBI UPI User, ur A/cX4963 credited by Rs500 on 18Feb25 by (Ref no 541234567890)";
        let txn = p.apply(text).unwrap();
        assert_eq!(txn.amount, 500.0);
        assert_eq!(txn.date, "18-02-25");
        assert_eq!(txn.txn_type, TxnType::Credit);
        assert!(txn.description.contains("541234567890"));
    }
}
