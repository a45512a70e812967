//! Bank-neutral account debit/credit alerts.
//!
//! Many smaller banks share this wording. The bank is left unset; callers
//! that know the sender can fill it in.
//!
//! Expected text:
//!   Rs 750.00 debited from a/c XX9988 on 03-05-24 to SHELL PETROL. -Federal Bank
//!   INR 3,000.00 credited to your a/c no. XX4455 on 04/05/24 by IMPS-RAVI KUMAR. -PNB

use radar_core::TxnType;
use regex::Captures;

use crate::patterns::{Template, cap_amount, cap_text, cap_verbatim_date};
use crate::types::Fields;

const DEBIT: &str = concat!(
    r"(?i)(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"(?:has been |is )?debited from (?:your )?a/c (?:no\.? )?\w+ ",
    r"on (?P<date>\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
    r"(?: (?:to|at|towards|for) (?P<desc>.+?)(?:\.\s|\.?$))?"
);

const CREDIT: &str = concat!(
    r"(?i)(?:INR|Rs\.?)\s?(?P<amount>\d[\d,]*(?:\.\d+)?) ",
    r"(?:has been |is )?credited to (?:your )?a/c (?:no\.? )?\w+ ",
    r"on (?P<date>\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
    r"(?: (?:by|from) (?P<desc>.+?)(?:\.\s|\.?$))?"
);

fn extract_debit(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_verbatim_date(caps, "date")?,
        description: cap_text(caps, "desc").unwrap_or_else(|| "Account debit".to_string()),
        balance: None,
    })
}

fn extract_credit(caps: &Captures<'_>) -> Option<Fields> {
    Some(Fields {
        amount: cap_amount(caps, "amount")?,
        date: cap_verbatim_date(caps, "date")?,
        description: cap_text(caps, "desc").unwrap_or_else(|| "Account credit".to_string()),
        balance: None,
    })
}

pub fn templates() -> [Template; 2] {
    [
        Template {
            name: "account_debit",
            bank: None,
            txn_type: TxnType::Debit,
            pattern: DEBIT,
            extract: extract_debit,
        },
        Template {
            name: "account_credit",
            bank: None,
            txn_type: TxnType::Credit,
            pattern: CREDIT,
            extract: extract_credit,
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::patterns::BankPattern;

    use super::*;

    #[test]
    fn test_debit_with_merchant() {
        let p = BankPattern::compile(templates()[0]).unwrap();
        let txn = p
            .apply("Rs 750.00 debited from a/c XX9988 on 03-05-24 to SHELL PETROL. -Federal Bank")
            .unwrap();
        assert_eq!(txn.amount, 750.0);
        assert_eq!(txn.date, "03-05-24");
        assert_eq!(txn.description, "SHELL PETROL");
        assert_eq!(txn.bank, None);
    }

    #[test]
    fn test_debit_without_merchant() {
        let p = BankPattern::compile(templates()[0]).unwrap();
        let txn = p
            .apply("INR 99.00 debited from a/c XX9988 on 03-05-24. Avl bal INR 100.00")
            .unwrap();
        assert_eq!(txn.description, "Account debit");
    }

    #[test]
    fn test_credit_slashed_date() {
        let p = BankPattern::compile(templates()[1]).unwrap();
        let txn = p
            .apply("INR 3,000.00 credited to your a/c no. XX4455 on 04/05/24 by IMPS-RAVI KUMAR. -PNB")
            .unwrap();
        assert_eq!(txn.amount, 3000.0);
        assert_eq!(txn.date, "04/05/24");
        assert_eq!(txn.description, "IMPS-RAVI KUMAR");
        assert_eq!(txn.txn_type, TxnType::Credit);
    }
}
