//! Deterministic merchant/keyword rules mapping transactions to categories.
//!
//! Description is checked before the full SMS so a merchant named in the
//! description wins over incidental words in the bank's boilerplate.

use radar_core::{Category, Transaction};

const RULES: &[(Category, &[&str])] = &[
    (
        Category::Income,
        &["SALARY", "PAYROLL", "STIPEND", "INTEREST CREDIT", "DIVIDEND"],
    ),
    (
        Category::Food,
        &[
            "SWIGGY", "ZOMATO", "DOMINOS", "MCDONALD", "KFC", "STARBUCKS", "CAFE", "RESTAURANT",
            "EATS", "BAKERY",
        ],
    ),
    (
        Category::Groceries,
        &[
            "BIGBASKET", "BLINKIT", "ZEPTO", "DMART", "INSTAMART", "GROFERS", "RELIANCE FRESH",
            "KIRANA", "SUPERMARKET", "GROCERY",
        ],
    ),
    (
        Category::Shopping,
        &[
            "AMAZON", "FLIPKART", "MYNTRA", "AJIO", "MEESHO", "NYKAA", "TATACLIQ", "DECATHLON",
        ],
    ),
    (
        Category::Transport,
        &[
            "UBER", "OLA", "RAPIDO", "IRCTC", "REDBUS", "METRO", "FASTAG", "PETROL", "FUEL",
            "INDIGO", "SHELL",
        ],
    ),
    (
        Category::Bills,
        &[
            "AIRTEL", "JIO", "VODAFONE", "BSNL", "ELECTRICITY", "BESCOM", "TATA POWER", "RECHARGE",
            "BROADBAND", "GAS BILL", "INSURANCE", "EMI",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "NETFLIX", "SPOTIFY", "HOTSTAR", "BOOKMYSHOW", "PRIME VIDEO", "PVR", "INOX", "STEAM",
        ],
    ),
    (
        Category::Health,
        &[
            "PHARMACY", "APOLLO", "MEDPLUS", "1MG", "PHARMEASY", "HOSPITAL", "CLINIC", "DIAGNOSTIC",
        ],
    ),
    (
        Category::Education,
        &["SCHOOL", "COLLEGE", "UNIVERSITY", "TUITION", "UDEMY", "COURSERA", "BYJU"],
    ),
];

fn match_rules(text: &str) -> Option<Category> {
    RULES.iter().find_map(|(category, keywords)| {
        keywords
            .iter()
            .any(|kw| contains_word(text, kw))
            .then_some(*category)
    })
}

/// Keyword must not sit inside a longer word ("OLA" in "COLA", "EMI" in "PREMIUM")
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        before_ok && after_ok
    })
}

fn looks_like_person_transfer(desc: &str, sms: &str) -> bool {
    desc.contains('@')
        || sms.contains("UPI/P2A")
        || sms.contains("IMPS")
        || sms.contains("NEFT")
        || desc.starts_with("PAYMENT TO ")
}

/// Categorize a transaction with the keyword rules alone.
///
/// Priority: description keywords > credit means income > SMS keywords >
/// person-to-person transfer > other.
pub fn categorize(txn: &Transaction) -> Category {
    let desc = txn.description.to_uppercase();
    let sms = txn.original_sms.to_uppercase();

    if let Some(category) = match_rules(&desc) {
        return category;
    }
    if txn.is_credit() {
        return Category::Income;
    }
    if let Some(category) = match_rules(&sms) {
        return category;
    }
    if looks_like_person_transfer(&desc, &sms) {
        return Category::Transfer;
    }
    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::TxnType;

    fn txn(desc: &str, txn_type: TxnType, sms: &str) -> Transaction {
        Transaction::new(100.0, "01-01-24", desc, txn_type, sms)
    }

    #[test]
    fn test_merchant_in_description() {
        assert_eq!(categorize(&txn("SWIGGY", TxnType::Debit, "")), Category::Food);
        assert_eq!(categorize(&txn("WWW.AMAZON.IN", TxnType::Debit, "")), Category::Shopping);
        assert_eq!(categorize(&txn("SHELL PETROL", TxnType::Debit, "")), Category::Transport);
    }

    #[test]
    fn test_salary_credit_is_income() {
        let t = txn("NEFT-ACME CORP SALARY", TxnType::Credit, "");
        assert_eq!(categorize(&t), Category::Income);
        let t = txn("rahul@okicici", TxnType::Credit, "");
        assert_eq!(categorize(&t), Category::Income);
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        assert_eq!(categorize(&txn("COCA COLA STORE", TxnType::Debit, "")), Category::Other);
        assert_eq!(categorize(&txn("OLA CABS", TxnType::Debit, "")), Category::Transport);
    }

    #[test]
    fn test_sms_keywords_after_description() {
        let t = txn("Account debit", TxnType::Debit, "Rs 649 debited for NETFLIX subscription");
        assert_eq!(categorize(&t), Category::Entertainment);
    }

    #[test]
    fn test_person_transfer() {
        assert_eq!(categorize(&txn("merchant@okaxis", TxnType::Debit, "")), Category::Transfer);
        assert_eq!(categorize(&txn("Payment to Jamal Store", TxnType::Debit, "")), Category::Transfer);
        assert_eq!(categorize(&txn("ATM WDL", TxnType::Debit, "")), Category::Other);
    }
}
