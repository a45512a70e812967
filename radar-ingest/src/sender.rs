//! Heuristics over sender ids and message bodies.
//!
//! Indian commercial SMS arrive from ids like `VM-HDFCBK` or `AD-SBIUPI-S`:
//! a two-letter operator/region prefix, then a 5-6 character header.

use crate::types::SmsMessage;

/// Sender headers of banks and payment apps, with the bank tag they imply
const KNOWN_SENDERS: &[(&str, &str)] = &[
    ("HDFCBK", "HDFC"),
    ("HDFCBN", "HDFC"),
    ("SBIUPI", "SBI"),
    ("SBIINB", "SBI"),
    ("SBIPSG", "SBI"),
    ("ATMSBI", "SBI"),
    ("CBSSBI", "SBI"),
    ("ICICIB", "ICICI"),
    ("ICICIT", "ICICI"),
    ("AXISBK", "AXIS"),
    ("AXISMR", "AXIS"),
    ("KOTAKB", "KOTAK"),
    ("KOTAKM", "KOTAK"),
    ("PAYTMB", "PAYTM"),
    ("PHONPE", "PHONEPE"),
    ("GPAYIN", "GPAY"),
    ("BOBTXN", "BOB"),
    ("BOBSMS", "BOB"),
    ("PNBSMS", "PNB"),
    ("YESBNK", "YES"),
    ("IDFCFB", "IDFC"),
    ("INDUSB", "INDUSIND"),
    ("CANBNK", "CANARA"),
    ("UNIONB", "UNION"),
    ("FEDBNK", "FEDERAL"),
    ("CITIBK", "CITI"),
    ("SCBANK", "SC"),
];

/// Bank names that identify the bank when they appear inside an unknown header
const BANK_FRAGMENTS: &[(&str, &str)] = &[
    ("HDFC", "HDFC"),
    ("ICICI", "ICICI"),
    ("AXIS", "AXIS"),
    ("KOTAK", "KOTAK"),
    ("PAYTM", "PAYTM"),
    ("SBI", "SBI"),
];

const SENDER_HINTS: &[&str] = &["BANK", "BNK", "PAY", "UPI", "ALERT"];

/// Matched as word prefixes, so "transactions" counts but "cupid" does not
const BODY_KEYWORDS: &[&str] = &[
    "debited",
    "credited",
    "transaction",
    "spent",
    "payment",
    "account",
    "bank",
    "balance",
    "transfer",
    "upi",
    "rupees",
];

/// Currency markers as whole words: `Rs`, `Rs.500`, `INR500`, but not "Cheers"
const CURRENCY_WORDS: &[&str] = &["rs", "inr"];

fn is_currency_word(word: &str) -> bool {
    CURRENCY_WORDS.iter().any(|marker| {
        word.strip_prefix(marker)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
    })
}

/// The header part of a sender id: `VM-HDFCBK` and `AD-HDFCBK-S` give `HDFCBK`.
pub fn sender_header(address: &str) -> String {
    let upper = address.trim().to_ascii_uppercase();
    let parts: Vec<&str> = upper.split('-').collect();
    match parts.as_slice() {
        [prefix, header, ..] if prefix.len() == 2 => header.to_string(),
        _ => upper,
    }
}

fn is_alnum_code(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Shape check for DLT sender ids (`XY-ABCDE`, `XY-ABCDEF`, optional `-S/-T/-P/-G` suffix)
pub fn looks_like_sender_id(address: &str) -> bool {
    let upper = address.trim().to_ascii_uppercase();
    let parts: Vec<&str> = upper.split('-').collect();
    let prefix_ok = |p: &str| p.len() == 2 && p.chars().all(|c| c.is_ascii_alphabetic());
    match parts.as_slice() {
        [prefix, header] => prefix_ok(prefix) && is_alnum_code(header, 5, 6),
        [prefix, header, suffix] => {
            prefix_ok(prefix) && is_alnum_code(header, 5, 6) && suffix.len() == 1
        }
        _ => false,
    }
}

/// Does the sender look like a bank or payment service?
pub fn is_financial_sender(address: &str) -> bool {
    let header = sender_header(address);
    if KNOWN_SENDERS.iter().any(|(code, _)| *code == header) {
        return true;
    }
    let upper = address.to_ascii_uppercase();
    if SENDER_HINTS.iter().any(|hint| upper.contains(hint)) {
        return true;
    }
    looks_like_sender_id(address)
}

/// Does the body read like a money movement, whoever sent it?
pub fn looks_transactional(body: &str) -> bool {
    if body.contains('₹') {
        return true;
    }
    let lower = body.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| is_currency_word(w) || BODY_KEYWORDS.iter().any(|kw| w.starts_with(kw)))
}

/// Pre-filter used by the inbox poller
pub fn is_candidate(msg: &SmsMessage) -> bool {
    is_financial_sender(&msg.address) || looks_transactional(&msg.body)
}

/// Bank tag implied by the sender id, if any
pub fn bank_from_sender(address: &str) -> Option<&'static str> {
    let header = sender_header(address);
    KNOWN_SENDERS
        .iter()
        .find(|(code, _)| *code == header)
        .or_else(|| BANK_FRAGMENTS.iter().find(|(frag, _)| header.contains(frag)))
        .map(|(_, bank)| *bank)
}
