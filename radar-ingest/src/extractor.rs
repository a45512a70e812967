//! SMS to transaction extraction: template table first, generic heuristics second.

use anyhow::Result;
use radar_core::{Transaction, TxnType, date, parse_amount};
use regex::Regex;

use crate::patterns::PatternLibrary;

/// Longest description kept when the message names no recipient
const FALLBACK_DESCRIPTION_CHARS: usize = 50;

/// Collapse whitespace runs (newlines included) to single spaces and trim.
pub fn normalize_sms(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Which rule produced a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Template(&'static str),
    Generic,
}

/// Heuristic parser for messages no template recognizes
pub struct GenericExtractor {
    currency_amount: Regex,
    debited_by: Regex,
    balance_label: Regex,
    month_name_date: Regex,
    numeric_date: Regex,
    recipient: Regex,
    debit_words: Regex,
    credit_words: Regex,
}

impl GenericExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            currency_amount: Regex::new(r"(?i)(?:₹|\bRs\.?|\bINR)\s*(\d[\d,]*(?:\.\d+)?)")?,
            debited_by: Regex::new(
                r"(?i)\bdebited by\s*(?:Rs\.?|INR|₹)?\s*(\d[\d,]*(?:\.\d+)?)",
            )?,
            // text ending right before a currency amount that is a balance or limit
            balance_label: Regex::new(r"(?i)\b(?:bal|balance|limit)\b[\s:.-]*(?:is\s+)?$")?,
            month_name_date: Regex::new(r"\b\d{1,2}-?[A-Za-z]{3}-?(?:\d{4}|\d{2})\b")?,
            numeric_date: Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/](?:\d{4}|\d{2})\b")?,
            recipient: Regex::new(concat!(
                r"(?i)\b(?:(?:trf|transferred|transfer|paid|sent|payment)",
                r"(?:\s+of)?(?:\s+(?:₹|Rs\.?|INR)?\s*\d[\d,]*(?:\.\d+)?)?\s+to(?:\s+VPA)?|at)",
                r"\s+([A-Za-z0-9@._&' -]+?)",
                r"(?:\s+(?:Ref|Refno|UPI|on|via|from|Avl|If|Not)\b|[.;,]|$)"
            ))?,
            debit_words: Regex::new(
                r"(?i)\b(?:debited|sent|paid|spent|withdraw|withdrawn|withdrawal|purchase|purchased)\b",
            )?,
            credit_words: Regex::new(r"(?i)\b(?:credited|received|refund|refunded|cashback)\b")?,
        })
    }

    /// Best-effort extraction; `None` when the text carries no amount signal at all.
    pub fn extract(&self, text: &str) -> Option<Transaction> {
        let amount = self
            .currency_amount
            .captures_iter(text)
            .filter(|caps| {
                caps.get(0)
                    .is_some_and(|m| !self.balance_label.is_match(&text[..m.start()]))
            })
            .chain(self.debited_by.captures_iter(text))
            .find_map(|caps| parse_amount(caps.get(1)?.as_str()))?;

        let when = self.find_date(text).unwrap_or_else(date::today);

        let description = match self.find_recipient(text) {
            Some(name) => format!("Payment to {name}"),
            None => truncate_chars(text, FALLBACK_DESCRIPTION_CHARS),
        };

        Some(Transaction::new(
            amount,
            when,
            description,
            self.classify(text),
            text,
        ))
    }

    /// Debit unless the text only speaks of money coming in
    pub fn classify(&self, text: &str) -> TxnType {
        let debit = self.debit_words.is_match(text);
        let credit = self.credit_words.is_match(text);
        if credit && !debit {
            TxnType::Credit
        } else {
            TxnType::Debit
        }
    }

    fn find_date(&self, text: &str) -> Option<String> {
        self.month_name_date
            .find_iter(text)
            .find_map(|m| date::expand_month_name_date(m.as_str()))
            .or_else(|| {
                self.numeric_date
                    .find_iter(text)
                    .map(|m| m.as_str())
                    .find(|s| date::parse_sms_date(s).is_some())
                    .map(str::to_string)
            })
    }

    fn find_recipient(&self, text: &str) -> Option<String> {
        let caps = self.recipient.captures(text)?;
        let name = caps.get(1)?.as_str().trim();
        if name.is_empty() { None } else { Some(name.to_string()) }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

/// Templates in priority order, then the generic fallback.
pub struct TransactionExtractor {
    library: PatternLibrary,
    generic: GenericExtractor,
}

impl TransactionExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self::with_library(PatternLibrary::builtin()?, GenericExtractor::new()?))
    }

    pub fn with_library(library: PatternLibrary, generic: GenericExtractor) -> Self {
        Self { library, generic }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Extract a transaction from one SMS, or `None` if nothing looks like one.
    pub fn extract(&self, sms: &str) -> Option<Transaction> {
        self.extract_with_source(sms).map(|(txn, _)| txn)
    }

    pub fn extract_with_source(&self, sms: &str) -> Option<(Transaction, MatchSource)> {
        let text = normalize_sms(sms);
        if text.is_empty() {
            return None;
        }

        if let Some((pattern, txn)) = self.library.first_match(&text) {
            tracing::debug!(template = pattern.name, amount = txn.amount, "template match");
            return Some((txn, MatchSource::Template(pattern.name)));
        }

        let txn = self.generic.extract(&text)?;
        tracing::debug!(amount = txn.amount, "generic extraction");
        Some((txn, MatchSource::Generic))
    }
}
