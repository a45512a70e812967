//! radar-ingest: bank SMS templates, the transaction extractor, and sender heuristics.

pub mod extractor;
pub mod parsers;
pub mod patterns;
pub mod sender;
pub mod types;

pub use extractor::{GenericExtractor, MatchSource, TransactionExtractor, normalize_sms};
pub use patterns::{BankPattern, PatternLibrary, Template};
pub use types::{Fields, SmsMessage};
