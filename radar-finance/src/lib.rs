//! radar-finance: ingestion pipeline (manual paste and inbox polling),
//! categorization, persistence, and spending summaries.

pub mod cache;
pub mod category_rules;
pub mod classifier;
pub mod inbox;
pub mod pipeline;
pub mod poller;
pub mod store;
pub mod summary;

pub use cache::RecentlyProcessed;
pub use category_rules::categorize;
pub use classifier::{Classifier, Offline, Verdict};
pub use inbox::{InboxSource, JsonFileInbox, MemoryInbox};
pub use pipeline::{
    DEFAULT_CLASSIFIER_TIMEOUT, IngestError, assign_category, confirm, parse_pasted,
};
pub use poller::{InboxPoller, PollPhase, PollerConfig, SkipReason, TickOutcome, TickReport};
pub use store::{JsonFileStore, MemoryStore, TRANSACTIONS_KEY, TransactionStore};
pub use summary::{CategoryTotal, SpendingSummary};
