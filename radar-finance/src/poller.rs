//! Automatic inbox polling.
//!
//! Each tick walks `Idle -> Fetching -> Filtering -> ExtractingBatch -> Idle`.
//! A tick that starts while another is still running is dropped, not queued.
//! The newest-id check skips unchanged inboxes cheaply; the
//! recently-processed cache is what actually prevents double ingestion.

use anyhow::{Context, Result, anyhow};
use radar_core::Transaction;
use radar_ingest::{SmsMessage, TransactionExtractor, sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{Notify, broadcast, watch};
use tokio::time::MissedTickBehavior;

use crate::cache::{self, RecentlyProcessed};
use crate::classifier::Classifier;
use crate::inbox::InboxSource;
use crate::pipeline::{DEFAULT_CLASSIFIER_TIMEOUT, assign_category};
use crate::store::TransactionStore;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// How many of the most recent inbox messages each tick reads
    pub batch_size: usize,
    pub cache_capacity: usize,
    /// Ask the classifier to confirm messages from financial-looking senders
    pub verify_financial_senders: bool,
    /// Confidence at which a "not a transaction" verdict skips the message
    pub reject_confidence: f64,
    /// Longest wait for one classifier call; a late answer counts as no answer
    pub classifier_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            batch_size: 20,
            cache_capacity: cache::DEFAULT_CAPACITY,
            verify_financial_senders: true,
            reject_confidence: 0.8,
            classifier_timeout: DEFAULT_CLASSIFIER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Filtering,
    ExtractingBatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Previous tick still in flight
    Busy,
    /// Newest inbox message is the one seen last time
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fetched: usize,
    pub candidates: usize,
    pub persisted: usize,
    pub skipped_duplicates: usize,
    pub rejected_by_check: usize,
    pub no_match: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Ran(TickReport),
}

enum MessageOutcome {
    Persisted,
    Duplicate,
    Rejected,
    NoMatch,
}

struct PollState {
    phase: PollPhase,
    last_seen_id: Option<String>,
    processed: RecentlyProcessed,
}

/// Clears the in-flight flag and returns to `Idle` however the tick ends
struct InFlight<'a> {
    flag: &'a AtomicBool,
    state: &'a Mutex<PollState>,
    idle: &'a Notify,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut st) = self.state.lock() {
            st.phase = PollPhase::Idle;
        }
        self.flag.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }
}

pub struct InboxPoller<I, S, C> {
    inbox: I,
    store: S,
    classifier: C,
    extractor: TransactionExtractor,
    config: PollerConfig,
    state: Mutex<PollState>,
    in_flight: AtomicBool,
    idle: Notify,
    events: broadcast::Sender<Transaction>,
}

impl<I, S, C> InboxPoller<I, S, C>
where
    I: InboxSource,
    S: TransactionStore,
    C: Classifier,
{
    pub fn new(
        inbox: I,
        store: S,
        classifier: C,
        extractor: TransactionExtractor,
        config: PollerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(PollState {
                phase: PollPhase::Idle,
                last_seen_id: None,
                processed: RecentlyProcessed::new(config.cache_capacity),
            }),
            inbox,
            store,
            classifier,
            extractor,
            config,
            in_flight: AtomicBool::new(false),
            idle: Notify::new(),
            events,
        }
    }

    /// Receive every transaction the poller persists from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Transaction> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn inbox(&self) -> &I {
        &self.inbox
    }

    pub fn phase(&self) -> PollPhase {
        self.state
            .lock()
            .map(|st| st.phase)
            .unwrap_or(PollPhase::Idle)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, PollState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("poller state lock poisoned"))
    }

    fn set_phase(&self, phase: PollPhase) {
        if let Ok(mut st) = self.state.lock() {
            tracing::trace!(from = ?st.phase, to = ?phase, "poller phase");
            st.phase = phase;
        }
    }

    /// Run one polling cycle.
    ///
    /// Errors are returned only when the inbox itself cannot be read;
    /// per-message failures are logged and counted in the report.
    pub async fn tick(&self) -> Result<TickOutcome> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("previous tick still running, skipping");
            return Ok(TickOutcome::Skipped(SkipReason::Busy));
        }
        let _in_flight = InFlight {
            flag: &self.in_flight,
            state: &self.state,
            idle: &self.idle,
        };

        self.set_phase(PollPhase::Fetching);
        let batch = self
            .inbox
            .fetch_recent(self.config.batch_size)
            .await
            .context("reading inbox")?;

        let newest = batch.first().map(|m| m.id.clone());
        {
            let mut st = self.lock_state()?;
            if newest == st.last_seen_id {
                return Ok(TickOutcome::Skipped(SkipReason::Unchanged));
            }
            st.last_seen_id = newest;
        }

        self.set_phase(PollPhase::Filtering);
        let fetched = batch.len();
        let candidates: Vec<SmsMessage> =
            batch.into_iter().filter(sender::is_candidate).collect();

        self.set_phase(PollPhase::ExtractingBatch);
        let mut report = TickReport {
            fetched,
            candidates: candidates.len(),
            ..TickReport::default()
        };

        for msg in &candidates {
            match self.process_message(msg).await {
                Ok(MessageOutcome::Persisted) => report.persisted += 1,
                Ok(MessageOutcome::Duplicate) => report.skipped_duplicates += 1,
                Ok(MessageOutcome::Rejected) => report.rejected_by_check += 1,
                Ok(MessageOutcome::NoMatch) => report.no_match += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(id = %msg.id, "failed to ingest message: {e:#}");
                }
            }
        }

        tracing::info!(
            fetched = report.fetched,
            candidates = report.candidates,
            persisted = report.persisted,
            failed = report.failed,
            "inbox tick done"
        );
        Ok(TickOutcome::Ran(report))
    }

    async fn process_message(&self, msg: &SmsMessage) -> Result<MessageOutcome> {
        let seen = self.lock_state()?.processed.contains(&msg.id);
        if seen {
            return Ok(MessageOutcome::Duplicate);
        }

        if self.config.verify_financial_senders && sender::is_financial_sender(&msg.address) {
            let limit = self.config.classifier_timeout;
            match tokio::time::timeout(limit, self.classifier.verify(&msg.body)).await {
                Ok(Ok(verdict)) if verdict.rejects(self.config.reject_confidence) => {
                    tracing::debug!(id = %msg.id, confidence = verdict.confidence, "classifier says not a transaction");
                    return Ok(MessageOutcome::Rejected);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(id = %msg.id, "confidence check failed, proceeding: {e:#}");
                }
                Err(_) => {
                    tracing::warn!(id = %msg.id, ?limit, "confidence check timed out, proceeding");
                }
            }
        }

        let Some(txn) = self.extractor.extract(&msg.body) else {
            tracing::debug!(id = %msg.id, "no transaction in message");
            return Ok(MessageOutcome::NoMatch);
        };

        let txn = match txn.bank {
            Some(_) => txn,
            None => {
                let bank = sender::bank_from_sender(&msg.address);
                txn.with_bank(bank)
            }
        };
        let txn = assign_category(txn, &self.classifier, self.config.classifier_timeout).await;

        self.lock_state()?.processed.insert(msg.id.clone());

        self.store
            .append(&txn)
            .with_context(|| format!("saving transaction from message {}", msg.id))?;
        tracing::info!(id = %txn.id, sms_id = %msg.id, amount = txn.amount, "new transaction");

        // no subscribers is fine
        let _ = self.events.send(txn);
        Ok(MessageOutcome::Persisted)
    }
}

impl<I, S, C> InboxPoller<I, S, C>
where
    I: InboxSource + 'static,
    S: TransactionStore + 'static,
    C: Classifier + 'static,
{
    /// Tick on the configured interval until `shutdown` turns true (or its
    /// sender is dropped). A tick already running when shutdown arrives is
    /// left to finish.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let poller = Arc::clone(&self);
                    tokio::spawn(async move {
                        match poller.tick().await {
                            Ok(TickOutcome::Skipped(reason)) => {
                                tracing::debug!(?reason, "tick skipped");
                            }
                            Ok(TickOutcome::Ran(_)) => {}
                            Err(e) => tracing::warn!("inbox poll failed: {e:#}"),
                        }
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("stopping inbox poller");
                        break;
                    }
                }
            }
        }
    }

    /// Wait for a tick in flight to finish
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // register before checking, so a tick ending in between still wakes us
            notified.as_mut().enable();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Offline, Verdict};
    use crate::inbox::MemoryInbox;
    use crate::store::MemoryStore;
    use radar_core::Category;

    const HDFC: &str = "HDFC Bank: INR 1,499.00 debited from a/c XX1234 on 12-04-23 AMAZON. Avl bal: INR 24,599.35";

    fn poller_with<C: Classifier>(
        msgs: Vec<SmsMessage>,
        classifier: C,
    ) -> InboxPoller<MemoryInbox, MemoryStore, C> {
        configured(msgs, classifier, PollerConfig::default())
    }

    fn configured<C: Classifier>(
        msgs: Vec<SmsMessage>,
        classifier: C,
        config: PollerConfig,
    ) -> InboxPoller<MemoryInbox, MemoryStore, C> {
        InboxPoller::new(
            MemoryInbox::new(msgs),
            MemoryStore::new(),
            classifier,
            TransactionExtractor::new().unwrap(),
            config,
        )
    }

    /// Never answers
    struct Silent;

    impl Classifier for Silent {
        async fn verify(&self, _body: &str) -> Result<Verdict> {
            std::future::pending().await
        }

        async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
            std::future::pending().await
        }
    }

    /// Says "not a transaction" with high confidence
    struct Skeptic;

    impl Classifier for Skeptic {
        async fn verify(&self, _body: &str) -> Result<Verdict> {
            Ok(Verdict {
                is_transaction: false,
                confidence: 0.95,
            })
        }

        async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
            Ok(None)
        }
    }

    /// Blocks in `verify` until released
    struct Gate(Arc<Notify>);

    impl Classifier for Gate {
        async fn verify(&self, _body: &str) -> Result<Verdict> {
            self.0.notified().await;
            Ok(Verdict {
                is_transaction: true,
                confidence: 1.0,
            })
        }

        async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_tick_persists_and_notifies() {
        let poller = poller_with(vec![SmsMessage::new("m1", "VM-HDFCBK", HDFC, 1)], Offline);
        let mut rx = poller.subscribe();

        let outcome = poller.tick().await.unwrap();
        let TickOutcome::Ran(report) = outcome else {
            panic!("expected a full tick, got {outcome:?}");
        };
        assert_eq!(report.persisted, 1);
        assert_eq!(poller.phase(), PollPhase::Idle);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.amount, 1499.0);
        assert_eq!(event.category, Some(Category::Shopping));
        assert_eq!(poller.store().load_all().unwrap(), vec![event]);
    }

    #[tokio::test]
    async fn test_unchanged_newest_id_skips_batch() {
        let poller = poller_with(vec![SmsMessage::new("m1", "VM-HDFCBK", HDFC, 1)], Offline);
        poller.tick().await.unwrap();
        assert_eq!(
            poller.tick().await.unwrap(),
            TickOutcome::Skipped(SkipReason::Unchanged)
        );
    }

    #[tokio::test]
    async fn test_confident_rejection_skips_financial_sender_only() {
        let poller = poller_with(
            vec![
                SmsMessage::new("bank", "VM-HDFCBK", HDFC, 2),
                SmsMessage::new("phone", "+919876543210", "Sent Rs.150.00 via UPI to Ravi", 1),
            ],
            Skeptic,
        );
        let TickOutcome::Ran(report) = poller.tick().await.unwrap() else {
            panic!("expected a full tick");
        };
        assert_eq!(report.rejected_by_check, 1);
        assert_eq!(report.persisted, 1);
        let stored = poller.store().load_all().unwrap();
        assert_eq!(stored[0].amount, 150.0);
    }

    #[tokio::test]
    async fn test_bank_filled_from_sender() {
        let poller = poller_with(
            vec![SmsMessage::new(
                "m1",
                "AD-FEDBNK-S",
                "Rs 750.00 debited from a/c XX9988 on 03-05-24 to SHELL PETROL. -Federal Bank",
                1,
            )],
            Offline,
        );
        poller.tick().await.unwrap();
        let stored = poller.store().load_all().unwrap();
        assert_eq!(stored[0].bank.as_deref(), Some("FEDERAL"));
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_dropped() {
        let gate = Arc::new(Notify::new());
        let poller = Arc::new(poller_with(
            vec![SmsMessage::new("m1", "VM-HDFCBK", HDFC, 1)],
            Gate(Arc::clone(&gate)),
        ));

        let first = tokio::spawn({
            let poller = Arc::clone(&poller);
            async move { poller.tick().await }
        });
        while poller.phase() != PollPhase::ExtractingBatch {
            tokio::task::yield_now().await;
        }

        assert!(poller.is_busy());
        assert_eq!(
            poller.tick().await.unwrap(),
            TickOutcome::Skipped(SkipReason::Busy)
        );

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, TickOutcome::Ran(TickReport { persisted: 1, .. })));
        assert!(!poller.is_busy());
        assert_eq!(poller.phase(), PollPhase::Idle);
    }

    #[tokio::test]
    async fn test_unanswered_classifier_does_not_stall_polling() {
        let config = PollerConfig {
            classifier_timeout: Duration::from_millis(50),
            ..PollerConfig::default()
        };
        let poller = configured(vec![SmsMessage::new("m1", "VM-HDFCBK", HDFC, 1)], Silent, config);

        let first = tokio::time::timeout(Duration::from_secs(5), poller.tick())
            .await
            .expect("tick should give up on the classifier")
            .unwrap();
        assert!(matches!(first, TickOutcome::Ran(TickReport { persisted: 1, .. })));
        assert!(!poller.is_busy());

        poller
            .inbox()
            .push(SmsMessage::new("m2", "VM-HDFCBK", HDFC, 2))
            .unwrap();
        let second = poller.tick().await.unwrap();
        assert!(matches!(second, TickOutcome::Ran(TickReport { persisted: 1, .. })));
        assert_eq!(poller.store().load_all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_timer_and_running_tick_finishes() {
        let gate = Arc::new(Notify::new());
        let config = PollerConfig {
            interval: Duration::from_millis(10),
            ..PollerConfig::default()
        };
        let poller = Arc::new(configured(
            vec![SmsMessage::new("m1", "VM-HDFCBK", HDFC, 1)],
            Gate(Arc::clone(&gate)),
            config,
        ));

        let (stop_tx, stop_rx) = watch::channel(false);
        let runner = tokio::spawn(Arc::clone(&poller).run(stop_rx));

        while poller.phase() != PollPhase::ExtractingBatch {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // several timer ticks land while the first one is blocked
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(poller.is_busy());
        assert!(poller.store().load_all().unwrap().is_empty());

        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), runner)
            .await
            .expect("run should return after shutdown")
            .unwrap();
        assert!(poller.is_busy());

        gate.notify_one();
        tokio::time::timeout(Duration::from_secs(5), poller.wait_idle())
            .await
            .expect("tick in flight should finish");
        assert_eq!(poller.phase(), PollPhase::Idle);
        assert_eq!(poller.store().load_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_at_once_when_idle() {
        let poller = poller_with(Vec::new(), Offline);
        tokio::time::timeout(Duration::from_secs(1), poller.wait_idle())
            .await
            .unwrap();
    }
}
