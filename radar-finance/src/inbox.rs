//! Sources of inbox messages for the automatic path.

use anyhow::{Context, Result, anyhow};
use radar_ingest::SmsMessage;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait InboxSource: Send + Sync {
    /// Whether inbox reading is possible at all on this device/setup
    fn available(&self) -> bool;

    /// Up to `limit` most recent messages, newest first
    fn fetch_recent(&self, limit: usize) -> impl Future<Output = Result<Vec<SmsMessage>>> + Send;
}

fn newest_first(mut msgs: Vec<SmsMessage>, limit: usize) -> Vec<SmsMessage> {
    msgs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    msgs.truncate(limit);
    msgs
}

/// Exported inbox on disk: a JSON array of `{id, address, body, timestamp}`.
///
/// The file is re-read on every fetch, so an exporter can keep appending to it.
pub struct JsonFileInbox {
    path: PathBuf,
}

impl JsonFileInbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InboxSource for JsonFileInbox {
    fn available(&self) -> bool {
        self.path.is_file()
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<SmsMessage>> {
        let s = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        let msgs: Vec<SmsMessage> = serde_json::from_str(&s)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(newest_first(msgs, limit))
    }
}

/// In-memory inbox, for tests and for piping messages in from elsewhere
#[derive(Default)]
pub struct MemoryInbox {
    msgs: Mutex<Vec<SmsMessage>>,
}

impl MemoryInbox {
    pub fn new(msgs: Vec<SmsMessage>) -> Self {
        Self {
            msgs: Mutex::new(msgs),
        }
    }

    pub fn push(&self, msg: SmsMessage) -> Result<()> {
        self.msgs
            .lock()
            .map_err(|_| anyhow!("inbox lock poisoned"))?
            .push(msg);
        Ok(())
    }
}

impl InboxSource for MemoryInbox {
    fn available(&self) -> bool {
        true
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<SmsMessage>> {
        let msgs = self
            .msgs
            .lock()
            .map_err(|_| anyhow!("inbox lock poisoned"))?
            .clone();
        Ok(newest_first(msgs, limit))
    }
}
