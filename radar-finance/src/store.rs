//! Transaction persistence.
//!
//! The collection lives under one namespaced key of a JSON key-value file and
//! is rewritten in full on every insert.

use anyhow::{Context, Result, anyhow, bail};
use radar_core::Transaction;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const TRANSACTIONS_KEY: &str = "@rupeeradar/transactions";

pub trait TransactionStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<Transaction>>;

    /// Insert one record; fails if a record with the same id exists
    fn append(&self, txn: &Transaction) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Bulk insert, skipping ids already present. Returns how many were added.
    fn seed(&self, txns: Vec<Transaction>) -> Result<usize>;
}

/// Merge `incoming` into `existing`, skipping known ids
fn merge_new(existing: &mut Vec<Transaction>, incoming: Vec<Transaction>) -> usize {
    let mut added = 0;
    for txn in incoming {
        if existing.iter().any(|t| t.id == txn.id) {
            continue;
        }
        existing.push(txn);
        added += 1;
    }
    added
}

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        if s.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            }
        }
        let s = serde_json::to_string_pretty(doc)?;
        // readers only ever see the old or the new document
        let tmp = self.staging_path();
        fs::write(&tmp, s).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace {} with {}", self.path.display(), tmp.display()))?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_transactions(&self, doc: &Map<String, Value>) -> Result<Vec<Transaction>> {
        match doc.get(TRANSACTIONS_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => serde_json::from_value(v.clone())
                .with_context(|| format!("decode {TRANSACTIONS_KEY} in {}", self.path.display())),
        }
    }

    /// Read-modify-write of the collection under the store lock
    fn update<T>(&self, f: impl FnOnce(&mut Vec<Transaction>) -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("transaction store lock poisoned"))?;
        let mut doc = self.read_document()?;
        let mut txns = self.read_transactions(&doc)?;
        let out = f(&mut txns)?;
        doc.insert(TRANSACTIONS_KEY.to_string(), serde_json::to_value(&txns)?);
        self.write_document(&doc)?;
        Ok(out)
    }
}

impl TransactionStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<Transaction>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("transaction store lock poisoned"))?;
        let doc = self.read_document()?;
        self.read_transactions(&doc)
    }

    fn append(&self, txn: &Transaction) -> Result<()> {
        self.update(|txns| {
            if txns.iter().any(|t| t.id == txn.id) {
                bail!("transaction {} already stored", txn.id);
            }
            txns.push(txn.clone());
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(|txns| {
            txns.clear();
            Ok(())
        })
    }

    fn seed(&self, incoming: Vec<Transaction>) -> Result<usize> {
        self.update(|txns| Ok(merge_new(txns, incoming)))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    txns: Mutex<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Transaction>>> {
        self.txns
            .lock()
            .map_err(|_| anyhow!("transaction store lock poisoned"))
    }
}

impl TransactionStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Transaction>> {
        Ok(self.lock()?.clone())
    }

    fn append(&self, txn: &Transaction) -> Result<()> {
        let mut txns = self.lock()?;
        if txns.iter().any(|t| t.id == txn.id) {
            bail!("transaction {} already stored", txn.id);
        }
        txns.push(txn.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn seed(&self, incoming: Vec<Transaction>) -> Result<usize> {
        let mut txns = self.lock()?;
        Ok(merge_new(&mut txns, incoming))
    }
}
