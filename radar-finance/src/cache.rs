//! Bounded set of recently ingested message ids.

use std::collections::{HashSet, VecDeque};

pub const DEFAULT_CAPACITY: usize = 100;

/// When full, the oldest quarter of the ids is dropped in one go.
#[derive(Debug, Clone)]
pub struct RecentlyProcessed {
    capacity: usize,
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl RecentlyProcessed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns false if the id was already present
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.ids.contains(&id) {
            return false;
        }
        if self.order.len() >= self.capacity {
            self.evict_oldest_quarter();
        }
        self.ids.insert(id.clone());
        self.order.push_back(id);
        true
    }

    fn evict_oldest_quarter(&mut self) {
        let n = (self.capacity / 4).max(1);
        for old in self.order.drain(..n.min(self.order.len())) {
            self.ids.remove(&old);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for RecentlyProcessed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
