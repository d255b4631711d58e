//! Integration log storage backends

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;
use vectra_common::{IntegrationLogEntry, StoreError};

/// Append-only sink for integration log entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntegrationLogStore: Send + Sync {
    /// Persist one entry
    async fn append(&self, entry: IntegrationLogEntry) -> Result<(), StoreError>;
}

/// Bounded in-memory log store
///
/// Keeps the most recent `capacity` entries; older ones are evicted first.
pub struct InMemoryLogStore {
    entries: RwLock<VecDeque<IntegrationLogEntry>>,
    capacity: usize,
}

impl InMemoryLogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    /// Most recent entries first
    pub fn recent(&self, limit: usize) -> Vec<IntegrationLogEntry> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }

    /// All entries in insertion order
    pub fn entries(&self) -> Vec<IntegrationLogEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for InMemoryLogStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl IntegrationLogStore for InMemoryLogStore {
    async fn append(&self, entry: IntegrationLogEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(())
    }
}
