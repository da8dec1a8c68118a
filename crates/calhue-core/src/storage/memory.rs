//! In-memory storage implementation.

use super::{BoxFuture, ChangeSet, KeyValueStore, Record, StorageChange, StorageError, StorageResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key-value store for tests and native tooling.
///
/// Every mutation that actually changes a value queues one [`ChangeSet`],
/// collected with [`MemoryStore::drain_changes`].
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
    changes: RwLock<Vec<ChangeSet>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `record`, without queuing changes.
    pub fn with_record(record: Record) -> Self {
        Self {
            values: RwLock::new(record.into_iter().collect()),
            changes: RwLock::new(Vec::new()),
        }
    }

    /// Take all change notifications queued since the last call.
    pub fn drain_changes(&self) -> Vec<ChangeSet> {
        match self.changes.write() {
            Ok(mut changes) => std::mem::take(&mut *changes),
            Err(e) => {
                log::error!("Lock error: {}", e);
                Vec::new()
            }
        }
    }

    fn notify(&self, change_set: ChangeSet) -> StorageResult<()> {
        if change_set.is_empty() {
            return Ok(());
        }
        let mut changes = self.changes.write().map_err(|e| {
            StorageError::Other(format!("Lock error: {}", e))
        })?;
        changes.push(change_set);
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<Record>> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        Box::pin(async move {
            let values = self.values.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(keys
                .into_iter()
                .filter_map(|key| values.get(&key).cloned().map(|value| (key, value)))
                .collect())
        })
    }

    fn set(&self, record: Record) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut change_set = ChangeSet::new();
            {
                let mut values = self.values.write().map_err(|e| {
                    StorageError::Other(format!("Lock error: {}", e))
                })?;
                for (key, new_value) in record {
                    let old_value = values.insert(key.clone(), new_value.clone());
                    if old_value.as_ref() != Some(&new_value) {
                        change_set.insert(key, StorageChange {
                            new_value: Some(new_value),
                            old_value,
                        });
                    }
                }
            }
            self.notify(change_set)
        })
    }

    fn remove(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<()>> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        Box::pin(async move {
            let mut change_set = ChangeSet::new();
            {
                let mut values = self.values.write().map_err(|e| {
                    StorageError::Other(format!("Lock error: {}", e))
                })?;
                for key in keys {
                    if let Some(old_value) = values.remove(&key) {
                        change_set.insert(key, StorageChange {
                            new_value: None,
                            old_value: Some(old_value),
                        });
                    }
                }
            }
            self.notify(change_set)
        })
    }
}
