//! In-memory blob store.

use super::{BlobStore, StorageError, StorageResult};
use std::collections::HashMap;

/// `HashMap`-backed blob store for ephemeral sessions and tests.
///
/// An optional byte capacity mimics browser storage quotas: a write whose
/// total footprint exceeds it fails with `StorageError::QuotaExceeded` and
/// leaves the previous value in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
    capacity_bytes: Option<usize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `capacity_bytes` in total.
    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries,
            capacity_bytes: None,
        }
    }

    /// Returns the raw value stored under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(capacity_bytes) = self.capacity_bytes {
            let required_bytes = self.used_bytes_without(key) + key.len() + value.len();
            if required_bytes > capacity_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    capacity_bytes,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobStore, MemoryBlobStore};
    use crate::storage::StorageError;

    #[test]
    fn set_replaces_previous_value() {
        let mut store = MemoryBlobStore::new();
        store.set("trips", "[]").unwrap();
        store.set("trips", "[1]").unwrap();
        assert_eq!(store.get("trips").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let mut store = MemoryBlobStore::with_capacity_bytes(12);
        store.set("trips", "[]").unwrap();

        let err = store.set("trips", "[1,2,3,4,5,6]").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                required_bytes: 18,
                capacity_bytes: 12,
                ..
            }
        ));
        assert_eq!(store.raw("trips"), Some("[]"));
    }
}
