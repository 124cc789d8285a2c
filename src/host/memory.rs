//! In-memory host store.
//!
//! Used for tests, server-side rendering fallbacks, and native shells. Keys
//! are kept sorted, so `key(index)` is deterministic. An optional quota makes
//! writes fail the way the browser's `QuotaExceededError` does.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{HostStore, SyncHostStore};
use crate::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys plus values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: RefCell::default(),
            quota_bytes: Some(bytes),
        }
    }

    /// Copy of the raw stored strings, as the host sees them.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.items.borrow().clone()
    }

    /// Bytes used if `key` were set to `value`.
    fn usage_with(&self, key: &str, value: &str) -> usize {
        let items = self.items.borrow();
        let others: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }
}

impl SyncHostStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.usage_with(key, value);
            if needed > quota {
                return Err(StorageError::Host(format!(
                    "QuotaExceededError: {needed} bytes exceeds quota of {quota} bytes"
                )));
            }
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.items.borrow_mut().clear();
        Ok(())
    }

    fn key(&self, index: u32) -> Result<Option<String>, StorageError> {
        let Ok(index) = usize::try_from(index) else {
            return Ok(None);
        };
        Ok(self.items.borrow().keys().nth(index).cloned())
    }

    fn length(&self) -> Result<u32, StorageError> {
        u32::try_from(self.items.borrow().len())
            .map_err(|_| StorageError::Host("item count exceeds u32".into()))
    }

    fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.items.borrow().contains_key(key))
    }
}

#[async_trait::async_trait(?Send)]
impl HostStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        SyncHostStore::get_item(self, key)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        SyncHostStore::set_item(self, key, value)
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        SyncHostStore::remove_item(self, key)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        SyncHostStore::clear(self)
    }

    async fn key(&self, index: u32) -> Result<Option<String>, StorageError> {
        SyncHostStore::key(self, index)
    }

    async fn length(&self) -> Result<u32, StorageError> {
        SyncHostStore::length(self)
    }

    async fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        SyncHostStore::contains_key(self, key)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
