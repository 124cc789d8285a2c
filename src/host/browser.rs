//! `window.localStorage` host store (hydrate only).
//!
//! The browser API is synchronous, so this store offers both capabilities;
//! the async forms complete immediately. JS exceptions (quota, security
//! errors in sandboxed frames) become [`StorageError::Host`] with the
//! exception's name and message.

use tracing::info;
use wasm_bindgen::{JsCast, JsValue};

use super::{HostStore, SyncHostStore};
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

impl BrowserStore {
    /// Attach to `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreUnavailable`] outside a window context or
    /// when the browser exposes no local storage, and [`StorageError::Host`]
    /// when accessing it throws (e.g. storage disabled by policy).
    pub fn local() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::StoreUnavailable("no browser window"))?;
        let storage = window
            .local_storage()
            .map_err(host_error)?
            .ok_or(StorageError::StoreUnavailable("window.localStorage is not available"))?;
        info!("attached to window.localStorage");
        Ok(Self { storage })
    }

    /// Wrap an already obtained `Storage` object (e.g. `sessionStorage`).
    #[must_use]
    pub fn from_storage(storage: web_sys::Storage) -> Self {
        Self { storage }
    }
}

fn host_error(value: JsValue) -> StorageError {
    let message = match value.dyn_ref::<js_sys::Error>() {
        Some(err) => format!("{}: {}", String::from(err.name()), String::from(err.message())),
        None => value.as_string().unwrap_or_else(|| format!("{value:?}")),
    };
    StorageError::Host(message)
}

impl SyncHostStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(host_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(host_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(host_error)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage.clear().map_err(host_error)
    }

    fn key(&self, index: u32) -> Result<Option<String>, StorageError> {
        self.storage.key(index).map_err(host_error)
    }

    fn length(&self) -> Result<u32, StorageError> {
        self.storage.length().map_err(host_error)
    }

    fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.storage.has_own_property(&JsValue::from_str(key)))
    }
}

#[async_trait::async_trait(?Send)]
impl HostStore for BrowserStore {
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
