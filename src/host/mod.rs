//! Host store boundary.
//!
//! ARCHITECTURE
//! ============
//! The accessor never talks to `localStorage` directly. It goes through two
//! capability traits that mirror the browser API one call per method:
//!
//! - [`HostStore`]: asynchronous access, always required
//! - [`SyncHostStore`]: blocking access, optional
//!
//! A store that offers both is handed to `LocalStorage::new`; an async-only
//! store (a bridge that has to await the browser, or a server-side render with
//! no store at hand) goes to `LocalStorage::new_async_only`, and synchronous
//! calls then fail with `StoreUnavailable`.

#[cfg(feature = "hydrate")]
pub mod browser;
pub mod memory;

#[cfg(feature = "hydrate")]
pub use browser::BrowserStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// Asynchronous host key/value store (`localStorage` semantics).
#[async_trait::async_trait(?Send)]
pub trait HostStore {
    /// `getItem`: `None` when the key is absent.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// `setItem`
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// `removeItem`
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// `clear`
    async fn clear(&self) -> Result<(), StorageError>;

    /// `key(index)`: `None` past the end.
    async fn key(&self, index: u32) -> Result<Option<String>, StorageError>;

    /// `length`
    async fn length(&self) -> Result<u32, StorageError>;

    /// `hasOwnProperty`
    async fn contains_key(&self, key: &str) -> Result<bool, StorageError>;
}

/// Blocking host key/value store.
pub trait SyncHostStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
    fn key(&self, index: u32) -> Result<Option<String>, StorageError>;
    fn length(&self) -> Result<u32, StorageError>;
    fn contains_key(&self, key: &str) -> Result<bool, StorageError>;
}
