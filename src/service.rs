//! Storage accessor: typed reads and writes over a host store.
//!
//! ARCHITECTURE
//! ============
//! [`LocalStorage`] owns the host store, the transformer, the codec options,
//! and the change notifier. Its methods are async. Blocking access goes
//! through [`SyncLocalStorage`], a borrowed view returned by
//! [`LocalStorage::sync`]; whether that view exists is fixed when the storage
//! is constructed.
//!
//! Write path:
//! `validate key -> encode -> old value (lenient) -> changing -> transform ->
//! host set -> changed`.
//! Read path: `validate key -> host get -> untransform -> decode (strict)`.
//!
//! CONCURRENCY
//! ===========
//! Single-threaded by construction (`Rc`, `?Send` futures), like the browser
//! main thread. No locking is added around the host store; interleaved callers
//! see last-write-wins.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::codec;
use crate::config::{JsonOptions, LocalStorageOptions};
use crate::error::{StorageError, validate_key};
use crate::events::{
    ChangeDecision, ChangeNotifier, ChangedEvent, ChangingEvent, SubscriptionId,
};
use crate::host::{HostStore, SyncHostStore};
use crate::transform::{DataTransformer, IdentityTransformer};

// =============================================================================
// ACCESSOR
// =============================================================================

pub struct LocalStorage {
    host: Rc<dyn HostStore>,
    sync_host: Option<Rc<dyn SyncHostStore>>,
    transformer: Rc<dyn DataTransformer>,
    notifier: ChangeNotifier,
    options: LocalStorageOptions,
}

impl LocalStorage {
    /// Storage over a host that supports both async and blocking access.
    #[must_use]
    pub fn new<S>(store: S) -> Self
    where
        S: HostStore + SyncHostStore + 'static,
    {
        Self::from_shared(Rc::new(store))
    }

    /// Like [`LocalStorage::new`], for a store the caller keeps a handle to.
    #[must_use]
    pub fn from_shared<S>(store: Rc<S>) -> Self
    where
        S: HostStore + SyncHostStore + 'static,
    {
        let host: Rc<dyn HostStore> = Rc::clone(&store) as Rc<dyn HostStore>;
        let sync_host: Rc<dyn SyncHostStore> = store;
        Self::build(host, Some(sync_host))
    }

    /// Storage over a host with async access only. [`LocalStorage::sync`]
    /// returns [`StorageError::StoreUnavailable`].
    #[must_use]
    pub fn new_async_only<S>(store: S) -> Self
    where
        S: HostStore + 'static,
    {
        Self::from_shared_async_only(Rc::new(store))
    }

    #[must_use]
    pub fn from_shared_async_only<S>(store: Rc<S>) -> Self
    where
        S: HostStore + 'static,
    {
        Self::build(store, None)
    }

    /// Storage over `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreUnavailable`] outside the browser, and
    /// always when built without the `hydrate` feature (server rendering).
    pub fn browser() -> Result<Self, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            crate::host::BrowserStore::local().map(Self::new)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(StorageError::StoreUnavailable(
                "browser storage is only available in hydrate builds",
            ))
        }
    }

    fn build(host: Rc<dyn HostStore>, sync_host: Option<Rc<dyn SyncHostStore>>) -> Self {
        Self {
            host,
            sync_host,
            transformer: Rc::new(IdentityTransformer),
            notifier: ChangeNotifier::new(),
            options: LocalStorageOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: LocalStorageOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the transform hook (identity by default).
    #[must_use]
    pub fn with_transformer<T>(mut self, transformer: T) -> Self
    where
        T: DataTransformer + 'static,
    {
        self.transformer = Rc::new(transformer);
        self
    }

    #[must_use]
    pub fn options(&self) -> &LocalStorageOptions {
        &self.options
    }

    #[must_use]
    pub fn supports_sync(&self) -> bool {
        self.sync_host.is_some()
    }

    /// Blocking view over the same store, transformer, and subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreUnavailable`] when the host only offers
    /// async access.
    pub fn sync(&self) -> Result<SyncLocalStorage<'_>, StorageError> {
        match &self.sync_host {
            Some(host) => Ok(SyncLocalStorage {
                storage: self,
                host: host.as_ref(),
            }),
            None => Err(StorageError::StoreUnavailable(
                "synchronous access is not available for this host store",
            )),
        }
    }

    // --- Events ---

    /// Subscribe to writes before they happen. Answer
    /// [`ChangeDecision::Cancel`] to skip the write.
    pub fn on_changing<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangingEvent) -> ChangeDecision + 'static,
    {
        self.notifier.on_changing(handler)
    }

    /// Subscribe to completed writes.
    pub fn on_changed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangedEvent) + 'static,
    {
        self.notifier.on_changed(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    // --- Async operations ---

    /// Write `value` under `key`.
    ///
    /// String types are stored verbatim, everything else as JSON. A cancelled
    /// write returns `Ok(())` and leaves the store untouched.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for an empty key,
    /// [`StorageError::EncodeFailure`] when `value` cannot be serialized, and
    /// any transformer or host error.
    pub async fn set_item<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized + 'static,
    {
        let pending = PendingWrite::prepare(key, value, &self.options.json)?;
        let old_value = self.old_value(key).await?;
        let Some(event) = self.begin_change(key, old_value, pending.new_value) else {
            return Ok(());
        };

        let stored = self.transformer.transform_async(&pending.encoded).await?;
        self.host.set_item(key, &stored).await?;
        self.finish_change(event);
        Ok(())
    }

    /// Read `key` as `T`. Missing keys and blank values yield `T::default()`.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for an empty key,
    /// [`StorageError::DecodeFailure`] when the stored text is not valid for
    /// `T`, and any transformer or host error.
    pub async fn get_item<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default + 'static,
    {
        validate_key(key)?;
        match self.read_raw(key).await? {
            Some(raw) => decode_item(key, &raw),
            None => Ok(T::default()),
        }
    }

    /// Read the untransformed text under `key` without JSON interpretation.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for an empty key, and any transformer or
    /// host error.
    pub async fn get_item_as_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        self.read_raw(key).await
    }

    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for an empty key, and any host error.
    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.host.remove_item(key).await?;
        debug!(key, "local storage item removed");
        Ok(())
    }

    /// # Errors
    ///
    /// Any host error.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.host.clear().await?;
        debug!("local storage cleared");
        Ok(())
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Any host error.
    pub async fn length(&self) -> Result<u32, StorageError> {
        self.host.length().await
    }

    /// Key at `index` in host order; `None` past the end.
    ///
    /// # Errors
    ///
    /// Any host error.
    pub async fn key(&self, index: u32) -> Result<Option<String>, StorageError> {
        self.host.key(index).await
    }

    /// # Errors
    ///
    /// Any host error.
    pub async fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        self.host.contains_key(key).await
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.host.get_item(key).await? {
            Some(stored) => Ok(Some(self.transformer.untransform_async(&stored).await?)),
            None => Ok(None),
        }
    }

    async fn old_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let Some(stored) = self.host.get_item(key).await? else {
            return Ok(None);
        };
        let untransformed = self.transformer.untransform_async(&stored).await;
        let raw = lenient_untransform(key, stored, untransformed)?;
        Ok(codec::decode_lenient(key, &raw))
    }

    // --- Shared write steps ---

    /// Raise `changing`; `None` when a subscriber cancelled.
    fn begin_change(
        &self,
        key: &str,
        old_value: Option<Value>,
        new_value: Value,
    ) -> Option<ChangingEvent> {
        let event = ChangingEvent {
            key: key.to_owned(),
            old_value,
            new_value,
        };
        if self.notifier.raise_changing(&event) == ChangeDecision::Cancel {
            debug!(key, "local storage write cancelled by subscriber");
            return None;
        }
        Some(event)
    }

    fn finish_change(&self, event: ChangingEvent) {
        debug!(key = %event.key, "local storage item written");
        self.notifier.raise_changed(&ChangedEvent::from(event));
    }
}

impl fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorage")
            .field("supports_sync", &self.supports_sync())
            .field("notifier", &self.notifier)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// BLOCKING VIEW
// =============================================================================

/// Blocking form of every [`LocalStorage`] operation. Shares the transformer,
/// options, and subscribers of the storage it was taken from.
pub struct SyncLocalStorage<'a> {
    storage: &'a LocalStorage,
    host: &'a dyn SyncHostStore,
}

impl SyncLocalStorage<'_> {
    /// Blocking [`LocalStorage::set_item`].
    ///
    /// # Errors
    ///
    /// Same as [`LocalStorage::set_item`].
    pub fn set_item<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized + 'static,
    {
        let pending = PendingWrite::prepare(key, value, &self.storage.options.json)?;
        let old_value = self.old_value(key)?;
        let Some(event) = self.storage.begin_change(key, old_value, pending.new_value) else {
            return Ok(());
        };

        let stored = self.storage.transformer.transform(&pending.encoded)?;
        self.host.set_item(key, &stored)?;
        self.storage.finish_change(event);
        Ok(())
    }

    /// Blocking [`LocalStorage::get_item`].
    ///
    /// # Errors
    ///
    /// Same as [`LocalStorage::get_item`].
    pub fn get_item<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default + 'static,
    {
        validate_key(key)?;
        match self.read_raw(key)? {
            Some(raw) => decode_item(key, &raw),
            None => Ok(T::default()),
        }
    }

    /// # Errors
    ///
    /// Same as [`LocalStorage::get_item_as_string`].
    pub fn get_item_as_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        self.read_raw(key)
    }

    /// # Errors
    ///
    /// Same as [`LocalStorage::remove_item`].
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.host.remove_item(key)?;
        debug!(key, "local storage item removed");
        Ok(())
    }

    /// # Errors
    ///
    /// Any host error.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.host.clear()?;
        debug!("local storage cleared");
        Ok(())
    }

    /// # Errors
    ///
    /// Any host error.
    pub fn length(&self) -> Result<u32, StorageError> {
        self.host.length()
    }

    /// # Errors
    ///
    /// Any host error.
    pub fn key(&self, index: u32) -> Result<Option<String>, StorageError> {
        self.host.key(index)
    }

    /// # Errors
    ///
    /// Any host error.
    pub fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        self.host.contains_key(key)
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.host.get_item(key)? {
            Some(stored) => Ok(Some(self.storage.transformer.untransform(&stored)?)),
            None => Ok(None),
        }
    }

    fn old_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let Some(stored) = self.host.get_item(key)? else {
            return Ok(None);
        };
        let untransformed = self.storage.transformer.untransform(&stored);
        let raw = lenient_untransform(key, stored, untransformed)?;
        Ok(codec::decode_lenient(key, &raw))
    }
}

impl fmt::Debug for SyncLocalStorage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncLocalStorage")
            .field("storage", self.storage)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Everything a write needs before the old value is looked up.
struct PendingWrite {
    encoded: String,
    new_value: Value,
}

impl PendingWrite {
    fn prepare<T>(key: &str, value: &T, options: &JsonOptions) -> Result<Self, StorageError>
    where
        T: Serialize + ?Sized + 'static,
    {
        validate_key(key)?;
        let encoded = codec::encode(value, options).map_err(StorageError::EncodeFailure)?;
        let new_value = event_value::<T>(&encoded);
        Ok(Self { encoded, new_value })
    }
}

/// Event payload read back from the encoded text, so that anything the store
/// accepts (e.g. `u128` beyond `u64`) also has a payload.
fn event_value<T: ?Sized + 'static>(encoded: &str) -> Value {
    if codec::is_text::<T>() {
        return Value::String(encoded.to_owned());
    }
    serde_json::from_str(encoded).unwrap_or_else(|_| Value::String(encoded.to_owned()))
}

fn decode_item<T>(key: &str, raw: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default + 'static,
{
    codec::decode(raw).map_err(|source| StorageError::DecodeFailure {
        key: key.to_owned(),
        source,
    })
}

/// Old-value lookups report the stored text when the transformer rejects it,
/// e.g. plaintext written before encryption was enabled.
fn lenient_untransform(
    key: &str,
    stored: String,
    untransformed: Result<String, StorageError>,
) -> Result<String, StorageError> {
    match untransformed {
        Ok(raw) => Ok(raw),
        Err(StorageError::TransformFailure(reason)) => {
            warn!(key, %reason, "previous value could not be untransformed; reporting stored text");
            Ok(stored)
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
