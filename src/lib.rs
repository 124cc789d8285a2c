//! Typed, observable access to browser `localStorage`.
//!
//! SYSTEM CONTEXT
//! ==============
//! UI code stores preferences, drafts, and tokens under string keys. This
//! crate sits between that code and the host key/value store: values are
//! serialized with `serde_json` (strings stay plain text), passed through a
//! replaceable [`DataTransformer`] (identity by default, encryption with the
//! `encryption` feature), and every write raises `changing` / `changed`
//! events that subscribers can observe or cancel.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`service`] | [`LocalStorage`] accessor and its blocking [`SyncLocalStorage`] view |
//! | [`codec`] | Plain-text vs JSON decision and (de)serialization |
//! | [`transform`] | [`DataTransformer`] hook and built-in transformers |
//! | [`events`] | [`ChangeNotifier`] and event records |
//! | [`host`] | [`HostStore`] / [`SyncHostStore`] boundary, memory and browser stores |
//! | [`config`] | [`LocalStorageOptions`] |
//! | [`error`] | [`StorageError`] |
//!
//! ## Features
//!
//! - `hydrate`: `BrowserStore` over `window.localStorage` (wasm32)
//! - `encryption`: `EncryptingTransformer` (XChaCha20-Poly1305)

pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod service;
pub mod transform;

pub use config::{JsonOptions, JsonStyle, LocalStorageOptions};
pub use error::StorageError;
pub use events::{ChangeDecision, ChangeNotifier, ChangedEvent, ChangingEvent, SubscriptionId};
#[cfg(feature = "hydrate")]
pub use host::BrowserStore;
pub use host::{HostStore, MemoryStore, SyncHostStore};
pub use service::{LocalStorage, SyncLocalStorage};
#[cfg(feature = "encryption")]
pub use transform::EncryptingTransformer;
pub use transform::{DataTransformer, IdentityTransformer};
