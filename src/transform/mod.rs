//! Transform hook applied to the raw stored string.
//!
//! SYSTEM CONTEXT
//! ==============
//! Writes run `encode -> transform -> host`, reads run
//! `host -> untransform -> decode`. The transformer sees only text and knows
//! nothing about JSON, which keeps encryption or compression layers out of the
//! storage accessor.

#[cfg(feature = "encryption")]
mod encryption;

#[cfg(feature = "encryption")]
pub use encryption::EncryptingTransformer;

use crate::error::StorageError;

/// Reversible string transformation between the codec and the host store.
///
/// The async forms default to the sync forms; override them when the
/// transformation itself has to await (e.g. `SubtleCrypto`).
#[async_trait::async_trait(?Send)]
pub trait DataTransformer {
    /// Turn encoded text into the form written to the host store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransformFailure`] when the input is rejected.
    fn transform(&self, data: &str) -> Result<String, StorageError>;

    /// Reverse [`DataTransformer::transform`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransformFailure`] when the input was not
    /// produced by this transformer.
    fn untransform(&self, data: &str) -> Result<String, StorageError>;

    async fn transform_async(&self, data: &str) -> Result<String, StorageError> {
        self.transform(data)
    }

    async fn untransform_async(&self, data: &str) -> Result<String, StorageError> {
        self.untransform(data)
    }
}

/// Default transformer: stores encoded text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl DataTransformer for IdentityTransformer {
    fn transform(&self, data: &str) -> Result<String, StorageError> {
        Ok(data.to_owned())
    }

    fn untransform(&self, data: &str) -> Result<String, StorageError> {
        Ok(data.to_owned())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
