//! Error taxonomy for local storage operations.
//!
//! ERROR HANDLING
//! ==============
//! Key validation fails fast before the host store is touched. Host failures
//! (quota exceeded, security errors) are carried through unchanged as text and
//! never retried. Decode failures are only surfaced on explicit reads; the
//! old-value lookup behind change events degrades instead of failing.

/// Errors produced by [`crate::LocalStorage`] and the host store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key was empty.
    #[error("storage key must be a non-empty string")]
    InvalidKey,

    /// The requested kind of host access does not exist in this context.
    #[error("local storage unavailable: {0}")]
    StoreUnavailable(&'static str),

    /// The stored text is not valid JSON for the requested type.
    #[error("stored value for key '{key}' could not be decoded: {source}")]
    DecodeFailure {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value to write could not be serialized.
    #[error("value could not be encoded: {0}")]
    EncodeFailure(#[source] serde_json::Error),

    /// The data transformer rejected its input.
    #[error("transform failed: {0}")]
    TransformFailure(String),

    /// The host store raised an error.
    #[error("host store error: {0}")]
    Host(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),
}

impl StorageError {
    /// Grepable code for logs and UI error surfaces.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKey => "E_INVALID_KEY",
            Self::StoreUnavailable(_) => "E_STORE_UNAVAILABLE",
            Self::DecodeFailure { .. } => "E_DECODE",
            Self::EncodeFailure(_) => "E_ENCODE",
            Self::TransformFailure(_) => "E_TRANSFORM",
            Self::Host(_) => "E_HOST",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
        }
    }
}

/// Reject empty keys before any host access.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey);
    }
    Ok(())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
