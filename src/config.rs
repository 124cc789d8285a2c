//! Codec configuration for [`crate::LocalStorage`].
//!
//! Options are plain `Copy` values. Hosts that have a process environment
//! (tests, native shells) can build them with [`LocalStorageOptions::from_env`];
//! in the browser the environment is empty and defaults apply.

use crate::error::StorageError;

/// Environment variable selecting the JSON output style.
pub const JSON_STYLE_ENV: &str = "LOCAL_STORAGE_JSON_STYLE";

/// How non-string values are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonStyle {
    /// Single-line JSON (`serde_json::to_string`).
    #[default]
    Compact,
    /// Indented JSON (`serde_json::to_string_pretty`), easier to read in devtools.
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    pub style: JsonStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalStorageOptions {
    pub json: JsonOptions,
}

impl LocalStorageOptions {
    /// Build options from environment variables.
    ///
    /// Optional:
    /// - `LOCAL_STORAGE_JSON_STYLE`: `compact` (default) or `pretty`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigParse`] for an unknown style.
    pub fn from_env() -> Result<Self, StorageError> {
        let raw = std::env::var(JSON_STYLE_ENV).unwrap_or_default();
        let style = parse_json_style(&raw)?;
        Ok(Self { json: JsonOptions { style } })
    }

    #[must_use]
    pub fn with_json_style(mut self, style: JsonStyle) -> Self {
        self.json.style = style;
        self
    }
}

fn parse_json_style(raw: &str) -> Result<JsonStyle, StorageError> {
    match raw.trim() {
        "" | "compact" => Ok(JsonStyle::Compact),
        "pretty" => Ok(JsonStyle::Pretty),
        other => Err(StorageError::ConfigParse(format!(
            "unsupported {JSON_STYLE_ENV} '{other}' (expected 'compact' or 'pretty')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
