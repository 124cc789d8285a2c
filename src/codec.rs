//! Value codec: decides between plain text and JSON for stored values.
//!
//! DESIGN
//! ======
//! String-typed values are written verbatim so that other scripts sharing the
//! origin see `hello`, not `"hello"`. Everything else is JSON. On read, the
//! requested type and the shape of the stored text pick the path:
//!
//! 1. empty or whitespace text decodes to `T::default()`
//! 2. a string type over text that is not brace- or quote-wrapped is returned
//!    verbatim
//! 3. a string type over brace- or quote-wrapped text is parsed as a JSON
//!    string, and the text itself is returned when it is not one
//! 4. anything else is parsed as JSON into `T`, and a parse error is returned
//!
//! TRADE-OFFS
//! ==========
//! Sniffing `{...}` / `"..."` is ambiguous for strings that happen to look
//! like JSON: a stored `"quoted"` string reads back unquoted through
//! [`decode`], since earlier clients wrote JSON-encoded strings that way.
//! Brace-wrapped strings such as `{"a":1}` round-trip exactly. Callers that
//! need the stored text untouched use `get_item_as_string`.
//!
//! The old-value lookup for change events uses [`decode_lenient`], which never
//! fails. Reads stay strict so that corrupt data is visible to callers, while a
//! write never fails because the value it replaces is malformed.

use std::any::TypeId;
use std::borrow::Cow;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::config::{JsonOptions, JsonStyle};

/// Whether `T` is one of the string types stored as plain text.
#[must_use]
pub fn is_text<T: ?Sized + 'static>() -> bool {
    let id = TypeId::of::<T>();
    id == TypeId::of::<String>()
        || id == TypeId::of::<str>()
        || id == TypeId::of::<&'static str>()
        || id == TypeId::of::<Box<str>>()
        || id == TypeId::of::<Cow<'static, str>>()
}

/// `true` when `raw` starts and ends with braces, or starts and ends with a
/// double quote.
#[must_use]
pub fn looks_like_json(raw: &str) -> bool {
    (raw.starts_with('{') && raw.ends_with('}')) || (raw.starts_with('"') && raw.ends_with('"'))
}

/// Encode a value into the text handed to the transformer.
///
/// # Errors
///
/// Returns the `serde_json` error when the value cannot be serialized, e.g. a
/// map whose keys are not strings.
pub fn encode<T>(value: &T, options: &JsonOptions) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized + 'static,
{
    if is_text::<T>() {
        if let Value::String(text) = serde_json::to_value(value)? {
            return Ok(text);
        }
    }
    match options.style {
        JsonStyle::Compact => serde_json::to_string(value),
        JsonStyle::Pretty => serde_json::to_string_pretty(value),
    }
}

/// Strict decode used by explicit reads.
///
/// # Errors
///
/// Returns the `serde_json` error when non-string data does not parse as `T`.
pub fn decode<T>(raw: &str) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default + 'static,
{
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    if is_text::<T>() {
        let text = match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(inner)) if looks_like_json(raw) => inner,
            _ => raw.to_owned(),
        };
        return serde_json::from_value(Value::String(text));
    }
    serde_json::from_str(raw)
}

/// Best-effort decode of a previous value for change events.
///
/// Returns `None` for empty text, the parsed JSON for well-formed JSON-shaped
/// text, and the raw text as a JSON string otherwise.
#[must_use]
pub fn decode_lenient(key: &str, raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    if !looks_like_json(raw) {
        return Some(Value::String(raw.to_owned()));
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "previous value is not valid JSON; reporting raw text");
            Some(Value::String(raw.to_owned()))
        }
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
