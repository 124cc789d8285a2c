//! XChaCha20-Poly1305 transformer.
//!
//! Stored format: base64 of `[24-byte nonce][ciphertext + 16-byte tag]`.
//! A fresh random nonce is drawn for every write, so equal values produce
//! different stored text.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::XChaCha20Poly1305;

use super::DataTransformer;
use crate::error::StorageError;

const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

/// Encrypts stored values with a caller-supplied 32-byte key.
pub struct EncryptingTransformer {
    cipher: XChaCha20Poly1305,
}

impl EncryptingTransformer {
    #[must_use]
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(GenericArray::from_slice(key)),
        }
    }
}

impl fmt::Debug for EncryptingTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptingTransformer").finish_non_exhaustive()
    }
}

impl DataTransformer for EncryptingTransformer {
    fn transform(&self, data: &str) -> Result<String, StorageError> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, data.as_bytes())
            .map_err(|_| StorageError::TransformFailure("encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend(ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn untransform(&self, data: &str) -> Result<String, StorageError> {
        let bytes = STANDARD.decode(data).map_err(|e| {
            StorageError::TransformFailure(format!("stored value is not base64: {e}"))
        })?;
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(StorageError::TransformFailure(
                "stored value too short for nonce and tag".into(),
            ));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| StorageError::TransformFailure("decryption failed".into()))?;

        String::from_utf8(plaintext).map_err(|e| {
            StorageError::TransformFailure(format!("decrypted value is not UTF-8: {e}"))
        })
    }
}

#[cfg(test)]
#[path = "encryption_test.rs"]
mod tests;
