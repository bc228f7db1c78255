//! Field-level encryption for todo descriptions.
//!
//! AES-256-GCM with a random 96-bit nonce per call, so encrypting the same
//! plaintext twice yields different ciphertext. The key is derived from the
//! process-wide passphrase (SHA-256). Output format:
//! `aes256:<base64(nonce + ciphertext)>`.
//!
//! This is a confidentiality-at-rest measure only. Tampering shows up as an
//! AEAD failure and is handled like any other decode failure — there is no
//! separate integrity channel.
//!
//! Empty inputs pass through unchanged in both directions so empty
//! descriptions are not needlessly wrapped.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Nonce size for AES-256-GCM (12 bytes / 96 bits).
const NONCE_SIZE: usize = 12;

/// Prefix marking a value as AES-256-GCM ciphertext.
const CIPHERTEXT_PREFIX: &str = "aes256:";

/// Symmetric codec for sensitive free-text fields.
#[derive(Clone)]
pub struct CryptoCodec {
    key: [u8; 32],
}

impl CryptoCodec {
    /// Build a codec from the shared passphrase. Key derivation is a single
    /// SHA-256 — the passphrase is a machine secret from the environment,
    /// not a human password needing stretching.
    pub fn new(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Encrypt plaintext into a prefixed base64 string. Empty input is
    /// returned unchanged.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| Error::Decryption(format!("cipher init failed: {e}")))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::Decryption(format!("encryption failed: {e}")))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        let encoded = base64::engine::general_purpose::STANDARD.encode(&combined);
        Ok(format!("{CIPHERTEXT_PREFIX}{encoded}"))
    }

    /// Decrypt a prefixed base64 string back to plaintext. Empty input is
    /// returned unchanged.
    pub fn decrypt(&self, encrypted: &str) -> Result<String> {
        if encrypted.is_empty() {
            return Ok(String::new());
        }

        let encoded = encrypted
            .strip_prefix(CIPHERTEXT_PREFIX)
            .ok_or_else(|| Error::Decryption("missing ciphertext prefix".into()))?;

        let combined = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::Decryption(format!("invalid base64: {e}")))?;

        if combined.len() < NONCE_SIZE {
            return Err(Error::Decryption("ciphertext too short".into()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| Error::Decryption(format!("cipher init failed: {e}")))?;

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| Error::Decryption("wrong key or corrupted ciphertext".into()))?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::Decryption(format!("invalid UTF-8 in plaintext: {e}")))
    }

    /// Decrypt, recovering locally on failure: the condition is logged and
    /// the original (still-encrypted) string is returned, so a corrupted
    /// field degrades to unreadable text instead of failing the read path.
    pub fn decrypt_lossy(&self, encrypted: &str) -> String {
        match self.decrypt(encrypted) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                tracing::warn!("{e}; returning field as-is");
                encrypted.to_string()
            }
        }
    }

    /// Check whether a value carries the ciphertext prefix.
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(CIPHERTEXT_PREFIX)
    }
}
