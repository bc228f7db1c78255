//! Error taxonomy for the KerjainWoy client.
//!
//! Four classes, with distinct propagation policies:
//! - `Validation` — local, user-correctable, rejected before any network call
//! - `Store` — remote query/auth failure; the remote message is carried
//!   verbatim so the caller can surface it as-is
//! - `Decryption` — field-crypto failure; recovered locally via
//!   [`CryptoCodec::decrypt_lossy`](crate::crypto::CryptoCodec::decrypt_lossy)
//! - `Config` — startup misconfiguration, fatal before any work starts
//!
//! Telemetry failures (login logging, IP lookup) are deliberately not
//! represented here: they are logged and swallowed inside the tracker and
//! never reach a caller.

use thiserror::Error;

/// Client-side error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Local input validation failure. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Remote store or auth failure, including transport errors and
    /// timeouts. Carries the remote status and body verbatim.
    #[error("{0}")]
    Store(String),

    /// Field encryption/decryption failure (malformed ciphertext, wrong
    /// key, AEAD tag mismatch).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Missing or empty required configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a `Store` error from an HTTP status and response body.
    pub fn store(status: reqwest::StatusCode, body: &str) -> Self {
        Self::Store(format!("{status}: {body}"))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Store(e.to_string())
    }
}
