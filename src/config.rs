//! Process configuration, loaded from the environment at startup.
//!
//! Three values are required and there are no defaults: operating with an
//! undefined encryption key or store endpoint must fail fast with a clear
//! error instead of producing unreadable rows later.

use crate::error::{Error, Result};

/// Environment variable holding the store project URL.
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the store anon (publishable) key.
pub const ENV_STORE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
/// Environment variable holding the description-encryption passphrase.
pub const ENV_ENCRYPTION_KEY: &str = "KERJAINWOY_ENCRYPTION_KEY";

/// Connection + crypto configuration for one client process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store project URL (e.g. https://xxxx.supabase.co), no trailing slash.
    pub store_url: String,
    /// Anon key for RLS-scoped requests.
    pub anon_key: String,
    /// Shared passphrase for description field encryption.
    pub encryption_key: String,
}

impl Config {
    /// Load from environment variables, failing on any missing or empty
    /// value.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store_url: require(ENV_STORE_URL)?.trim_end_matches('/').to_string(),
            anon_key: require(ENV_STORE_ANON_KEY)?,
            encryption_key: require(ENV_ENCRYPTION_KEY)?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} is not set"))),
    }
}
