//! Login telemetry: best-effort, never gating.
//!
//! A sign-in produces one `login_logs` row carrying the client user agent
//! and a public IP resolved from an external echo endpoint. The whole write
//! runs as a detached task with its own timeout budget — it can neither
//! block nor fail the sign-in flow, and every failure is logged and
//! swallowed.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::store::models::{NewLoginLog, Profile};
use crate::store::{Filter, StoreClient};

/// Timeout for each IP-echo request.
const IP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Primary IP-echo endpoint, `{"ip": "<addr>"}`.
const PRIMARY_IP_ENDPOINT: &str = "https://api.ipify.org?format=json";

/// Fallback IP-echo endpoint, `{"origin": "<addr>"}`.
const FALLBACK_IP_ENDPOINT: &str = "https://httpbin.org/ip";

/// Recorded when no lookup succeeds within budget.
const UNKNOWN_IP: &str = "unknown";

/// User agent recorded on login rows.
pub const USER_AGENT: &str = concat!("kerjainwoy/", env!("CARGO_PKG_VERSION"));

/// Records login events and resolves user profiles.
pub struct SessionTracker {
    store: Arc<StoreClient>,
    http: reqwest::Client,
    primary_ip_endpoint: String,
    fallback_ip_endpoint: String,
}

impl SessionTracker {
    /// Create a tracker over the given store client.
    pub fn new(store: Arc<StoreClient>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(IP_LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::Config(format!("http client init failed: {e}")))?;
        Ok(Self {
            store,
            http,
            primary_ip_endpoint: PRIMARY_IP_ENDPOINT.to_string(),
            fallback_ip_endpoint: FALLBACK_IP_ENDPOINT.to_string(),
        })
    }

    /// Override the IP-echo endpoints (air-gapped or self-hosted setups).
    pub fn with_ip_endpoints(
        mut self,
        primary: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        self.primary_ip_endpoint = primary.into();
        self.fallback_ip_endpoint = fallback.into();
        self
    }

    /// Record a login event for `user_id`. Fire-and-forget: spawns a
    /// detached task and returns immediately. Requires a running tokio
    /// runtime.
    pub fn record_login(&self, user_id: &str) {
        let store = Arc::clone(&self.store);
        let http = self.http.clone();
        let primary = self.primary_ip_endpoint.clone();
        let fallback = self.fallback_ip_endpoint.clone();
        let user_id = user_id.to_string();

        tokio::spawn(async move {
            let ip_address = lookup_public_ip(&http, &primary, &fallback).await;
            let row = NewLoginLog {
                user_id: user_id.clone(),
                user_agent: USER_AGENT.to_string(),
                ip_address,
            };
            match store.insert_only("login_logs", &row).await {
                Ok(()) => tracing::debug!("login recorded for {user_id}"),
                Err(e) => tracing::warn!("failed to record login for {user_id}: {e}"),
            }
        });
    }

    /// Fetch the profile for `user_id`. Absence (no row, or any store
    /// failure) is `None` — callers treat an unknown role as non-admin.
    pub async fn resolve_profile(&self, user_id: &str) -> Option<Profile> {
        match self
            .store
            .select::<Profile>(
                "profiles",
                &[Filter::Eq("id", user_id.to_string())],
                None,
                Some(1),
                None,
            )
            .await
        {
            Ok(rows) => rows.into_iter().next(),
            Err(e) => {
                tracing::warn!("failed to resolve profile for {user_id}: {e}");
                None
            }
        }
    }
}

/// Resolve the client's public IP, trying the primary echo endpoint then
/// the fallback. Always returns a value; `"unknown"` when both fail.
async fn lookup_public_ip(http: &reqwest::Client, primary: &str, fallback: &str) -> String {
    match fetch_ip_field(http, primary, "ip").await {
        Some(ip) => return ip,
        None => tracing::warn!("primary IP lookup failed, trying fallback"),
    }
    match fetch_ip_field(http, fallback, "origin").await {
        Some(ip) => ip,
        None => {
            tracing::warn!("IP lookup failed on both endpoints, recording {UNKNOWN_IP}");
            UNKNOWN_IP.to_string()
        }
    }
}

async fn fetch_ip_field(http: &reqwest::Client, url: &str, field: &str) -> Option<String> {
    let resp = http.get(url).send().await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let body: serde_json::Value = resp.json().await.ok()?;
    body.get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}
