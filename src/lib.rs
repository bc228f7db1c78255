//! KerjainWoy client SDK.
//!
//! Typed client for a Supabase-style todo backend:
//! - [`store::StoreClient`] — PostgREST tables + GoTrue auth over HTTP
//! - [`crypto::CryptoCodec`] — AES-256-GCM encryption of description fields
//! - [`session::AuthSession`] — process-wide reactive session state
//! - [`telemetry::SessionTracker`] — fire-and-forget login logging
//! - [`todos::TodoRepository`] — CRUD with the encryption boundary applied
//! - [`dashboard::DashboardAggregator`] — client-side stats and log joins
//!
//! All remote calls are async and bounded (10 s store, 5 s IP lookup).
//! Wiring order: [`Config`] → [`store::StoreClient`] →
//! [`telemetry::SessionTracker`] → [`session::AuthSession`], then the
//! repository and aggregator on top.

pub mod config;
pub mod crypto;
pub mod dashboard;
pub mod error;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod todos;

pub use config::Config;
pub use crypto::CryptoCodec;
pub use error::{Error, Result};
pub use session::{AuthSession, AuthState};
pub use store::{AuthEvent, SignUpOutcome, StoreClient};
pub use telemetry::SessionTracker;
pub use todos::{Scope, TodoRepository};
