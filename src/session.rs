//! Process-wide reactive auth session.
//!
//! One `AuthSession` owns the single subscription to the store's
//! session-change feed and publishes a consolidated [`AuthState`] through a
//! watch channel. Consumers hold receivers; there is no ambient singleton —
//! the handle is passed explicitly.
//!
//! State machine:
//! - `Initializing` → `Authenticated` when a session exists at startup
//!   (profile absence still authenticates, with `profile: None`)
//! - `Initializing` → `Unauthenticated` when none does
//! - `Unauthenticated` → `Authenticated` on sign-in; the login is recorded
//!   exactly once per sign-in event
//! - `Authenticated` → `Authenticated` on token refresh; profile
//!   re-resolved defensively, no login record
//! - `Authenticated` → `Unauthenticated` on sign-out; the store clears its
//!   session and emits the event before the revocation round-trip, so no
//!   consumer observes a stale authenticated state
//!
//! Each `watch` send replaces the whole state atomically — renderers never
//! see a partially updated user/profile pair.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::store::models::{AuthUser, Profile, Role};
use crate::store::{AuthEvent, StoreClient};
use crate::telemetry::SessionTracker;

/// Consolidated session state.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// Startup session fetch has not completed yet.
    Initializing,
    /// No active session.
    Unauthenticated,
    /// Signed in. `profile` is `None` when resolution failed or no profile
    /// row exists; that is role-unknown, not an error.
    Authenticated {
        user: AuthUser,
        profile: Option<Profile>,
    },
}

impl AuthState {
    /// Derived admin predicate; false whenever the profile is absent.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Authenticated {
                profile: Some(profile),
                ..
            } if profile.role == Role::Admin
        )
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Owned handle over the session state. Dropping it tears down the feed
/// subscription.
pub struct AuthSession {
    state_rx: watch::Receiver<AuthState>,
    task: tokio::task::JoinHandle<()>,
}

impl AuthSession {
    /// Start the session task: resolve the startup session, then react to
    /// the store's auth-event feed. The feed subscription is taken before
    /// the task is spawned, so events emitted immediately after `start`
    /// returns are never lost.
    pub fn start(store: Arc<StoreClient>, tracker: Arc<SessionTracker>) -> Self {
        let (state_tx, state_rx) = watch::channel(AuthState::Initializing);
        let events = store.subscribe_auth_events();
        let task = tokio::spawn(run(store, tracker, state_tx, events));
        Self { state_rx, task }
    }

    /// Subscribe to state updates.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_rx.clone()
    }

    /// Snapshot of the latest state.
    pub fn current(&self) -> AuthState {
        self.state_rx.borrow().clone()
    }

    /// Stop reacting to session changes.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    store: Arc<StoreClient>,
    tracker: Arc<SessionTracker>,
    state_tx: watch::Sender<AuthState>,
    mut events: broadcast::Receiver<AuthEvent>,
) {
    // Startup: adopt whatever session the store already holds.
    match store.current_session() {
        Some(session) => {
            let profile = tracker.resolve_profile(&session.user.id).await;
            let _ = state_tx.send(AuthState::Authenticated {
                user: session.user,
                profile,
            });
        }
        None => {
            let _ = state_tx.send(AuthState::Unauthenticated);
        }
    }

    loop {
        match events.recv().await {
            Ok(AuthEvent::SignedIn(session)) => {
                // Exactly once per sign-in event; refreshes don't get here.
                tracker.record_login(&session.user.id);
                let profile = tracker.resolve_profile(&session.user.id).await;
                let _ = state_tx.send(AuthState::Authenticated {
                    user: session.user,
                    profile,
                });
            }
            Ok(AuthEvent::TokenRefreshed(session)) => {
                let profile = tracker.resolve_profile(&session.user.id).await;
                let _ = state_tx.send(AuthState::Authenticated {
                    user: session.user,
                    profile,
                });
            }
            Ok(AuthEvent::SignedOut) => {
                let _ = state_tx.send(AuthState::Unauthenticated);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("auth event feed lagged, {skipped} events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
