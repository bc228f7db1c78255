//! Client-side dashboard aggregation.
//!
//! The backend offers no aggregate views, so summary counts and the
//! login-log listing are assembled here: fetch the collections, count and
//! join in memory. User listing runs through an ordered fallback chain —
//! the `profiles` table, then the admin auth listing, then the
//! `get_all_users` RPC — because none of the three is available under every
//! deployment's permissions. Every shape normalizes to
//! [`UserRecord`](crate::store::models::UserRecord) at the boundary.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::store::models::{LoginLog, Profile, Todo, UserRecord};
use crate::store::{Filter, Order, StoreClient};

/// Login-log page size.
pub const LOGIN_LOG_PAGE_SIZE: u32 = 50;

/// Placeholder for a log row whose user has no resolvable profile.
const UNKNOWN_USER: &str = "Unknown User";

/// Summary counts for the admin overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_todos: usize,
    pub completed_todos: usize,
    pub pending_todos: usize,
}

/// A login-log row joined with its user's profile.
#[derive(Debug, Clone)]
pub struct LoginLogView {
    pub log: LoginLog,
    pub email: String,
    /// Role as a display string; `"unknown"` when no profile matched.
    pub role: String,
}

/// Derives dashboard views from the remote collections.
pub struct DashboardAggregator {
    store: Arc<StoreClient>,
}

impl DashboardAggregator {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// Fetch the user list through the fallback chain. Each failed (or
    /// empty) strategy is logged and the next one tried; when the chain is
    /// exhausted the list is empty rather than an error, so the rest of the
    /// dashboard still renders.
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        match self
            .store
            .select::<Profile>("profiles", &[], None, None, None)
            .await
        {
            Ok(profiles) if !profiles.is_empty() => {
                return Ok(profiles.into_iter().map(UserRecord::from).collect());
            }
            Ok(_) => tracing::warn!("profiles table empty, falling back to admin listing"),
            Err(e) => tracing::warn!("profiles query failed ({e}), falling back to admin listing"),
        }

        match self.store.admin_list_users().await {
            Ok(users) => return Ok(users.into_iter().map(UserRecord::from).collect()),
            Err(e) => tracing::warn!("admin user listing failed ({e}), falling back to rpc"),
        }

        match self
            .store
            .rpc::<Vec<UserRecord>, _>("get_all_users", &serde_json::json!({}))
            .await
        {
            Ok(users) => Ok(users),
            Err(e) => {
                tracing::warn!("get_all_users rpc failed ({e}); no user listing available");
                Ok(Vec::new())
            }
        }
    }

    /// Summary counts over all users and todos.
    pub async fn stats(&self) -> Result<DashboardStats> {
        let users = self.fetch_users().await?;
        let todos: Vec<Todo> = self.store.select("todos", &[], None, None, None).await?;
        Ok(compute_stats(&users, &todos))
    }

    /// One page of login logs, newest first, joined with profiles.
    pub async fn login_log_page(&self, page: u32) -> Result<Vec<LoginLogView>> {
        let logs: Vec<LoginLog> = self
            .store
            .select(
                "login_logs",
                &[],
                Some(Order::Desc("login_time")),
                Some(LOGIN_LOG_PAGE_SIZE),
                Some(page * LOGIN_LOG_PAGE_SIZE),
            )
            .await?;

        let mut user_ids: Vec<String> = logs.iter().map(|log| log.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();

        let profiles = if user_ids.is_empty() {
            Vec::new()
        } else {
            match self
                .store
                .select::<Profile>("profiles", &[Filter::In("id", user_ids)], None, None, None)
                .await
            {
                Ok(profiles) => profiles,
                Err(e) => {
                    // Logs still render, just without identities
                    tracing::warn!("profile join failed ({e}); showing logs unlabelled");
                    Vec::new()
                }
            }
        };

        Ok(join_logs(logs, &profiles))
    }
}

fn compute_stats(users: &[UserRecord], todos: &[Todo]) -> DashboardStats {
    let completed_todos = todos.iter().filter(|t| t.completed).count();
    DashboardStats {
        total_users: users.len(),
        total_todos: todos.len(),
        completed_todos,
        pending_todos: todos.len() - completed_todos,
    }
}

fn join_logs(logs: Vec<LoginLog>, profiles: &[Profile]) -> Vec<LoginLogView> {
    let by_id: HashMap<&str, &Profile> =
        profiles.iter().map(|p| (p.id.as_str(), p)).collect();

    logs.into_iter()
        .map(|log| match by_id.get(log.user_id.as_str()) {
            Some(profile) => LoginLogView {
                email: profile
                    .email
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                role: profile.role.as_str().to_string(),
                log,
            },
            None => LoginLogView {
                email: UNKNOWN_USER.to_string(),
                role: "unknown".to_string(),
                log,
            },
        })
        .collect()
}
