//! Wire models for the remote store.
//!
//! Remote rows come back as JSON with fields that may be absent depending
//! on which strategy produced them (PostgREST row, admin auth listing, or
//! RPC). Absence is a typed `Option`, never a missing-key panic, and the
//! three user-listing shapes all normalize to [`UserRecord`] at the
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Roles ────────────────────────────────────────────────────────

/// Authorization tier stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Unknown role strings fold to `User`: an unrecognized tier must never
    /// grant admin.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str_lossy(&s))
    }
}

// ── Auth ─────────────────────────────────────────────────────────

/// User identity as returned by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An authenticated session (held in memory for the process lifetime).
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Raw user shape from the `admin/users` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Table rows ───────────────────────────────────────────────────

/// Row in the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row in the `todos` table. `description` holds ciphertext at rest; the
/// repository decrypts it before handing rows to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for `todos` (server assigns id and created_at).
#[derive(Debug, Clone, Serialize)]
pub struct NewTodo {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Row in the `login_logs` table. Written once per sign-in, never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginLog {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub login_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// Insert payload for `login_logs` (login_time defaults server-side).
#[derive(Debug, Clone, Serialize)]
pub struct NewLoginLog {
    pub user_id: String,
    pub user_agent: String,
    pub ip_address: String,
}

// ── Normalized user record ───────────────────────────────────────

/// Single user shape every listing strategy normalizes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Profile> for UserRecord {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            role: p.role,
            created_at: p.created_at,
        }
    }
}

impl From<AdminUser> for UserRecord {
    fn from(u: AdminUser) -> Self {
        let role = u
            .user_metadata
            .get("role")
            .and_then(serde_json::Value::as_str)
            .map(Role::from_str_lossy)
            .unwrap_or_default();
        Self {
            id: u.id,
            email: u.email,
            role,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_unknown_string_folds_to_user() {
        assert_eq!(Role::from_str_lossy("admin"), Role::Admin);
        assert_eq!(Role::from_str_lossy("user"), Role::User);
        assert_eq!(Role::from_str_lossy("superuser"), Role::User);
        assert_eq!(Role::from_str_lossy(""), Role::User);
    }

    #[test]
    fn profile_deserializes_with_missing_fields() {
        let profile: Profile = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.email, None);
        assert_eq!(profile.role, Role::User);
        assert!(profile.created_at.is_none());
    }

    #[test]
    fn profile_role_roundtrips_through_json() {
        let json = r#"{"id": "u1", "email": "a@x.com", "role": "admin"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role, Role::Admin);

        let back = serde_json::to_string(&profile).unwrap();
        assert!(back.contains(r#""role":"admin""#));
    }

    #[test]
    fn todo_defaults_completed_to_false() {
        let json = r#"{"id": "t1", "user_id": "u1", "title": "belanja"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert!(!todo.completed);
        assert!(todo.description.is_none());
    }

    #[test]
    fn session_deserializes_token_response() {
        let json = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": {"id": "u1", "email": "a@x.com", "created_at": "2024-05-01T10:00:00Z"}
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "at");
        assert_eq!(session.user.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn admin_user_normalizes_metadata_role() {
        let json = r#"{"id": "u1", "email": "a@x.com", "user_metadata": {"role": "admin"}}"#;
        let user: AdminUser = serde_json::from_str(json).unwrap();
        let record = UserRecord::from(user);
        assert_eq!(record.role, Role::Admin);
    }

    #[test]
    fn admin_user_without_metadata_defaults_to_user_role() {
        let json = r#"{"id": "u1", "email": "a@x.com"}"#;
        let user: AdminUser = serde_json::from_str(json).unwrap();
        let record = UserRecord::from(user);
        assert_eq!(record.role, Role::User);
    }
}
