//! HTTP client for the remote store.
//!
//! Two surfaces behind one client:
//! - PostgREST (`rest/v1/<table>`) — typed select/insert/update/delete/rpc
//!   with filter and ordering query parameters
//! - GoTrue (`auth/v1/...`) — signup, password sign-in, sign-out, OTP
//!   verify/resend, token refresh, admin user listing
//!
//! ## Design
//! - One reqwest client with a 10 s timeout; a hung request becomes a
//!   `Store` error instead of stranding the caller in a loading state.
//! - The client is the session store: tokens live in an in-memory cell and
//!   requests carry the user access token when signed in, the anon key
//!   otherwise (RLS-compatible).
//! - Session changes fan out on a broadcast channel ([`AuthEvent`]) so the
//!   process-wide session handle can react without polling.
//! - Every non-2xx response surfaces as `Store("<status>: <body>")` with
//!   the remote message verbatim.

pub mod models;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{Error, Result};
use models::{AdminUser, AuthUser, Session};

/// Timeout applied to every store/auth request.
const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffered auth events before slow subscribers start lagging.
const AUTH_EVENT_CAPACITY: usize = 16;

// ── Query building ───────────────────────────────────────────────

/// Row filter, encoded as a PostgREST query parameter.
#[derive(Debug, Clone)]
pub enum Filter {
    /// `column = value`
    Eq(&'static str, String),
    /// `column IN (values...)`
    In(&'static str, Vec<String>),
}

impl Filter {
    fn to_query_pair(&self) -> (String, String) {
        match self {
            Self::Eq(column, value) => ((*column).to_string(), format!("eq.{value}")),
            Self::In(column, values) => {
                ((*column).to_string(), format!("in.({})", values.join(",")))
            }
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy)]
pub enum Order {
    Asc(&'static str),
    Desc(&'static str),
}

impl Order {
    fn to_query_value(self) -> String {
        match self {
            Self::Asc(column) => format!("{column}.asc"),
            Self::Desc(column) => format!("{column}.desc"),
        }
    }
}

// ── Auth events & outcomes ───────────────────────────────────────

/// Session-change notification emitted by the client.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A new session was established (password sign-in or OTP verify).
    SignedIn(Session),
    /// The session ended (explicit sign-out).
    SignedOut,
    /// Tokens were refreshed; user identity is unchanged.
    TokenRefreshed(Session),
}

/// Result of a signup call.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account created; the user must verify via the emailed OTP before
    /// signing in.
    VerificationPending(AuthUser),
    /// Instance has auto-confirm enabled; the signup produced a session.
    SignedIn(Session),
}

// ── Client ───────────────────────────────────────────────────────

/// HTTP client for the KerjainWoy backend.
pub struct StoreClient {
    url: String,
    anon_key: String,
    http: reqwest::Client,
    session: RwLock<Option<Session>>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl StoreClient {
    /// Create a new client. Does not touch the network.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(STORE_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("http client init failed: {e}")))?;
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            url: config.store_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            http,
            session: RwLock::new(None),
            auth_events,
        })
    }

    /// Build the PostgREST URL for a table.
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// Build the RPC URL for a function.
    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.url, function)
    }

    /// Build a GoTrue endpoint URL.
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    /// Headers for authenticated requests: the anon key always, plus a
    /// bearer token — the user's access token when signed in, the anon key
    /// otherwise.
    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        let bearer = self
            .session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        vec![
            ("apikey", self.anon_key.clone()),
            ("Authorization", format!("Bearer {bearer}")),
        ]
    }

    fn with_auth(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (key, value) in self.auth_headers() {
            request = request.header(key, value);
        }
        request
    }

    /// Turn a non-2xx response into a `Store` error carrying the remote
    /// message verbatim.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(Error::store(status, &body))
    }

    // ── Table operations ─────────────────────────────────────

    /// Select rows from a table with optional filters, ordering, and
    /// pagination.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<Order>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<T>> {
        let mut query: Vec<(String, String)> = vec![("select".into(), "*".into())];
        query.extend(filters.iter().map(Filter::to_query_pair));
        if let Some(order) = order {
            query.push(("order".into(), order.to_query_value()));
        }
        if let Some(limit) = limit {
            query.push(("limit".into(), limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset".into(), offset.to_string()));
        }

        let request = self.with_auth(self.http.get(self.table_url(table)).query(&query));
        let resp = Self::check(request.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T> {
        let request = self.with_auth(
            self.http
                .post(self.table_url(table))
                .header("Prefer", "return=representation")
                .json(row),
        );
        let resp = Self::check(request.send().await?).await?;
        let rows: Vec<T> = resp.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Store("insert returned an empty representation".into()))
    }

    /// Insert a row without asking for the representation back. Used for
    /// telemetry writes where the stored row is never read by the writer.
    pub async fn insert_only<B: Serialize>(&self, table: &str, row: &B) -> Result<()> {
        let request = self.with_auth(self.http.post(self.table_url(table)).json(row));
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Patch a single row by id.
    pub async fn update<B: Serialize>(&self, table: &str, id: &str, patch: &B) -> Result<()> {
        let request = self.with_auth(
            self.http
                .patch(self.table_url(table))
                .query(&[("id", format!("eq.{id}"))])
                .json(patch),
        );
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Delete a single row by id.
    pub async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let request = self.with_auth(
            self.http
                .delete(self.table_url(table))
                .query(&[("id", format!("eq.{id}"))]),
        );
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Call a database function.
    pub async fn rpc<T: DeserializeOwned, B: Serialize>(
        &self,
        function: &str,
        args: &B,
    ) -> Result<T> {
        let request = self.with_auth(self.http.post(self.rpc_url(function)).json(args));
        let resp = Self::check(request.send().await?).await?;
        Ok(resp.json().await?)
    }

    // ── Auth operations ──────────────────────────────────────

    /// Register a new account. Detects already-registered emails
    /// explicitly: the auth service masks duplicates behind a user object
    /// with an empty `identities` array.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let request = self.with_auth(self.http.post(self.auth_url("signup")).json(&payload));
        let resp = Self::check(request.send().await?).await?;
        let body: serde_json::Value = resp.json().await?;

        let user_obj = if body.get("access_token").is_some() {
            body.get("user").cloned().unwrap_or_default()
        } else {
            body.clone()
        };
        let duplicate = user_obj
            .get("identities")
            .and_then(serde_json::Value::as_array)
            .is_some_and(Vec::is_empty);
        if duplicate {
            return Err(Error::Validation(format!("{email} is already registered")));
        }

        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)
                .map_err(|e| Error::Store(format!("malformed signup session: {e}")))?;
            self.install_session(session.clone(), AuthEvent::SignedIn(session.clone()));
            return Ok(SignUpOutcome::SignedIn(session));
        }

        let user: AuthUser = serde_json::from_value(body)
            .map_err(|e| Error::Store(format!("malformed signup response: {e}")))?;
        Ok(SignUpOutcome::VerificationPending(user))
    }

    /// Sign in with email + password. Stores the session and emits
    /// [`AuthEvent::SignedIn`].
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let request = self.with_auth(
            self.http
                .post(self.auth_url("token"))
                .query(&[("grant_type", "password")])
                .json(&payload),
        );
        let resp = Self::check(request.send().await?).await?;
        let session: Session = resp.json().await?;
        self.install_session(session.clone(), AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Sign out. The local session is cleared and [`AuthEvent::SignedOut`]
    /// emitted *before* the network revocation, so no caller can observe a
    /// stale authenticated state while the request is in flight. A failed
    /// revocation is logged, not surfaced — locally the session is gone
    /// either way.
    pub async fn sign_out(&self) -> Result<()> {
        let token = match self.session.write().take() {
            Some(session) => session.access_token,
            None => return Ok(()),
        };
        let _ = self.auth_events.send(AuthEvent::SignedOut);

        let request = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", self.anon_key.clone())
            .header("Authorization", format!("Bearer {token}"));
        match request.send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!("token revocation failed ({status}): {body}");
            }
            Err(e) => tracing::warn!("token revocation failed: {e}"),
        }
        Ok(())
    }

    /// Exchange the refresh token for a new session. Same user; emits
    /// [`AuthEvent::TokenRefreshed`].
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or_else(|| Error::Store("no session to refresh".into()))?;

        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let request = self.with_auth(
            self.http
                .post(self.auth_url("token"))
                .query(&[("grant_type", "refresh_token")])
                .json(&payload),
        );
        let resp = Self::check(request.send().await?).await?;
        let session: Session = resp.json().await?;
        self.install_session(session.clone(), AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// Verify a signup OTP. Produces a session on success.
    pub async fn verify_otp(&self, email: &str, token: &str) -> Result<Session> {
        let payload = serde_json::json!({ "type": "signup", "email": email, "token": token });
        let request = self.with_auth(self.http.post(self.auth_url("verify")).json(&payload));
        let resp = Self::check(request.send().await?).await?;
        let session: Session = resp.json().await?;
        self.install_session(session.clone(), AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Resend the signup OTP for an email. Safe to repeat; never creates a
    /// second account.
    pub async fn resend_signup_otp(&self, email: &str) -> Result<()> {
        let payload = serde_json::json!({ "type": "signup", "email": email });
        let request = self.with_auth(self.http.post(self.auth_url("resend")).json(&payload));
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// List all users via the admin endpoint. Succeeds only when the
    /// configured key carries the service role; failures feed the
    /// dashboard's fallback chain.
    pub async fn admin_list_users(&self) -> Result<Vec<AdminUser>> {
        #[derive(serde::Deserialize)]
        struct Listing {
            users: Vec<AdminUser>,
        }

        let request = self.with_auth(self.http.get(self.auth_url("admin/users")));
        let resp = Self::check(request.send().await?).await?;
        let listing: Listing = resp.json().await?;
        Ok(listing.users)
    }

    // ── Session state ────────────────────────────────────────

    /// The in-memory session, if signed in.
    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Subscribe to session-change notifications.
    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    fn install_session(&self, session: Session, event: AuthEvent) {
        *self.session.write() = Some(session);
        // No receivers yet is fine; the feed is best-effort fan-out.
        let _ = self.auth_events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Todo;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: &str) -> Config {
        Config {
            store_url: url.to_string(),
            anon_key: "anon-key".into(),
            encryption_key: "unused".into(),
        }
    }

    fn session_body(user_id: &str, email: &str) -> serde_json::Value {
        json!({
            "access_token": "user-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": {
                "id": user_id,
                "email": email,
                "identities": [{"id": user_id}],
                "created_at": "2024-05-01T10:00:00Z"
            }
        })
    }

    #[test]
    fn url_construction() {
        let client = StoreClient::new(&test_config("https://proj.example.co")).unwrap();
        assert_eq!(
            client.table_url("todos"),
            "https://proj.example.co/rest/v1/todos"
        );
        assert_eq!(
            client.rpc_url("get_all_users"),
            "https://proj.example.co/rest/v1/rpc/get_all_users"
        );
        assert_eq!(
            client.auth_url("token"),
            "https://proj.example.co/auth/v1/token"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = StoreClient::new(&test_config("https://proj.example.co/")).unwrap();
        assert_eq!(
            client.table_url("todos"),
            "https://proj.example.co/rest/v1/todos"
        );
    }

    #[test]
    fn anon_headers_before_sign_in() {
        let client = StoreClient::new(&test_config("https://proj.example.co")).unwrap();
        let headers = client.auth_headers();
        assert_eq!(headers[0], ("apikey", "anon-key".to_string()));
        assert_eq!(headers[1], ("Authorization", "Bearer anon-key".to_string()));
    }

    #[test]
    fn filter_and_order_encoding() {
        assert_eq!(
            Filter::Eq("user_id", "u1".into()).to_query_pair(),
            ("user_id".to_string(), "eq.u1".to_string())
        );
        assert_eq!(
            Filter::In("id", vec!["a".into(), "b".into()]).to_query_pair(),
            ("id".to_string(), "in.(a,b)".to_string())
        );
        assert_eq!(Order::Desc("created_at").to_query_value(), "created_at.desc");
        assert_eq!(Order::Asc("login_time").to_query_value(), "login_time.asc");
    }

    #[tokio::test]
    async fn select_sends_filters_and_ordering() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/todos"))
            .and(query_param("select", "*"))
            .and(query_param("user_id", "eq.u1"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "t1", "user_id": "u1", "title": "belanja", "completed": false}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let todos: Vec<Todo> = client
            .select(
                "todos",
                &[Filter::Eq("user_id", "u1".into())],
                Some(Order::Desc("created_at")),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, "t1");
    }

    #[tokio::test]
    async fn insert_returns_stored_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/todos"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"id": "t9", "user_id": "u1", "title": "belanja", "completed": false}
            ])))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let todo: Todo = client
            .insert(
                "todos",
                &json!({"user_id": "u1", "title": "belanja", "completed": false}),
            )
            .await
            .unwrap();
        assert_eq!(todo.id, "t9");
    }

    #[tokio::test]
    async fn remote_failure_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/todos"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_string(r#"{"message":"permission denied for table todos"}"#),
            )
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .select::<Todo>("todos", &[], None, None, None)
            .await
            .unwrap_err();
        match err {
            Error::Store(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("permission denied"));
            }
            other => panic!("expected Store error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_in_stores_session_and_switches_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({"email": "a@x.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u1", "a@x.com")))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let mut events = client.subscribe_auth_events();

        let session = client
            .sign_in_with_password("a@x.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.id, "u1");
        assert!(client.current_session().is_some());

        let headers = client.auth_headers();
        assert_eq!(headers[1].1, "Bearer user-token");

        match events.try_recv().unwrap() {
            AuthEvent::SignedIn(s) => assert_eq!(s.user.id, "u1"),
            other => panic!("expected SignedIn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_up_pending_verification() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u2",
                "email": "b@x.com",
                "identities": [{"id": "u2"}],
                "created_at": "2024-05-01T10:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let outcome = client.sign_up("b@x.com", "secret1").await.unwrap();
        match outcome {
            SignUpOutcome::VerificationPending(user) => {
                assert_eq!(user.email.as_deref(), Some("b@x.com"));
            }
            other => panic!("expected VerificationPending, got {other:?}"),
        }
        // No session until the OTP is verified
        assert!(client.current_session().is_none());
    }

    #[tokio::test]
    async fn sign_up_detects_already_registered_email() {
        let server = MockServer::start().await;
        // Duplicate emails come back masked as a user with no identities
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1",
                "email": "a@x.com",
                "identities": []
            })))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let err = client.sign_up("a@x.com", "secret1").await.unwrap_err();
        match err {
            Error::Validation(msg) => assert!(msg.contains("already registered")),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resend_does_not_touch_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/resend"))
            .and(body_json(json!({"type": "signup", "email": "b@x.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        client.resend_signup_otp("b@x.com").await.unwrap();
        assert!(client.current_session().is_none());
    }

    #[tokio::test]
    async fn sign_out_clears_session_before_revocation_resolves() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u1", "a@x.com")))
            .mount(&server)
            .await;
        // Revocation fails remotely; sign_out still succeeds locally
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        client
            .sign_in_with_password("a@x.com", "secret1")
            .await
            .unwrap();
        let mut events = client.subscribe_auth_events();

        client.sign_out().await.unwrap();
        assert!(client.current_session().is_none());
        assert!(matches!(events.try_recv().unwrap(), AuthEvent::SignedOut));

        // Second sign-out is a no-op
        client.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn refresh_emits_token_refreshed_not_signed_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u1", "a@x.com")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({"refresh_token": "refresh-token"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u1", "a@x.com")))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        client
            .sign_in_with_password("a@x.com", "secret1")
            .await
            .unwrap();

        let mut events = client.subscribe_auth_events();
        let refreshed = client.refresh_session().await.unwrap();
        assert_eq!(refreshed.user.id, "u1");
        assert!(matches!(
            events.try_recv().unwrap(),
            AuthEvent::TokenRefreshed(_)
        ));
    }

    #[tokio::test]
    async fn admin_list_users_unwraps_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [
                    {"id": "u1", "email": "a@x.com", "user_metadata": {"role": "admin"}},
                    {"id": "u2", "email": "b@x.com", "user_metadata": {}}
                ],
                "aud": "authenticated"
            })))
            .mount(&server)
            .await;

        let client = StoreClient::new(&test_config(&server.uri())).unwrap();
        let users = client.admin_list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email.as_deref(), Some("a@x.com"));
    }
}
