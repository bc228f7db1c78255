//! CRUD façade over the `todos` table.
//!
//! The repository is the encryption boundary: descriptions are encrypted on
//! every write and decrypted (lossily — a corrupted field degrades to its
//! ciphertext) on every read. Callers re-list after each successful write
//! instead of mutating local state optimistically.

use std::sync::Arc;

use crate::crypto::CryptoCodec;
use crate::error::{Error, Result};
use crate::store::models::{NewTodo, Todo};
use crate::store::{Filter, Order, StoreClient};

/// Listing scope: one owner's rows or everything the caller may read.
#[derive(Debug, Clone)]
pub enum Scope {
    Owner(String),
    All,
}

/// Repository over the `todos` table.
pub struct TodoRepository {
    store: Arc<StoreClient>,
    crypto: CryptoCodec,
}

impl TodoRepository {
    pub fn new(store: Arc<StoreClient>, crypto: CryptoCodec) -> Self {
        Self { store, crypto }
    }

    /// List todos, newest created first, descriptions decrypted.
    pub async fn list(&self, scope: &Scope) -> Result<Vec<Todo>> {
        let filters = match scope {
            Scope::Owner(user_id) => vec![Filter::Eq("user_id", user_id.clone())],
            Scope::All => Vec::new(),
        };
        let mut todos: Vec<Todo> = self
            .store
            .select(
                "todos",
                &filters,
                Some(Order::Desc("created_at")),
                None,
                None,
            )
            .await?;
        for todo in &mut todos {
            self.decrypt_description(todo);
        }
        Ok(todos)
    }

    /// Create a todo. The title must be non-empty after trimming; violations
    /// are rejected locally, before any network round trip. `completed`
    /// always starts false.
    pub async fn create(&self, user_id: &str, title: &str, description: &str) -> Result<Todo> {
        let title = validate_title(title)?;
        let description = self.crypto.encrypt(description)?;
        let row = NewTodo {
            user_id: user_id.to_string(),
            title,
            description: (!description.is_empty()).then_some(description),
            completed: false,
        };
        let mut todo: Todo = self.store.insert("todos", &row).await?;
        self.decrypt_description(&mut todo);
        Ok(todo)
    }

    /// Set the completed flag. Semantically idempotent; still issues the
    /// write even when the value is unchanged.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<()> {
        self.store
            .update("todos", id, &serde_json::json!({ "completed": completed }))
            .await
    }

    /// Edit title and description. The description is re-encrypted with a
    /// fresh nonce on every update — ciphertext stability is not required.
    pub async fn update(&self, id: &str, title: &str, description: &str) -> Result<()> {
        let title = validate_title(title)?;
        let description = self.crypto.encrypt(description)?;
        self.store
            .update(
                "todos",
                id,
                &serde_json::json!({ "title": title, "description": description }),
            )
            .await
    }

    /// Delete a todo. Confirmation is the caller's concern (the UI prompts
    /// before invoking this).
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete("todos", id).await
    }

    fn decrypt_description(&self, todo: &mut Todo) {
        if let Some(description) = todo.description.take() {
            todo.description = Some(self.crypto.decrypt_lossy(&description));
        }
    }
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("title cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}
