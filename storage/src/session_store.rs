//! # Session store
//!
//! The [`SessionStore`] trait holds durable per-user state (level, lesson counter, mistake log) and
//! the append-only conversation log. Callers depend on `Arc<dyn SessionStore>` so the same handler
//! code runs against [`crate::SqliteSessionStore`] in production and
//! [`crate::InMemorySessionStore`] in tests.
//!
//! ## Semantics
//!
//! - Every call is an independent round trip; no caching, no retry. Errors abort only the caller's
//!   current request.
//! - Writes for an unknown user create the user with defaults (insert-or-ignore), so concurrent first
//!   contact never produces duplicates.
//! - `recent_turns` returns the newest `limit` turns oldest first.
//! - `increment_lessons` and `append_mistake` are single atomic updates.

use crate::error::StorageError;
use crate::models::{ConversationTurn, Level, TurnRole, UserRecord};
use async_trait::async_trait;

/// Number of recent turns fed back into the completion context.
pub const DEFAULT_HISTORY_LIMIT: usize = 15;

/// Returned by `get_mistakes` when the log is empty.
pub const NO_MISTAKES_MESSAGE: &str = "No mistakes yet.";

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the user, inserting a default-level record on first contact.
    async fn get_or_create_user(
        &self,
        id: i64,
        display_name: Option<&str>,
    ) -> Result<UserRecord, StorageError>;

    /// Stored level, or [`Level::default`] for unknown users.
    async fn get_level(&self, id: i64) -> Result<Level, StorageError>;

    /// Sets the user's level (creating the user if needed).
    async fn set_level(&self, id: i64, level: Level) -> Result<(), StorageError>;

    /// Appends one turn to the user's conversation log. No cap is applied at write time.
    async fn append_turn(&self, id: i64, role: TurnRole, text: &str) -> Result<(), StorageError>;

    /// At most `limit` most recent turns, oldest first.
    async fn recent_turns(
        &self,
        id: i64,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StorageError>;

    /// Adds one completed lesson; returns the new total.
    async fn increment_lessons(&self, id: i64) -> Result<i64, StorageError>;

    /// Appends one entry to the mistake log. Line breaks inside `text` are flattened; blank text is ignored.
    async fn append_mistake(&self, id: i64, text: &str) -> Result<(), StorageError>;

    /// Lessons completed (0 for unknown users).
    async fn get_progress(&self, id: i64) -> Result<i64, StorageError>;

    /// Full mistake log, or [`NO_MISTAKES_MESSAGE`] when empty.
    async fn get_mistakes(&self, id: i64) -> Result<String, StorageError>;

    /// Deletes all but the newest `keep` turns of the user; returns how many were removed.
    async fn prune_turns(&self, id: i64, keep: usize) -> Result<u64, StorageError>;
}

/// Flattens a mistake entry to a single trimmed line. `None` when nothing is left.
pub(crate) fn normalize_mistake(text: &str) -> Option<String> {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Splits a stored mistake log (or `get_mistakes` output) into its entries, oldest first.
pub fn mistake_entries(log: &str) -> Vec<String> {
    if log == NO_MISTAKES_MESSAGE {
        return Vec::new();
    }
    log.lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect()
}
