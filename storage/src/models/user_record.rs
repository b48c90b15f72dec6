//! User record model.
//!
//! Maps to the `users` table and is returned by `SessionStore::get_or_create_user`.

use super::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Platform identifier (Telegram user id).
    pub id: i64,
    pub display_name: Option<String>,
    pub level: Level,
    pub lessons_completed: i64,
    /// Newline-separated mistake entries, oldest first. Empty when none were logged.
    pub mistakes: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a first-contact record: default level, no lessons, empty mistake log.
    pub fn new(id: i64, display_name: Option<String>) -> Self {
        Self {
            id,
            display_name,
            level: Level::default(),
            lessons_completed: 0,
            mistakes: String::new(),
            created_at: Utc::now(),
        }
    }
}
