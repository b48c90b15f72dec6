//! SQLite session store: users and conversation turns persisted via sqlx.
//!
//! Uses SqlitePoolManager for a bounded pool. Each operation is one round trip (two for writes that
//! first make sure the user row exists). Counter and log updates are single atomic statements.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY,
//!     display_name TEXT,
//!     level TEXT,
//!     lessons_completed INTEGER NOT NULL DEFAULT 0,
//!     mistakes TEXT NOT NULL DEFAULT '',
//!     created_at TEXT NOT NULL
//! );
//! CREATE TABLE turns (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     user_id INTEGER NOT NULL REFERENCES users(id),
//!     role TEXT NOT NULL,
//!     message TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//! ```

use crate::error::StorageError;
use crate::models::{ConversationTurn, Level, TurnRole, UserRecord};
use crate::session_store::{normalize_mistake, SessionStore, NO_MISTAKES_MESSAGE};
use crate::sqlite_pool::{SqlitePoolManager, DEFAULT_MAX_CONNECTIONS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteSessionStore {
    /// Opens (or creates) the database and makes sure the schema exists.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        Self::with_max_connections(database_url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Like [`Self::new`] with an explicit pool size.
    pub async fn with_max_connections(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, StorageError> {
        let pool_manager =
            SqlitePoolManager::with_max_connections(database_url, max_connections).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating session tables if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                display_name TEXT,
                level TEXT,
                lessons_completed INTEGER NOT NULL DEFAULT 0,
                mistakes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                role TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_turns_user_id ON turns(user_id, id);
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        info!("Session tables ready");
        Ok(())
    }

    /// Inserts a default user row unless one exists.
    async fn ensure_user(&self, id: i64) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO users (id, level, created_at) VALUES (?, ?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(Level::default().as_str())
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    fn row_to_user(row: &SqliteRow) -> Result<UserRecord, StorageError> {
        let level: Option<String> = row.try_get("level")?;
        Ok(UserRecord {
            id: row.try_get("id")?,
            display_name: row.try_get("display_name")?,
            level: Level::from_stored(level.as_deref()),
            lessons_completed: row.try_get("lessons_completed")?,
            mistakes: row.try_get("mistakes")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_turn(row: &SqliteRow) -> Result<ConversationTurn, StorageError> {
        let role: String = row.try_get("role")?;
        Ok(ConversationTurn {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            role: role.parse()?,
            text: row.try_get("message")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    #[instrument(skip(self, display_name))]
    async fn get_or_create_user(
        &self,
        id: i64,
        display_name: Option<&str>,
    ) -> Result<UserRecord, StorageError> {
        let pool = self.pool_manager.pool();

        // Concurrent first contact: the loser of the insert race only fills a missing name.
        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, level, lessons_completed, mistakes, created_at)
            VALUES (?, ?, ?, 0, '', ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = COALESCE(users.display_name, excluded.display_name)
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(Level::default().as_str())
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, display_name, level, lessons_completed, mistakes, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Self::row_to_user(&row)
    }

    async fn get_level(&self, id: i64) -> Result<Level, StorageError> {
        let level: Option<(Option<String>,)> =
            sqlx::query_as("SELECT level FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool_manager.pool())
                .await?;

        Ok(Level::from_stored(level.and_then(|(l,)| l).as_deref()))
    }

    #[instrument(skip(self))]
    async fn set_level(&self, id: i64, level: Level) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, level, created_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET level = excluded.level
            "#,
        )
        .bind(id)
        .bind(level.as_str())
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        info!(user_id = id, level = %level, "Level updated");
        Ok(())
    }

    async fn append_turn(&self, id: i64, role: TurnRole, text: &str) -> Result<(), StorageError> {
        self.ensure_user(id).await?;

        sqlx::query("INSERT INTO turns (user_id, role, message, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(role.as_str())
            .bind(text)
            .bind(Utc::now())
            .execute(self.pool_manager.pool())
            .await?;

        debug!(user_id = id, role = %role, len = text.len(), "Turn appended");
        Ok(())
    }

    async fn recent_turns(
        &self,
        id: i64,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, role, message, created_at FROM turns
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool_manager.pool())
        .await?;

        // Newest-first from the index; callers need chronological order.
        let mut turns = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<Result<Vec<_>, _>>()?;
        turns.reverse();

        debug!(user_id = id, count = turns.len(), "Retrieved recent turns");
        Ok(turns)
    }

    #[instrument(skip(self))]
    async fn increment_lessons(&self, id: i64) -> Result<i64, StorageError> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (id, level, lessons_completed, mistakes, created_at)
            VALUES (?, ?, 1, '', ?)
            ON CONFLICT(id) DO UPDATE SET lessons_completed = users.lessons_completed + 1
            RETURNING lessons_completed
            "#,
        )
        .bind(id)
        .bind(Level::default().as_str())
        .bind(Utc::now())
        .fetch_one(self.pool_manager.pool())
        .await?;

        info!(user_id = id, lessons_completed = total, "Lesson completed");
        Ok(total)
    }

    #[instrument(skip(self, text))]
    async fn append_mistake(&self, id: i64, text: &str) -> Result<(), StorageError> {
        let Some(entry) = normalize_mistake(text) else {
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, level, lessons_completed, mistakes, created_at)
            VALUES (?, ?, 0, ?, ?)
            ON CONFLICT(id) DO UPDATE SET mistakes = CASE
                WHEN users.mistakes = '' THEN excluded.mistakes
                ELSE users.mistakes || char(10) || excluded.mistakes
            END
            "#,
        )
        .bind(id)
        .bind(Level::default().as_str())
        .bind(&entry)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        info!(user_id = id, "Mistake logged");
        Ok(())
    }

    async fn get_progress(&self, id: i64) -> Result<i64, StorageError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT lessons_completed FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;

        Ok(row.map(|(n,)| n).unwrap_or(0))
    }

    async fn get_mistakes(&self, id: i64) -> Result<String, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT mistakes FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;

        Ok(match row {
            Some((log,)) if !log.is_empty() => log,
            _ => NO_MISTAKES_MESSAGE.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn prune_turns(&self, id: i64, keep: usize) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM turns
            WHERE user_id = ?
              AND id NOT IN (
                  SELECT id FROM turns WHERE user_id = ? ORDER BY id DESC LIMIT ?
              )
            "#,
        )
        .bind(id)
        .bind(id)
        .bind(i64::try_from(keep).unwrap_or(i64::MAX))
        .execute(self.pool_manager.pool())
        .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            info!(user_id = id, removed, keep, "Pruned old turns");
        }
        Ok(removed)
    }
}
