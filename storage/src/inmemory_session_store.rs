//! # In-memory session store
//!
//! [`SessionStore`] over process memory. Used by tests and when `SESSION_STORE=memory`; data is
//! lost on restart.
//!
//! ## Thread safety
//!
//! All state sits behind one `Arc<RwLock<..>>`, so every operation (including the read-modify-write
//! counter and log updates) is atomic with respect to other callers.

use crate::error::StorageError;
use crate::models::{ConversationTurn, Level, TurnRole, UserRecord};
use crate::session_store::{normalize_mistake, SessionStore, NO_MISTAKES_MESSAGE};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    users: HashMap<i64, UserRecord>,
    turns: HashMap<i64, Vec<ConversationTurn>>,
    next_turn_id: i64,
}

impl State {
    fn user_mut(&mut self, id: i64) -> &mut UserRecord {
        self.users
            .entry(id)
            .or_insert_with(|| UserRecord::new(id, None))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    state: Arc<RwLock<State>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known users.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Number of stored turns for one user.
    pub async fn turn_count(&self, id: i64) -> usize {
        self.state
            .read()
            .await
            .turns
            .get(&id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create_user(
        &self,
        id: i64,
        display_name: Option<&str>,
    ) -> Result<UserRecord, StorageError> {
        let mut state = self.state.write().await;
        let user = state.user_mut(id);
        if user.display_name.is_none() {
            user.display_name = display_name.map(String::from);
        }
        Ok(user.clone())
    }

    async fn get_level(&self, id: i64) -> Result<Level, StorageError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|u| u.level).unwrap_or_default())
    }

    async fn set_level(&self, id: i64, level: Level) -> Result<(), StorageError> {
        self.state.write().await.user_mut(id).level = level;
        Ok(())
    }

    async fn append_turn(&self, id: i64, role: TurnRole, text: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state.user_mut(id);
        state.next_turn_id += 1;
        let turn = ConversationTurn {
            id: state.next_turn_id,
            user_id: id,
            role,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        state.turns.entry(id).or_default().push(turn);
        Ok(())
    }

    async fn recent_turns(
        &self,
        id: i64,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StorageError> {
        let state = self.state.read().await;
        let turns = state.turns.get(&id).map(Vec::as_slice).unwrap_or_default();
        let start = turns.len().saturating_sub(limit);
        Ok(turns[start..].to_vec())
    }

    async fn increment_lessons(&self, id: i64) -> Result<i64, StorageError> {
        let mut state = self.state.write().await;
        let user = state.user_mut(id);
        user.lessons_completed += 1;
        Ok(user.lessons_completed)
    }

    async fn append_mistake(&self, id: i64, text: &str) -> Result<(), StorageError> {
        let Some(entry) = normalize_mistake(text) else {
            return Ok(());
        };
        let mut state = self.state.write().await;
        let user = state.user_mut(id);
        if !user.mistakes.is_empty() {
            user.mistakes.push('\n');
        }
        user.mistakes.push_str(&entry);
        Ok(())
    }

    async fn get_progress(&self, id: i64) -> Result<i64, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&id)
            .map(|u| u.lessons_completed)
            .unwrap_or(0))
    }

    async fn get_mistakes(&self, id: i64) -> Result<String, StorageError> {
        let state = self.state.read().await;
        Ok(match state.users.get(&id) {
            Some(u) if !u.mistakes.is_empty() => u.mistakes.clone(),
            _ => NO_MISTAKES_MESSAGE.to_string(),
        })
    }

    async fn prune_turns(&self, id: i64, keep: usize) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let Some(turns) = state.turns.get_mut(&id) else {
            return Ok(0);
        };
        let excess = turns.len().saturating_sub(keep);
        turns.drain(..excess);
        Ok(excess as u64)
    }
}
