//! Storage crate: per-user session state and the conversation log.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – Level, TurnRole, UserRecord, ConversationTurn
//! - [`session_store`] – SessionStore trait and shared constants
//! - [`sqlite_session_store`] – SqliteSessionStore (sqlx / SQLite)
//! - [`inmemory_session_store`] – InMemorySessionStore (tests, `SESSION_STORE=memory`)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod inmemory_session_store;
mod models;
mod session_store;
mod sqlite_pool;
mod sqlite_session_store;

pub use error::StorageError;
pub use inmemory_session_store::InMemorySessionStore;
pub use models::{ConversationTurn, Level, TurnRole, UserRecord};
pub use session_store::{
    mistake_entries, SessionStore, DEFAULT_HISTORY_LIMIT, NO_MISTAKES_MESSAGE,
};
pub use sqlite_pool::{SqlitePoolManager, DEFAULT_MAX_CONNECTIONS};
pub use sqlite_session_store::SqliteSessionStore;
