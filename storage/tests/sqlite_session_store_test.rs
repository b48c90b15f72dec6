//! [`storage::SqliteSessionStore`] against the shared session store checks, plus persistence.
//!
//! Each test opens its own database file in a temporary directory.

mod common;

use std::sync::Arc;
use storage::{Level, SessionStore, SqliteSessionStore, TurnRole};
use tempfile::TempDir;

async fn open_store() -> (SqliteSessionStore, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tutor.db");
    let store = SqliteSessionStore::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("Failed to open session store");
    (store, dir)
}

#[tokio::test]
async fn test_first_contact_creates_default_user() {
    let (store, _dir) = open_store().await;
    common::first_contact_creates_default_user(&store).await;
}

#[tokio::test]
async fn test_unknown_user_reads_defaults() {
    let (store, _dir) = open_store().await;
    common::unknown_user_reads_defaults(&store).await;
}

#[tokio::test]
async fn test_set_level_round_trips() {
    let (store, _dir) = open_store().await;
    common::set_level_round_trips(&store).await;
}

#[tokio::test]
async fn test_recent_turns_are_the_newest_in_order() {
    let (store, _dir) = open_store().await;
    common::recent_turns_are_the_newest_in_order(&store).await;
}

#[tokio::test]
async fn test_short_history_is_returned_whole() {
    let (store, _dir) = open_store().await;
    common::short_history_is_returned_whole(&store).await;
}

#[tokio::test]
async fn test_increment_lessons_counts_exactly() {
    let (store, _dir) = open_store().await;
    common::increment_lessons_counts_exactly(&store).await;
}

#[tokio::test]
async fn test_append_mistake_keeps_every_entry() {
    let (store, _dir) = open_store().await;
    common::append_mistake_keeps_every_entry(&store).await;
}

#[tokio::test]
async fn test_prune_keeps_newest() {
    let (store, _dir) = open_store().await;
    common::prune_keeps_newest(&store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_contact() {
    let (store, _dir) = open_store().await;
    common::concurrent_first_contact(Arc::new(store)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments() {
    let (store, _dir) = open_store().await;
    common::concurrent_increments(Arc::new(store), 10).await;
}

/// **Test: State survives reopening the database file.**
///
/// **Setup:** Create a user, change level, log a lesson, a mistake and two turns; drop the store.
/// **Action:** Reopen the same file.
/// **Expected:** Level, progress, mistakes and turns are all still there.
#[tokio::test]
async fn test_state_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("tutor.db");
    let url = format!("sqlite://{}", path.display());

    {
        let store = SqliteSessionStore::new(&url).await.expect("open");
        store.get_or_create_user(5, Some("Ada")).await.unwrap();
        store.set_level(5, Level::B1).await.unwrap();
        store.increment_lessons(5).await.unwrap();
        store.append_mistake(5, "I has -> I have").await.unwrap();
        store.append_turn(5, TurnRole::User, "Hello").await.unwrap();
        store.append_turn(5, TurnRole::Assistant, "Hi Ada!").await.unwrap();
    }

    let store = SqliteSessionStore::new(&url).await.expect("reopen");
    assert_eq!(store.get_level(5).await.unwrap(), Level::B1);
    assert_eq!(store.get_progress(5).await.unwrap(), 1);
    assert_eq!(store.get_mistakes(5).await.unwrap(), "I has -> I have");
    let turns = store.recent_turns(5, 15).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].role, TurnRole::Assistant);
}

/// **Test: The in-memory URL opens a working single-connection database.**
#[tokio::test]
async fn test_memory_url() {
    let store = SqliteSessionStore::new("sqlite::memory:").await.expect("open");
    store.append_turn(1, TurnRole::User, "hi").await.unwrap();
    assert_eq!(store.increment_lessons(1).await.unwrap(), 1);
    assert_eq!(store.recent_turns(1, 15).await.unwrap().len(), 1);
}
