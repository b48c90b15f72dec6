//! Behaviour checks shared by every [`SessionStore`] implementation.
//!
//! Each backend's test file calls these against a fresh store.

#![allow(dead_code)]

use std::sync::Arc;

use storage::{mistake_entries, Level, SessionStore, TurnRole, NO_MISTAKES_MESSAGE};

pub async fn first_contact_creates_default_user(store: &dyn SessionStore) {
    let user = store
        .get_or_create_user(12345, Some("Ada"))
        .await
        .expect("get_or_create_user");

    assert_eq!(user.id, 12345);
    assert_eq!(user.display_name.as_deref(), Some("Ada"));
    assert_eq!(user.level, Level::A2);
    assert_eq!(user.lessons_completed, 0);
    assert!(user.mistakes.is_empty());

    let again = store.get_or_create_user(12345, Some("Other")).await.unwrap();
    assert_eq!(again.display_name.as_deref(), Some("Ada"));
    assert_eq!(again.created_at, user.created_at);
}

pub async fn unknown_user_reads_defaults(store: &dyn SessionStore) {
    assert_eq!(store.get_level(777).await.unwrap(), Level::A2);
    assert_eq!(store.get_progress(777).await.unwrap(), 0);
    assert_eq!(store.get_mistakes(777).await.unwrap(), NO_MISTAKES_MESSAGE);
    assert!(store.recent_turns(777, 15).await.unwrap().is_empty());
}

pub async fn set_level_round_trips(store: &dyn SessionStore) {
    store.get_or_create_user(1, None).await.unwrap();
    for level in Level::ALL {
        store.set_level(1, level).await.unwrap();
        assert_eq!(store.get_level(1).await.unwrap(), level);
    }

    // An unparsable value never reaches the store.
    assert!("Z9".parse::<Level>().is_err());
    assert_eq!(store.get_level(1).await.unwrap(), Level::B1);

    store.set_level(2, Level::A1).await.unwrap();
    let user = store.get_or_create_user(2, Some("Late")).await.unwrap();
    assert_eq!(user.level, Level::A1);
}

pub async fn recent_turns_are_the_newest_in_order(store: &dyn SessionStore) {
    store.get_or_create_user(10, None).await.unwrap();
    for i in 0..20 {
        let role = if i % 2 == 0 {
            TurnRole::User
        } else {
            TurnRole::Assistant
        };
        store.append_turn(10, role, &format!("turn {}", i)).await.unwrap();
    }
    // Another user's turns must not leak in.
    store.append_turn(11, TurnRole::User, "other").await.unwrap();

    let turns = store.recent_turns(10, 15).await.unwrap();
    assert_eq!(turns.len(), 15);
    let texts: Vec<_> = turns.iter().map(|t| t.text.clone()).collect();
    let expected: Vec<_> = (5..20).map(|i| format!("turn {}", i)).collect();
    assert_eq!(texts, expected);
    assert!(turns.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    assert!(turns.windows(2).all(|w| w[0].id < w[1].id));
    assert!(turns.iter().all(|t| t.user_id == 10));
    assert_eq!(turns[0].role, TurnRole::Assistant);
    assert_eq!(turns[14].role, TurnRole::Assistant);

    let few = store.recent_turns(10, 3).await.unwrap();
    assert_eq!(
        few.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
        vec!["turn 17", "turn 18", "turn 19"]
    );
    assert!(store.recent_turns(10, 0).await.unwrap().is_empty());
}

pub async fn short_history_is_returned_whole(store: &dyn SessionStore) {
    store.append_turn(20, TurnRole::User, "hello").await.unwrap();
    store.append_turn(20, TurnRole::Assistant, "hi!").await.unwrap();

    let turns = store.recent_turns(20, 15).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].text, "hello");
    assert_eq!(turns[1].text, "hi!");
}

pub async fn increment_lessons_counts_exactly(store: &dyn SessionStore) {
    store.get_or_create_user(30, None).await.unwrap();
    for expected in 1..=5 {
        assert_eq!(store.increment_lessons(30).await.unwrap(), expected);
    }
    assert_eq!(store.get_progress(30).await.unwrap(), 5);
    assert_eq!(store.get_progress(31).await.unwrap(), 0);
}

pub async fn append_mistake_keeps_every_entry(store: &dyn SessionStore) {
    store.get_or_create_user(40, None).await.unwrap();
    let texts = [
        "I goed home -> I went home",
        "She don't like -> She doesn't like",
        "multi\nline   entry",
    ];
    for t in texts {
        store.append_mistake(40, t).await.unwrap();
    }
    store.append_mistake(40, "   ").await.unwrap();

    let log = store.get_mistakes(40).await.unwrap();
    assert_eq!(
        mistake_entries(&log),
        vec![
            "I goed home -> I went home",
            "She don't like -> She doesn't like",
            "multi line entry",
        ]
    );
    let user = store.get_or_create_user(40, None).await.unwrap();
    assert_eq!(user.mistakes, log);
}

pub async fn prune_keeps_newest(store: &dyn SessionStore) {
    for i in 0..10 {
        store
            .append_turn(50, TurnRole::User, &format!("m{}", i))
            .await
            .unwrap();
    }
    assert_eq!(store.prune_turns(50, 4).await.unwrap(), 6);
    assert_eq!(store.prune_turns(50, 4).await.unwrap(), 0);

    let left = store.recent_turns(50, 100).await.unwrap();
    assert_eq!(
        left.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
        vec!["m6", "m7", "m8", "m9"]
    );
    assert_eq!(store.prune_turns(999, 4).await.unwrap(), 0);
}

/// Concurrent first contact for one id must yield a single consistent record.
pub async fn concurrent_first_contact(store: Arc<dyn SessionStore>) {
    let mut tasks = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let name = format!("name{}", i);
            store.get_or_create_user(4242, Some(name.as_str())).await
        }));
    }
    let mut records = Vec::new();
    for t in tasks {
        records.push(t.await.expect("join").expect("get_or_create_user"));
    }
    let first = &records[0];
    assert!(records.iter().all(|r| r.id == 4242 && r.created_at == first.created_at));
    let settled = store.get_or_create_user(4242, None).await.unwrap();
    assert!(settled.display_name.is_some());
    assert_eq!(settled.level, Level::A2);
}

/// Interleaved lesson increments across users never lose an update.
pub async fn concurrent_increments(store: Arc<dyn SessionStore>, per_user: usize) {
    let users = [61_i64, 62, 63];
    for u in users {
        store.get_or_create_user(u, None).await.unwrap();
    }
    let before = store.get_progress(61).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..per_user {
        for u in users {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.increment_lessons(u).await?;
                store.append_turn(u, TurnRole::User, "noise").await
            }));
        }
    }
    for t in tasks {
        t.await.expect("join").expect("increment");
    }

    assert_eq!(store.get_progress(61).await.unwrap(), before + per_user as i64);
    assert_eq!(store.get_progress(62).await.unwrap(), per_user as i64);
    assert_eq!(store.get_progress(63).await.unwrap(), per_user as i64);
}
