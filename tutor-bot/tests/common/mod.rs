//! Shared test harness: the real handler chain over an in-memory store and mock services.

#![allow(dead_code)]

pub mod mock_bot;
pub mod mock_llm;

use chrono::Utc;
use handler_chain::HandlerChain;
use std::sync::Arc;
use storage::{InMemorySessionStore, SessionStore};
use tutor_bot::{build_handler_chain, ChatSettings, Phrasebook, TutorServices};
use tutor_core::{Chat, Message, MessageDirection, User};

use mock_bot::MockBot;
use mock_llm::{MockLlmClient, MockSpeech};

pub const USER_ID: i64 = 12345;

pub struct Harness {
    pub store: Arc<InMemorySessionStore>,
    pub bot: Arc<MockBot>,
    pub llm: Arc<MockLlmClient>,
    pub speech: Arc<MockSpeech>,
    pub chain: HandlerChain,
}

impl Harness {
    pub fn new(llm: Arc<MockLlmClient>) -> Self {
        Self::with_settings(llm, ChatSettings::default())
    }

    pub fn with_settings(llm: Arc<MockLlmClient>, settings: ChatSettings) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let bot = MockBot::new();
        let speech = MockSpeech::new();
        let services = TutorServices {
            store: store.clone(),
            bot: bot.clone(),
            llm_client: llm.clone(),
            speech: speech.clone(),
            phrasebook: Arc::new(Phrasebook::builtin()),
        };
        let chain = build_handler_chain(&services, settings);
        Self {
            store,
            bot,
            llm,
            speech,
            chain,
        }
    }

    pub fn session_store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }
}

/// Private-chat text message from `user_id` (chat id equals user id).
pub fn text_message(user_id: i64, text: &str) -> Message {
    Message {
        id: format!("msg_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
        user: User {
            id: user_id,
            username: Some("learner".to_string()),
            first_name: Some("Lea".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: user_id,
            chat_type: "private".to_string(),
        },
        content: text.to_string(),
        message_type: "text".to_string(),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
    }
}
