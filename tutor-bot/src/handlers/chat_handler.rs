//! Free-form practice handler: builds the tutor context from recent turns, asks the completion
//! service, replies, and records the exchange plus any corrections as mistakes.

use async_trait::async_trait;
use llm_client::LlmClient;
use prompt::{build_tutor_messages, extract_corrections, ChatMessage};
use std::sync::Arc;
use storage::{ConversationTurn, SessionStore, TurnRole, DEFAULT_HISTORY_LIMIT};
use tracing::{error, info, instrument};
use tutor_core::{Bot, Handler, HandlerResponse, Message, Result, TutorError};

use super::database_error;
use crate::config::{BotConfig, DEFAULT_TURN_RETENTION};

/// Context window and retention for chat turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSettings {
    pub history_limit: usize,
    /// Turns kept per user after each exchange; 0 keeps everything.
    pub turn_retention: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            turn_retention: DEFAULT_TURN_RETENTION,
        }
    }
}

impl From<&BotConfig> for ChatSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            turn_retention: config.turn_retention,
        }
    }
}

fn turn_to_chat_message(turn: ConversationTurn) -> ChatMessage {
    match turn.role {
        TurnRole::User => ChatMessage::user(turn.text),
        TurnRole::Assistant => ChatMessage::assistant(turn.text),
    }
}

/// Last handler in the chain; answers every non-command text message.
pub struct ChatHandler {
    store: Arc<dyn SessionStore>,
    llm_client: Arc<dyn LlmClient>,
    bot: Arc<dyn Bot>,
    settings: ChatSettings,
}

impl ChatHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        llm_client: Arc<dyn LlmClient>,
        bot: Arc<dyn Bot>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            llm_client,
            bot,
            settings,
        }
    }
}

#[async_trait]
impl Handler for ChatHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();
        if text.is_empty() || message.is_command() {
            return Ok(HandlerResponse::Ignore);
        }
        let user_id = message.user.id;

        let level = self
            .store
            .get_level(user_id)
            .await
            .map_err(database_error(user_id, "get_level"))?;
        // History is read before the new turn is stored so it never contains the current message.
        let history = self
            .store
            .recent_turns(user_id, self.settings.history_limit)
            .await
            .map_err(database_error(user_id, "recent_turns"))?;
        info!(
            user_id = user_id,
            level = %level,
            history_len = history.len(),
            "step: ChatHandler context loaded"
        );

        let messages = build_tutor_messages(
            level.as_str(),
            history.into_iter().map(turn_to_chat_message),
            text,
        );

        self.store
            .append_turn(user_id, TurnRole::User, text)
            .await
            .map_err(database_error(user_id, "append_turn"))?;

        info!(
            user_id = user_id,
            message_count = messages.len(),
            "step: ChatHandler calling completion service"
        );
        let reply = self
            .llm_client
            .get_llm_response_with_messages(messages)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user_id, "Completion call failed");
                TutorError::Llm(e.to_string())
            })?;

        self.bot.reply_to(message, &reply).await?;

        self.store
            .append_turn(user_id, TurnRole::Assistant, &reply)
            .await
            .map_err(database_error(user_id, "append_turn"))?;

        let corrections = extract_corrections(&reply);
        for correction in &corrections {
            self.store
                .append_mistake(user_id, &format!("{} -> {}", text, correction))
                .await
                .map_err(database_error(user_id, "append_mistake"))?;
        }

        if self.settings.turn_retention > 0 {
            let pruned = self
                .store
                .prune_turns(user_id, self.settings.turn_retention)
                .await
                .map_err(database_error(user_id, "prune_turns"))?;
            if pruned > 0 {
                info!(user_id = user_id, pruned = pruned, "step: old turns pruned");
            }
        }

        info!(
            user_id = user_id,
            corrections = corrections.len(),
            reply_len = reply.len(),
            "step: ChatHandler reply sent"
        );
        Ok(HandlerResponse::Reply(reply))
    }
}
