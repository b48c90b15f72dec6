//! Handler that registers the sender in the session store in before().

use async_trait::async_trait;
use std::sync::Arc;
use storage::SessionStore;
use tracing::{info, instrument};
use tutor_core::{Handler, HandlerResponse, Message, Result};

use super::database_error;

/// Calls `get_or_create_user` for every inbound message; always continues unless the store fails.
#[derive(Clone)]
pub struct SessionHandler {
    store: Arc<dyn SessionStore>,
}

impl SessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for SessionHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        let user_id = message.user.id;
        let display_name = message.user.display_name();
        let user = self
            .store
            .get_or_create_user(user_id, display_name.as_deref())
            .await
            .map_err(database_error(user_id, "get_or_create_user"))?;

        info!(
            user_id = user_id,
            level = %user.level,
            "step: SessionHandler before, user loaded"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            replied = matches!(response, HandlerResponse::Reply(_)),
            "step: SessionHandler after"
        );
        Ok(())
    }
}
