//! REPL runner: converts teloxide messages to core messages and processes each in its own task.

use anyhow::Result;
use handler_chain::HandlerChain;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{info, instrument};
use tutor_core::{Bot as CoreBot, ToCoreMessage};

use super::adapters::TelegramMessageWrapper;
use crate::runner::process_message;

/// Starts the long-polling REPL. Each text message from a user is spawned onto its own task;
/// failures are reported back through `reply_bot`.
#[instrument(skip(bot, handler_chain, reply_bot))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    reply_bot: Arc<dyn CoreBot>,
) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "Connected to Telegram");
        }
    }

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = handler_chain.clone();
        let reply_bot = reply_bot.clone();

        async move {
            if msg.from.is_none() || msg.text().is_none() {
                info!(chat_id = msg.chat.id.0, "Ignoring non-text message");
                return respond(());
            }

            let core_msg = TelegramMessageWrapper(&msg).to_core();
            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_content = %core_msg.content,
                "Received message"
            );

            tokio::spawn(async move {
                info!(
                    user_id = core_msg.user.id,
                    message_id = %core_msg.id,
                    "step: processing message (handler chain started)"
                );
                process_message(&chain, reply_bot.as_ref(), &core_msg).await;
            });

            respond(())
        }
    })
    .await;

    Ok(())
}
