//! Bot entry point and per-message processing.

use anyhow::Result;
use handler_chain::HandlerChain;
use tracing::{error, info, instrument};
use tutor_core::{init_tracing, Bot, Message};

use crate::components::{build_bot_components, build_handler_chain, create_session_store};
use crate::config::BotConfig;
use crate::handlers::ChatSettings;
use crate::telegram::run_repl;

/// Sent to the user when their message could not be processed.
pub const APOLOGY_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

/// Runs the handler chain for one message. A failure is logged and answered with
/// [`APOLOGY_MESSAGE`]; it never escapes to the caller.
pub async fn process_message(chain: &HandlerChain, bot: &dyn Bot, message: &Message) {
    if let Err(e) = chain.handle(message).await {
        error!(error = %e, user_id = message.user.id, "Handler chain failed");
        if let Err(send_err) = bot.send_message(&message.chat, APOLOGY_MESSAGE).await {
            error!(
                error = %send_err,
                user_id = message.user.id,
                "Failed to send apology"
            );
        }
    }
}

/// Main entry: init logging, open the store, build components and chain, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    init_tracing(&config.log_file)?;

    info!(
        session_store = ?config.session_store,
        history_limit = config.history_limit,
        turn_retention = config.turn_retention,
        "Initializing bot"
    );

    let store = create_session_store(&config).await?;
    let components = build_bot_components(&config, store)?;
    let handler_chain = build_handler_chain(&components.services, ChatSettings::from(&config));

    info!("Bot started successfully");

    run_repl(
        components.teloxide_bot,
        handler_chain,
        components.services.bot.clone(),
    )
    .await
}
