//! # English tutor bot
//!
//! Wires tutor-core, handler-chain, storage, prompt and llm-client into a Telegram bot.
//! Loads config from env, opens the session store and runs the teloxide REPL.

pub mod components;
pub mod config;
pub mod handlers;
pub mod phrasebook;
pub mod runner;
pub mod telegram;

pub use components::{
    build_bot_components, build_handler_chain, create_session_store, BotComponents, TutorServices,
};
pub use config::{BotConfig, SessionStoreKind};
pub use handlers::{ChatHandler, ChatSettings, CommandHandler, SessionHandler};
pub use phrasebook::{Phrasebook, Topic};
pub use runner::{process_message, run_bot, APOLOGY_MESSAGE};
pub use telegram::{run_repl, TelegramBotAdapter, TelegramMessageWrapper, TelegramUserWrapper};
