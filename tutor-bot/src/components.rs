//! Component factory: builds the session store, clients and handler chain from config.

use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use llm_client::{LlmClient, OpenAILlmClient, OpenAISpeechSynthesizer, SpeechSynthesizer};
use std::sync::Arc;
use storage::{InMemorySessionStore, SessionStore, SqliteSessionStore};
use tracing::{error, info, instrument};

use crate::config::{BotConfig, SessionStoreKind};
use crate::handlers::{ChatHandler, ChatSettings, CommandHandler, SessionHandler};
use crate::phrasebook::Phrasebook;
use crate::telegram::TelegramBotAdapter;

/// Transport-independent services shared by the handlers.
#[derive(Clone)]
pub struct TutorServices {
    pub store: Arc<dyn SessionStore>,
    pub bot: Arc<dyn tutor_core::Bot>,
    pub llm_client: Arc<dyn LlmClient>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub phrasebook: Arc<Phrasebook>,
}

/// Everything `run_bot` needs: the teloxide bot for polling plus the handler services.
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    pub services: TutorServices,
}

/// Opens the configured session store.
#[instrument(skip(config))]
pub async fn create_session_store(config: &BotConfig) -> Result<Arc<dyn SessionStore>> {
    match config.session_store {
        SessionStoreKind::Sqlite => {
            info!(
                database_url = %config.database_url,
                max_connections = config.db_max_connections,
                "Using SQLite session store"
            );
            let store =
                SqliteSessionStore::with_max_connections(&config.database_url, config.db_max_connections)
                    .await
                    .map_err(|e| {
                        error!(error = %e, database_url = %config.database_url, "Failed to open session store");
                        e
                    })
                    .context("Failed to initialize session store")?;
            Ok(Arc::new(store))
        }
        SessionStoreKind::Memory => {
            info!("Using in-memory session store");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
    }
}

fn build_teloxide_bot(config: &BotConfig) -> teloxide::Bot {
    let bot = teloxide::Bot::new(config.bot_token.clone());
    match config.telegram_api_url {
        Some(ref url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// Builds the Telegram bot, OpenAI clients and phrasebook around an already opened store.
#[instrument(skip(config, store))]
pub fn build_bot_components(
    config: &BotConfig,
    store: Arc<dyn SessionStore>,
) -> Result<BotComponents> {
    let teloxide_bot = build_teloxide_bot(config);
    let bot: Arc<dyn tutor_core::Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    info!(
        api_key = %openai_client::mask_token(&config.openai_api_key),
        base_url = %config.openai_base_url,
        model = %config.ai_model,
        max_tokens = config.ai_max_tokens,
        "Configuring completion client"
    );
    let llm_client: Arc<dyn LlmClient> = Arc::new(
        OpenAILlmClient::with_base_url(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
        )
        .with_model(config.ai_model.clone())
        .with_max_tokens(config.ai_max_tokens),
    );
    let speech: Arc<dyn SpeechSynthesizer> = Arc::new(
        OpenAISpeechSynthesizer::with_base_url(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.tts_model.clone(),
            config.tts_voice.clone(),
        )
        .context("Invalid TTS_VOICE")?,
    );

    Ok(BotComponents {
        teloxide_bot,
        services: TutorServices {
            store,
            bot,
            llm_client,
            speech,
            phrasebook: Arc::new(Phrasebook::builtin()),
        },
    })
}

/// Builds the handler chain (session → commands → chat).
pub fn build_handler_chain(services: &TutorServices, settings: ChatSettings) -> HandlerChain {
    let session_handler = Arc::new(SessionHandler::new(services.store.clone()));
    let command_handler = Arc::new(CommandHandler::new(
        services.store.clone(),
        services.bot.clone(),
        services.llm_client.clone(),
        services.speech.clone(),
        services.phrasebook.clone(),
    ));
    let chat_handler = Arc::new(ChatHandler::new(
        services.store.clone(),
        services.llm_client.clone(),
        services.bot.clone(),
        settings,
    ));

    HandlerChain::new()
        .add_handler(session_handler)
        .add_handler(command_handler)
        .add_handler(chat_handler)
}
