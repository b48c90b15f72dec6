//! Bot configuration, loaded from environment variables (after `.env` via dotenvy in `main`).

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "./data/english_tutor.db";
pub const DEFAULT_LOG_FILE: &str = "logs/english-tutor.log";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Turns kept per user after each chat turn; 0 disables pruning.
pub const DEFAULT_TURN_RETENTION: usize = 200;

/// Which [`storage::SessionStore`] backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStoreKind {
    #[default]
    Sqlite,
    Memory,
}

impl FromStr for SessionStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(SessionStoreKind::Sqlite),
            "memory" => Ok(SessionStoreKind::Memory),
            other => anyhow::bail!("unknown SESSION_STORE '{}' (expected sqlite or memory)", other),
        }
    }
}

/// English tutor bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub openai_api_key: String,
    pub database_url: String,
    pub session_store: SessionStoreKind,
    pub db_max_connections: u32,
    pub openai_base_url: String,
    pub ai_model: String,
    pub ai_max_tokens: u32,
    /// Recent turns fed back into the completion context.
    pub history_limit: usize,
    pub turn_retention: usize,
    pub tts_model: String,
    pub tts_voice: String,
    pub log_file: String,
    /// Optional Telegram Bot API base URL (`TELEGRAM_API_URL` or `TELOXIDE_API_URL`), e.g. a mock server.
    pub telegram_api_url: Option<String>,
}

impl BotConfig {
    /// Reads the configuration from the environment. `BOT_TOKEN` and `OPENAI_API_KEY` are required.
    pub fn load() -> Result<Self> {
        let bot_token = required("BOT_TOKEN")?;
        let openai_api_key = required("OPENAI_API_KEY")?;
        let database_url = optional("DATABASE_URL", DEFAULT_DATABASE_URL);
        let session_store = parse_or("SESSION_STORE", SessionStoreKind::default())?;
        let db_max_connections =
            parse_or("DB_MAX_CONNECTIONS", storage::DEFAULT_MAX_CONNECTIONS)?;
        let openai_base_url = optional("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        let ai_model = optional("AI_MODEL", llm_client::DEFAULT_MODEL);
        let ai_max_tokens = parse_or("AI_MAX_TOKENS", llm_client::DEFAULT_MAX_TOKENS)?;
        let history_limit = parse_or("HISTORY_LIMIT", storage::DEFAULT_HISTORY_LIMIT)?;
        let turn_retention = parse_or("TURN_RETENTION", DEFAULT_TURN_RETENTION)?;
        let tts_model = optional("TTS_MODEL", llm_client::DEFAULT_TTS_MODEL);
        let tts_voice = optional("TTS_VOICE", llm_client::DEFAULT_TTS_VOICE);
        let log_file = optional("LOG_FILE", DEFAULT_LOG_FILE);
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            bot_token,
            openai_api_key,
            database_url,
            session_store,
            db_max_connections,
            openai_base_url,
            ai_model,
            ai_max_tokens,
            history_limit,
            turn_retention,
            tts_model,
            tts_voice,
            log_file,
            telegram_api_url,
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} not set", name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}='{}': {}", name, raw, e)),
        _ => Ok(default),
    }
}
