//! Error types for the bot core.
//!
//! [`TutorError`] is the error of one handled request.

use thiserror::Error;

/// Error of one request: session store, bot transport, completion, or speech.
#[derive(Error, Debug)]
pub enum TutorError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Speech error: {0}")]
    Speech(String),
}

/// Result type for core operations; uses [`TutorError`].
pub type Result<T> = std::result::Result<T, TutorError>;
