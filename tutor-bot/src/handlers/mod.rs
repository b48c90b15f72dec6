//! Handlers of the tutor chain: session bookkeeping, slash commands, free-form chat.

mod chat_handler;
mod command_handler;
mod session_handler;

pub use chat_handler::{ChatHandler, ChatSettings};
pub use command_handler::{
    format_mistakes, parse_command, Command, CommandHandler, HELP_TEXT, LEVEL_USAGE,
    MAX_MESSAGE_CHARS, SAY_USAGE,
};
pub use session_handler::SessionHandler;

use storage::StorageError;
use tracing::error;
use tutor_core::TutorError;

/// Logs a failed session store call and converts it into [`TutorError::Database`].
fn database_error(user_id: i64, action: &'static str) -> impl FnOnce(StorageError) -> TutorError {
    move |e| {
        error!(error = %e, user_id = user_id, action = action, "Session store call failed");
        TutorError::Database(e.to_string())
    }
}
