//! Session models: proficiency level, turn role, user record, conversation turn.

mod conversation_turn;
mod level;
mod user_record;

pub use conversation_turn::{ConversationTurn, TurnRole};
pub use level::Level;
pub use user_record::UserRecord;
