//! # Prompt
//!
//! Assembles the message list sent to the completion service for the English tutor.
//!
//! ## Order
//!
//! 1. **System**: tutoring preamble parameterized by the learner's level
//! 2. **History**: recent conversation turns, oldest first, with their user/assistant roles
//! 3. **User**: the new inbound message
//!
//! Pure functions; no I/O. Output is sent to OpenAI-compatible chat completion APIs.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Prefix the model is asked to use for each corrected sentence.
pub const CORRECTION_PREFIX: &str = "Correction:";

/// Tutoring preamble for the given level (e.g. `"A2"`).
pub fn tutor_preamble(level: &str) -> String {
    format!(
        "You are an English teacher for level {level}. Speak simple English. \
         Ask questions, check answers, and help improve English. \
         If the student's last message has a grammar or vocabulary mistake, \
         add one line per mistake that starts with \"{CORRECTION_PREFIX}\" \
         followed by the corrected sentence. Do not use Markdown."
    )
}

/// User request that asks for a lesson at the given level.
pub fn lesson_request(level: &str) -> String {
    format!("Give me a simple English lesson with questions and tasks for level {level}")
}

/// Builds the full message list: preamble, history (already chronological), current message.
///
/// History is passed through unchanged, so callers must supply it oldest first.
pub fn build_tutor_messages<I>(level: &str, history: I, current_message: &str) -> Vec<ChatMessage>
where
    I: IntoIterator<Item = ChatMessage>,
{
    let mut messages = vec![ChatMessage::system(tutor_preamble(level))];
    messages.extend(history);
    messages.push(ChatMessage::user(current_message));
    messages
}

/// Collects the corrections from a tutor reply.
///
/// A correction is any line that starts with [`CORRECTION_PREFIX`] (ASCII case-insensitive,
/// leading whitespace ignored); the trimmed remainder is returned. Empty corrections are dropped.
pub fn extract_corrections(reply: &str) -> Vec<String> {
    let prefix_len = CORRECTION_PREFIX.len();
    reply
        .lines()
        .map(str::trim_start)
        .filter(|line| {
            line.get(..prefix_len)
                .is_some_and(|head| head.eq_ignore_ascii_case(CORRECTION_PREFIX))
        })
        .map(|line| line[prefix_len..].trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
