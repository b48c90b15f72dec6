//! Slash-command handler: `/start`, `/help`, `/level`, `/lesson`, `/progress`, `/mistakes`,
//! `/phrase`, `/say`. Replies are sent through [`Bot`]; the chain stops after a command.

use async_trait::async_trait;
use llm_client::{LlmClient, SpeechSynthesizer};
use prompt::{build_tutor_messages, lesson_request};
use std::sync::Arc;
use storage::{mistake_entries, Level, SessionStore, TurnRole};
use tracing::{error, info, instrument};
use tutor_core::{Bot, Handler, HandlerResponse, Message, Result, TutorError};

use super::database_error;
use crate::phrasebook::Phrasebook;

pub const HELP_TEXT: &str = "/start - Start the bot\n\
/lesson - Get a lesson for your level\n\
/level A1|A2|B1 - Change your level\n\
/progress - Show your progress\n\
/mistakes - Show the mistakes I noted\n\
/phrase [topic] - Useful phrases for a topic\n\
/say <text> - Hear the text spoken\n\
Just write any message in English to practice!";

pub const LEVEL_USAGE: &str = "Usage: /level A1|A2|B1";
pub const SAY_USAGE: &str = "Usage: /say <text>";

/// Telegram rejects text messages longer than this (in characters).
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Room kept for the "Last N of M mistakes:" header.
const MISTAKES_HEADER_RESERVE: usize = 64;

/// Renders a mistake log so it fits in one Telegram message.
///
/// When the whole log fits it is returned unchanged. Otherwise only the newest entries that fit are
/// kept, oldest first, under a `Last N of M mistakes:` header. A single oversized entry is cut
/// and ends with `...`.
pub fn format_mistakes(log: &str) -> String {
    if log.chars().count() <= MAX_MESSAGE_CHARS {
        return log.to_string();
    }
    let entries = mistake_entries(log);
    let budget = MAX_MESSAGE_CHARS - MISTAKES_HEADER_RESERVE;

    let mut shown: Vec<String> = Vec::new();
    let mut used = 0;
    for entry in entries.iter().rev() {
        let len = entry.chars().count() + 1;
        if used + len > budget {
            if shown.is_empty() {
                let cut: String = entry.chars().take(budget - 4).collect();
                shown.push(format!("{}...", cut));
            }
            break;
        }
        used += len;
        shown.push(entry.clone());
    }
    shown.reverse();

    format!(
        "Last {} of {} mistakes:\n{}",
        shown.len(),
        entries.len(),
        shown.join("\n")
    )
}

/// A parsed slash command with its (trimmed) argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Level(String),
    Lesson,
    Progress,
    Mistakes,
    Phrase(String),
    Say(String),
    Unknown(String),
}

/// Parses `/name[@botname] [args]`. Returns `None` for text that is not a command.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim().to_string()),
        None => (rest, String::new()),
    };
    let name = head.split('@').next().unwrap_or_default().to_lowercase();
    if name.is_empty() {
        return None;
    }

    let command = match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "level" => Command::Level(args),
        "lesson" => Command::Lesson,
        "progress" => Command::Progress,
        "mistakes" => Command::Mistakes,
        "phrase" => Command::Phrase(args),
        "say" => Command::Say(args),
        _ => Command::Unknown(name),
    };
    Some(command)
}

/// Executes slash commands against the session store and the completion / speech services.
pub struct CommandHandler {
    store: Arc<dyn SessionStore>,
    bot: Arc<dyn Bot>,
    llm_client: Arc<dyn LlmClient>,
    speech: Arc<dyn SpeechSynthesizer>,
    phrasebook: Arc<Phrasebook>,
}

impl CommandHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        bot: Arc<dyn Bot>,
        llm_client: Arc<dyn LlmClient>,
        speech: Arc<dyn SpeechSynthesizer>,
        phrasebook: Arc<Phrasebook>,
    ) -> Self {
        Self {
            store,
            bot,
            llm_client,
            speech,
            phrasebook,
        }
    }

    async fn level_of(&self, user_id: i64) -> Result<Level> {
        self.store
            .get_level(user_id)
            .await
            .map_err(database_error(user_id, "get_level"))
    }

    async fn start(&self, message: &Message) -> Result<String> {
        let level = self.level_of(message.user.id).await?;
        let greeting = match &message.user.first_name {
            Some(name) if !name.is_empty() => format!("Hi, {}!", name),
            _ => "Hi!".to_string(),
        };
        Ok(format!(
            "{} I'm your English tutor bot. Your level is {}.\n\n{}",
            greeting, level, HELP_TEXT
        ))
    }

    /// Only the first argument word is read; anything after it is ignored.
    async fn set_level(&self, user_id: i64, args: &str) -> Result<String> {
        let arg = args.split_whitespace().next().unwrap_or_default();
        let level: Level = match arg.parse() {
            Ok(level) => level,
            Err(e) => {
                info!(user_id = user_id, error = %e, "Rejected level change");
                return Ok(LEVEL_USAGE.to_string());
            }
        };
        self.store
            .set_level(user_id, level)
            .await
            .map_err(database_error(user_id, "set_level"))?;
        info!(user_id = user_id, level = %level, "step: level changed");
        Ok(format!("Level set to {}", level))
    }

    /// Generates a lesson, records it as two turns, sends it, then counts it as completed.
    async fn lesson(&self, message: &Message) -> Result<()> {
        let user_id = message.user.id;
        let level = self.level_of(user_id).await?;
        let request = lesson_request(level.as_str());
        let messages = build_tutor_messages(level.as_str(), Vec::new(), &request);

        self.store
            .append_turn(user_id, TurnRole::User, &request)
            .await
            .map_err(database_error(user_id, "append_turn"))?;

        info!(user_id = user_id, level = %level, "step: requesting lesson");
        let lesson = self
            .llm_client
            .get_llm_response_with_messages(messages)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user_id, "Lesson generation failed");
                TutorError::Llm(e.to_string())
            })?;

        self.bot.reply_to(message, &lesson).await?;

        self.store
            .append_turn(user_id, TurnRole::Assistant, &lesson)
            .await
            .map_err(database_error(user_id, "append_turn"))?;
        let total = self
            .store
            .increment_lessons(user_id)
            .await
            .map_err(database_error(user_id, "increment_lessons"))?;
        info!(user_id = user_id, lessons_completed = total, "step: lesson completed");
        Ok(())
    }

    async fn progress(&self, user_id: i64) -> Result<String> {
        let level = self.level_of(user_id).await?;
        let lessons = self
            .store
            .get_progress(user_id)
            .await
            .map_err(database_error(user_id, "get_progress"))?;
        let mistakes = self
            .store
            .get_mistakes(user_id)
            .await
            .map_err(database_error(user_id, "get_mistakes"))?;
        Ok(format!(
            "Level: {}\nLessons completed: {}\nMistakes noted: {}",
            level,
            lessons,
            mistake_entries(&mistakes).len()
        ))
    }

    fn phrase(&self, query: &str) -> String {
        let topics = self.phrasebook.topics().join(", ");
        if query.is_empty() {
            return format!("Topics: {}\nUse /phrase <topic> to see phrases.", topics);
        }
        let found = self.phrasebook.lookup(query);
        if found.is_empty() {
            return format!("No phrases found for \"{}\". Topics: {}", query, topics);
        }
        found
            .iter()
            .map(|t| t.render())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Sends `text` as a voice clip. Returns the usage hint when there is nothing to say.
    async fn say(&self, message: &Message, text: &str) -> Result<Option<String>> {
        if text.is_empty() {
            return Ok(Some(SAY_USAGE.to_string()));
        }
        let audio = self.speech.synthesize(text).await.map_err(|e| {
            error!(error = %e, user_id = message.user.id, "Speech synthesis failed");
            TutorError::Speech(e.to_string())
        })?;
        info!(
            user_id = message.user.id,
            bytes = audio.len(),
            "step: sending voice clip"
        );
        self.bot.send_voice(&message.chat, audio).await?;
        Ok(None)
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(command) = parse_command(&message.content) else {
            return Ok(HandlerResponse::Continue);
        };
        let user_id = message.user.id;
        info!(user_id = user_id, command = ?command, "step: CommandHandler handling command");

        let reply = match command {
            Command::Start => Some(self.start(message).await?),
            Command::Help => Some(HELP_TEXT.to_string()),
            Command::Level(arg) => Some(self.set_level(user_id, &arg).await?),
            Command::Lesson => {
                self.lesson(message).await?;
                None
            }
            Command::Progress => Some(self.progress(user_id).await?),
            Command::Mistakes => {
                let log = self
                    .store
                    .get_mistakes(user_id)
                    .await
                    .map_err(database_error(user_id, "get_mistakes"))?;
                Some(format_mistakes(&log))
            }
            Command::Phrase(query) => Some(self.phrase(&query)),
            Command::Say(text) => self.say(message, &text).await?,
            Command::Unknown(name) => Some(format!("Unknown command /{}.\n\n{}", name, HELP_TEXT)),
        };

        if let Some(text) = reply {
            self.bot.reply_to(message, &text).await?;
        }
        Ok(HandlerResponse::Stop)
    }
}
