//! Chat messages as the providers see them
//!
//! An agent's prompt is its persona as a system message followed by one
//! message per log entry: its own entries as `assistant`, everyone else's as
//! `user`. Several humans and teammates speaking in a row therefore produce
//! runs of `user` messages, which [`coalesce`] folds for providers that
//! require strict alternation.

use serde::{Deserialize, Serialize};

/// Role in a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona and team rules
    System,
    /// Anyone but the agent itself
    User,
    /// The agent's own earlier entries
    Assistant,
}

impl MessageRole {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
}

impl Message {
    /// System message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// User message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Join consecutive messages of the same role, one per line.
pub fn coalesce<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::new();
    for message in messages {
        match out.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push('\n');
                last.content.push_str(&message.content);
            }
            _ => out.push(message.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        assert_eq!(Message::system("rules").role, MessageRole::System);
        assert_eq!(Message::user("hi").role, MessageRole::User);
        assert_eq!(Message::assistant("hello").content, "hello");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"x"}"#);
    }

    #[test]
    fn test_coalesce_folds_speaker_runs() {
        let log = [
            Message::user("[alice]: can someone mail Bob?"),
            Message::user("[planner]: @writer that's yours"),
            Message::assistant("[writer]: on it"),
            Message::user("[alice]: thanks"),
        ];
        let folded = coalesce(&log);
        assert_eq!(folded.len(), 3);
        assert_eq!(
            folded[0].content,
            "[alice]: can someone mail Bob?\n[planner]: @writer that's yours"
        );
        assert_eq!(folded[1].role, MessageRole::Assistant);
        assert!(coalesce(&[]).is_empty());
    }
}
