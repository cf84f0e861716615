use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conversation id -> record. Ordered so "the first conversation" is stable.
pub type Conversations = BTreeMap<String, ConversationRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Who {
    #[serde(rename = "me")]
    Me,
    #[serde(rename = "ollama", alias = "assistant")]
    Assistant,
}

/// One rendered piece of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Segment {
    Text(String),
    Code(String),
}

impl Segment {
    pub fn content(&self) -> &str {
        match self {
            Segment::Text(content) | Segment::Code(content) => content,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub who: Who,
    pub created_at: DateTime<Utc>,
    pub txt: Vec<Segment>,
}

impl Message {
    pub fn from_me(prompt: &str) -> Self {
        Message {
            who: Who::Me,
            created_at: Utc::now(),
            txt: vec![Segment::Text(prompt.to_string())],
        }
    }

    pub fn from_assistant(txt: Vec<Segment>) -> Self {
        Message {
            who: Who::Assistant,
            created_at: Utc::now(),
            txt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub model: String,
    #[serde(rename = "chatHistory", default)]
    pub chat_history: Vec<Message>,
    #[serde(default)]
    pub ctx: Vec<i64>,
}

impl ConversationRecord {
    pub fn empty(model: &str) -> Self {
        ConversationRecord {
            model: model.to_string(),
            chat_history: Vec::new(),
            ctx: Vec::new(),
        }
    }
}
