use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One role-tagged entry of a conversation, as handed to the adapter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// A chat message as the application keeps it: a turn plus identity and timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Message {
    /// Creates a message with a fresh UUID v4 and the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now().timestamp_millis(),
        }
    }

    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A chat submission: the conversation so far, the provider id, and an optional document.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub document_id: Option<String>,
}

impl ChatRequest {
    pub fn turns(&self) -> Vec<Turn> {
        self.messages.iter().map(Message::to_turn).collect()
    }
}

/// Represents a chunk of streamed content from the model.
#[derive(Debug, PartialEq)]
pub enum StreamChunk {
    Content(String),
}
