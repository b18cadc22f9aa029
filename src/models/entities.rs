use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ── Enums ──

/// Conversation roles as the generative provider names them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum MessageRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
}

// ── Conversation ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A history entry as the client sends it back on every turn.
///
/// Model replies carry the `crisisDetected` marker the client got from us;
/// anything else the client attaches is dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_detected: Option<bool>,
}

/// Provider-bound turn: exactly a role and its content parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Content {
    pub role: MessageRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![Part::text(text)],
        }
    }
}

impl From<&ChatMessage> for Content {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            parts: msg.parts.clone(),
        }
    }
}

// ── Resources ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SearchItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

// ── Users ──

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}
