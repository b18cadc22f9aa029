use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::entities::ChatMessage;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "message must be 1-4000 characters"))]
    pub message: String,

    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    #[validate(length(max = 500, message = "query exceeds 500 characters"))]
    pub query: String,

    #[serde(default)]
    pub is_crisis: bool,
}

/// Body shared by register and login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(length(max = 32, message = "username must be at most 32 characters"))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "username may only contain letters, digits, '.', '_' and '-'"
    ))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 128, message = "password must be at most 128 characters"))]
    pub password: String,
}

impl CredentialsRequest {
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FeedbackRequest {
    #[serde(default)]
    #[validate(length(max = 64, message = "username must be at most 64 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 5000, message = "feedback must be 1-5000 characters"))]
    pub feedback: String,
}
