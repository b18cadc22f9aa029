use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use validator::Validate;

use crate::AppState;
use crate::error::{AppError, ErrorBody};
use crate::middleware::UserRegion;
use crate::models::requests::ChatRequest;
use crate::models::responses::{ChatResponse, HelplineInfo};

const CHAT_FAILURE_MESSAGE: &str = "Failed to fetch response from AI.";
const MISSING_KEY_MESSAGE: &str = "Server configuration error: Missing API Key.";

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    params(("x-user-region" = Option<String>, Header, description = "Caller region code, e.g. IND")),
    responses(
        (status = 200, body = ChatResponse, description = "Model reply and crisis flag"),
        (status = 422, body = ErrorBody, description = "Invalid request"),
        (status = 500, body = ErrorBody, description = "Provider not configured; carries crisisDetected and helplines"),
        (status = 502, body = ErrorBody, description = "Provider failure; carries crisisDetected and helplines"),
    ),
    tag = "Chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    UserRegion(region): UserRegion,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    body.validate()?;

    let outcome = state
        .dispatcher
        .handle(&body.message, &body.history, region)
        .await
        .map_err(|e| {
            let err = if e.is_configuration() {
                tracing::error!("GEMINI_API_KEY is missing or not configured");
                AppError::configuration(MISSING_KEY_MESSAGE)
            } else {
                AppError::upstream(CHAT_FAILURE_MESSAGE)
            };
            err.with_crisis_state(e.crisis_detected, e.helpline)
        })?;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        crisis_detected: outcome.crisis_detected,
        helplines: outcome.helpline.map(HelplineInfo::from),
    }))
}
