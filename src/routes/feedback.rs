use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use validator::Validate;

use crate::AppState;
use crate::error::{AppError, ErrorBody};
use crate::models::requests::FeedbackRequest;
use crate::models::responses::MessageResponse;

#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, body = MessageResponse, description = "Feedback delivered"),
        (status = 422, body = ErrorBody, description = "Invalid request"),
        (status = 502, body = ErrorBody, description = "Feedback could not be delivered"),
    ),
    tag = "Feedback"
)]
pub async fn send_feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    body.validate()?;

    state
        .feedback
        .send(&body.username, &body.feedback)
        .await
        .map_err(|_| AppError::upstream("Failed to send feedback."))?;

    Ok(Json(MessageResponse {
        message: "Feedback sent successfully!".to_string(),
    }))
}
