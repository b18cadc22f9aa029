use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::responses::HelplineInfo;
use crate::services::helplines::HelplineRecord;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error: &'static str,
    message: String,
    /// Only on failed chat turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    crisis_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    helplines: Option<HelplineInfo>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Database(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
    /// A chat turn that failed after classification; the crisis state still reaches the client.
    #[error("{inner}")]
    ChatTurn {
        inner: Box<AppError>,
        crisis_detected: bool,
        helplines: Option<HelplineInfo>,
    },
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Attach the turn's crisis flag, and helplines when one was detected.
    pub fn with_crisis_state(self, crisis_detected: bool, helpline: Option<&HelplineRecord>) -> Self {
        Self::ChatTurn {
            inner: Box::new(self),
            crisis_detected,
            helplines: helpline.map(HelplineInfo::from),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Self::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            Self::ChatTurn { inner, .. } => inner.status_and_code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            sentry::capture_error(&self);
        }
        let message = self.to_string();
        let (crisis_detected, helplines) = match self {
            Self::ChatTurn {
                crisis_detected,
                helplines,
                ..
            } => (Some(crisis_detected), helplines),
            _ => (None, None),
        };
        let body = ErrorBody {
            error: code,
            message,
            crisis_detected,
            helplines,
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Database error");
        Self::Database("Internal server error.".to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
