use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use crate::AppState;
use crate::db::repositories::{CreateUserError, UserRepository};
use crate::error::{AppError, ErrorBody};
use crate::models::requests::CredentialsRequest;
use crate::models::responses::AuthResponse;

const CREDENTIALS_REQUIRED: &str = "Username and password are required.";

fn require_credentials(body: &CredentialsRequest) -> Result<(), AppError> {
    if !body.is_complete() {
        return Err(AppError::bad_request(CREDENTIALS_REQUIRED));
    }
    body.validate()?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, body = AuthResponse, description = "User registered"),
        (status = 400, body = ErrorBody, description = "Missing username or password"),
        (status = 409, body = ErrorBody, description = "Username already exists"),
    ),
    tag = "Users"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    require_credentials(&body)?;
    let repo = UserRepository::new(state.db.pool.clone());

    if repo.get_by_username(&body.username).await?.is_some() {
        return Err(AppError::conflict("Username already exists."));
    }

    let user = repo
        .create(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            CreateUserError::UsernameTaken => AppError::conflict("Username already exists."),
            CreateUserError::Database(e) => AppError::from(e),
        })?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered.".to_string(),
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, body = AuthResponse, description = "Login successful"),
        (status = 400, body = ErrorBody, description = "Missing username or password"),
        (status = 401, body = ErrorBody, description = "Invalid username or password"),
    ),
    tag = "Users"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if !body.is_complete() {
        return Err(AppError::bad_request(CREDENTIALS_REQUIRED));
    }
    let repo = UserRepository::new(state.db.pool.clone());

    let user = repo
        .find_by_credentials(&body.username, &body.password)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password."))?;

    Ok(Json(AuthResponse {
        message: "Login successful.".to_string(),
        user: user.into(),
    }))
}
