pub mod auth;
pub mod chat;
pub mod feedback;
pub mod health;
pub mod openapi;
pub mod resources;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

/// Every route and the API docs, before the middleware stack is applied.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/status", get(health::status))
        // Users
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        // Chat
        .route("/api/chat", post(chat::chat))
        // Resources
        .route("/api/search", post(resources::search))
        // Feedback
        .route("/api/feedback", post(feedback::send_feedback))
        .merge(openapi::swagger_ui())
}
