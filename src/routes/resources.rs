use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use validator::Validate;

use crate::AppState;
use crate::error::{AppError, ErrorBody};
use crate::middleware::UserRegion;
use crate::models::requests::SearchRequest;
use crate::models::responses::SearchResponse;

#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    params(("x-user-region" = Option<String>, Header, description = "Caller region code, e.g. IND")),
    responses(
        (status = 200, body = SearchResponse, description = "Filtered articles and videos"),
        (status = 422, body = ErrorBody, description = "Invalid request"),
        (status = 500, body = ErrorBody, description = "Search provider not configured"),
    ),
    tag = "Resources"
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    UserRegion(region): UserRegion,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    body.validate()?;

    if !state.resources.provider_configured() {
        tracing::error!("GOOGLE_SEARCH_API_KEY or SEARCH_ENGINE_ID is not configured");
        return Err(AppError::configuration(
            "Server configuration error: Missing search credentials.",
        ));
    }

    let bundle = state
        .resources
        .find(body.query.trim(), body.is_crisis, region)
        .await;

    tracing::info!(
        crisis = body.is_crisis,
        region = region.as_ref(),
        articles = bundle.articles.len(),
        videos = bundle.videos.len(),
        "Resources fetched"
    );

    Ok(Json(SearchResponse {
        articles: bundle.articles,
        videos: bundle.videos,
    }))
}
