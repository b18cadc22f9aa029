use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::AppState;
use crate::db::repositories::UserRepository;
use crate::models::responses::{
    DatabaseStats, HealthResponse, ServiceHealth, StatusResponse, SystemStatistics,
};

fn configured(is_configured: bool) -> ServiceHealth {
    ServiceHealth {
        status: if is_configured { "configured" } else { "not_configured" }.to_string(),
        latency_ms: None,
        error: None,
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, body = HealthResponse, description = "Service health check")),
    tag = "Health"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_health = state.db.health_check().await;

    let mut services = HashMap::new();
    services.insert(
        "database".to_string(),
        ServiceHealth {
            status: db_health.status.clone(),
            latency_ms: db_health.latency_ms,
            error: db_health.error,
        },
    );
    services.insert(
        "gemini_api".to_string(),
        configured(state.dispatcher.provider_configured()),
    );
    services.insert(
        "search_api".to_string(),
        configured(state.resources.provider_configured()),
    );
    services.insert(
        "feedback_relay".to_string(),
        configured(state.feedback.is_configured()),
    );

    let overall_status = if db_health.status == "up" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        timestamp: Utc::now().naive_utc(),
        services,
    })
}

#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, body = StatusResponse, description = "Detailed service status")),
    tag = "Health"
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let uptime = state.start_time.elapsed().as_secs();

    let registered_users = UserRepository::new(state.db.pool.clone()).count().await;
    let connected = registered_users.is_ok();

    Json(StatusResponse {
        service: state.settings.app_name.clone(),
        version: state.settings.app_version.clone(),
        environment: state.settings.environment.clone(),
        uptime_seconds: uptime,
        database: DatabaseStats {
            connected,
            pool_size: state.settings.database_pool_size,
        },
        statistics: SystemStatistics {
            registered_users: registered_users.unwrap_or(0),
        },
        timestamp: Utc::now().naive_utc(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service info")),
    tag = "Health"
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": state.settings.app_name,
        "version": state.settings.app_version,
        "status": "running",
        "docs": "/explore",
        "health": "/health",
    }))
}
