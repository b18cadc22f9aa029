use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::entities::{SearchItem, User};
use crate::services::helplines::HelplineRecord;

// ── Chat ──

#[derive(Debug, Serialize, ToSchema)]
pub struct HelplineInfo {
    pub text: String,
    pub numbers: Vec<String>,
}

impl From<&HelplineRecord> for HelplineInfo {
    fn from(record: &HelplineRecord) -> Self {
        Self {
            text: record.intro_text.to_string(),
            numbers: record.numbers.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub crisis_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helplines: Option<HelplineInfo>,
}

// ── Resources ──

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub articles: Vec<SearchItem>,
    pub videos: Vec<SearchItem>,
}

// ── Users ──

#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserInfo {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Health / Status ──

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub services: HashMap<String, ServiceHealth>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub database: DatabaseStats,
    pub statistics: SystemStatistics,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseStats {
    pub connected: bool,
    pub pool_size: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatistics {
    pub registered_users: i64,
}
