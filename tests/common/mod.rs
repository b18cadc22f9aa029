#![allow(dead_code)]

use reqwest::Client;
use std::time::{SystemTime, UNIX_EPOCH};

/// Base URL of a running server from TEST_API_URL.
///
/// These tests exercise a live deployment; without the variable they are skipped.
pub fn base_url() -> Option<String> {
    match std::env::var("TEST_API_URL") {
        Ok(url) if !url.trim().is_empty() => Some(url.trim_end_matches('/').to_string()),
        _ => {
            eprintln!("TEST_API_URL not set, skipping integration test");
            None
        }
    }
}

/// Build a reusable HTTP client.
pub fn http_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client")
}

/// Unique username for test isolation.
pub fn unique_user() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test_user_{ts}")
}

/// Error code from an `{error, message}` body.
pub async fn error_code(resp: reqwest::Response) -> String {
    let data: serde_json::Value = resp.json().await.unwrap();
    data["error"].as_str().unwrap_or_default().to_string()
}
