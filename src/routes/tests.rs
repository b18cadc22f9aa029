use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use super::api_router;
use crate::AppState;
use crate::config::Settings;
use crate::db::Database;
use crate::models::entities::SearchItem;
use crate::services::ai::{AiProvider, ProviderError};
use crate::services::crisis::KeywordClassifier;
use crate::services::dispatcher::ConversationDispatcher;
use crate::services::feedback::FeedbackRelay;
use crate::services::prompt::ProviderPayload;
use crate::services::resources::ResourceService;
use crate::services::search::SearchProvider;

#[derive(Clone, Copy)]
enum Ai {
    Reply(&'static str),
    Fail,
    Unconfigured,
}

#[async_trait]
impl AiProvider for Ai {
    async fn generate(&self, _: &ProviderPayload) -> Result<Option<String>, ProviderError> {
        match self {
            Self::Reply(text) => Ok(Some(text.to_string())),
            Self::Fail => Err(ProviderError::Transport("timed out".into())),
            Self::Unconfigured => Err(ProviderError::NotConfigured),
        }
    }

    fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }
}

struct Search {
    configured: bool,
    articles: Vec<SearchItem>,
    videos: Vec<SearchItem>,
}

impl Search {
    fn unconfigured() -> Self {
        Self {
            configured: false,
            articles: Vec::new(),
            videos: Vec::new(),
        }
    }
}

#[async_trait]
impl SearchProvider for Search {
    async fn search(
        &self,
        _query: &str,
        _result_count: u8,
        site_filter: Option<&str>,
    ) -> Result<Vec<SearchItem>, ProviderError> {
        Ok(match site_filter {
            Some(_) => self.videos.clone(),
            None => self.articles.clone(),
        })
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

fn item(title: &str) -> SearchItem {
    SearchItem {
        title: title.to_string(),
        link: format!("https://example.org/{}", title.len()),
        snippet: String::new(),
    }
}

async fn app(ai: Ai, search: Search) -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::raw_sql(include_str!("../../migrations/sqlite/0001_create_users.sql"))
        .execute(&pool)
        .await
        .unwrap();

    let state = Arc::new(AppState {
        db: Database { pool },
        settings: Settings::from_env(),
        start_time: Instant::now(),
        dispatcher: ConversationDispatcher::new(Arc::new(KeywordClassifier::new()), Arc::new(ai)),
        resources: ResourceService::new(Arc::new(search)),
        feedback: FeedbackRelay::webhook(reqwest::Client::new(), None),
    });

    api_router().with_state(state)
}

async fn post(app: &Router, uri: &str, body: Value, region: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(region) = region {
        builder = builder.header("x-user-region", region);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    send(app, req).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ── Chat ──

#[tokio::test]
async fn crisis_reply_includes_regional_helplines() {
    let app = app(Ai::Reply("Please call Kiran now."), Search::unconfigured()).await;

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({"message": "I want to kill myself", "history": []}),
        Some("IND"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Please call Kiran now.");
    assert_eq!(body["crisisDetected"], true);
    assert_eq!(body["helplines"]["numbers"][0], "Kiran Helpline: 1800-599-0019");
}

#[tokio::test]
async fn ordinary_reply_has_no_helplines() {
    let app = app(Ai::Reply("I'm here for you."), Search::unconfigured()).await;

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({
            "message": "exams are stressing me out",
            "history": [{"role": "model", "parts": [{"text": "Hi"}], "crisisDetected": false}]
        }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crisisDetected"], false);
    assert!(body.get("helplines").is_none());
}

#[tokio::test]
async fn provider_failure_during_crisis_still_returns_helplines() {
    let app = app(Ai::Fail, Search::unconfigured()).await;

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({"message": "I want to kill myself"}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["message"], "Failed to fetch response from AI.");
    assert_eq!(body["crisisDetected"], true);
    assert_eq!(body["helplines"]["numbers"][0], "US/Canada: 988");
}

#[tokio::test]
async fn missing_ai_key_is_a_configuration_error() {
    let app = app(Ai::Unconfigured, Search::unconfigured()).await;

    let (status, body) = post(&app, "/api/chat", json!({"message": "hello"}), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_error");
    assert_eq!(body["message"], "Server configuration error: Missing API Key.");
    assert_eq!(body["crisisDetected"], false);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = app(Ai::Reply("unused"), Search::unconfigured()).await;

    let (status, body) = post(&app, "/api/chat", json!({"message": ""}), None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
}

// ── Resources ──

#[tokio::test]
async fn search_without_credentials_is_a_configuration_error() {
    let app = app(Ai::Reply("unused"), Search::unconfigured()).await;

    let (status, body) = post(&app, "/api/search", json!({"query": "exam stress"}), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_error");
}

#[tokio::test]
async fn crisis_search_replaces_unsafe_videos_with_safe_set() {
    let search = Search {
        configured: true,
        articles: vec![item("a"), item("b"), item("c"), item("d")],
        videos: vec![item("Sad songs for a breakup"), item("Lonely nights")],
    };
    let app = app(Ai::Reply("unused"), search).await;

    let (status, body) = post(
        &app,
        "/api/search",
        json!({"query": "anything", "isCrisis": true}),
        Some("IND"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"].as_array().unwrap().len(), 3);
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["title"], "Guided Breathing for Stress Relief");
    assert_eq!(videos[1]["title"], "5-Minute Guided Meditation for Anxiety");
}

#[tokio::test]
async fn ordinary_search_may_return_no_videos() {
    let search = Search {
        configured: true,
        articles: vec![item("a")],
        videos: vec![item("Dark ambient")],
    };
    let app = app(Ai::Reply("unused"), search).await;

    let (status, body) = post(&app, "/api/search", json!({"query": "sleep"}), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["videos"].as_array().unwrap().is_empty());
}

// ── Users ──

#[tokio::test]
async fn register_login_lifecycle() {
    let app = app(Ai::Reply("unused"), Search::unconfigured()).await;
    let creds = json!({"username": "asha", "password": "s3cret"});

    let (status, body) = post(&app, "/api/register", creds.clone(), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["id"], 1);
    assert!(body["user"].get("password").is_none());

    let (status, body) = post(&app, "/api/register", creds.clone(), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = post(&app, "/api/login", creds, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful.");

    let (status, _) = post(
        &app,
        "/api/login",
        json!({"username": "asha", "password": "wrong"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = get(&app, "/status").await;
    assert_eq!(body["statistics"]["registered_users"], 1);
}

#[tokio::test]
async fn missing_credentials_are_a_bad_request() {
    let app = app(Ai::Reply("unused"), Search::unconfigured()).await;

    for uri in ["/api/register", "/api/login"] {
        let (status, body) = post(&app, uri, json!({"username": "asha"}), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Username and password are required.");
    }
}

// ── Feedback / health ──

#[tokio::test]
async fn feedback_without_relay_is_an_upstream_error() {
    let app = app(Ai::Reply("unused"), Search::unconfigured()).await;

    let (status, body) = post(
        &app,
        "/api/feedback",
        json!({"username": "asha", "feedback": "Helpful!"}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to send feedback.");
}

#[tokio::test]
async fn health_reports_provider_configuration() {
    let app = app(Ai::Unconfigured, Search::unconfigured()).await;

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["gemini_api"]["status"], "not_configured");
    assert_eq!(body["services"]["search_api"]["status"], "not_configured");
    assert_eq!(body["services"]["feedback_relay"]["status"], "not_configured");
}
