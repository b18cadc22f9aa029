mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::header;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use config::Settings;
use db::Database;
use services::ai::GeminiClient;
use services::crisis::KeywordClassifier;
use services::dispatcher::ConversationDispatcher;
use services::feedback::FeedbackRelay;
use services::resources::ResourceService;
use services::search::GoogleSearchClient;

pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub start_time: Instant,
    pub dispatcher: ConversationDispatcher,
    pub resources: ResourceService,
    pub feedback: FeedbackRelay,
}

#[tokio::main]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();

    let settings = Settings::from_env();
    init_tracing(&settings);
    let _sentry = init_sentry(&settings);

    tracing::info!(
        app = %settings.app_name,
        version = %settings.app_version,
        "Starting server"
    );

    if settings.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is missing; /api/chat will report a configuration error");
    }
    if !settings.search_configured() {
        tracing::warn!("Search credentials missing; /api/search will report a configuration error");
    }

    let database = Database::connect(&settings)
        .await
        .expect("Failed to connect to database");

    let migrations_dir = if std::path::Path::new("/app/migrations/sqlite").exists() {
        "/app/migrations/sqlite"
    } else {
        "./migrations/sqlite"
    };

    db::run_migrations(&database.pool, migrations_dir)
        .await
        .expect("Failed to run migrations");

    // Build shared HTTP client
    let http_client = reqwest::Client::new();

    let gemini = GeminiClient::new(
        http_client.clone(),
        settings.gemini_api_key.clone(),
        &settings.gemini_model,
        &settings.gemini_base_url,
        settings.gemini_timeout,
    );

    let search = GoogleSearchClient::new(
        http_client.clone(),
        settings.google_search_api_key.clone(),
        settings.search_engine_id.clone(),
        &settings.search_base_url,
        settings.search_timeout,
    );

    let dispatcher =
        ConversationDispatcher::new(Arc::new(KeywordClassifier::new()), Arc::new(gemini));
    let resources = ResourceService::new(Arc::new(search));
    let feedback = FeedbackRelay::from_settings(http_client, &settings);
    match feedback.channel_name() {
        Some(channel) => tracing::info!(channel, "Feedback relay ready"),
        None => tracing::warn!("No feedback relay configured; /api/feedback will fail"),
    }

    let state = Arc::new(AppState {
        db: database,
        settings: settings.clone(),
        start_time: Instant::now(),
        dispatcher,
        resources,
        feedback,
    });

    let cors = build_cors(&settings);

    let app = routes::api_router()
        .layer(middleware::RateLimitLayer::new(
            settings.rate_limit_per_minute,
            settings.rate_limit_per_hour,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(sentry_tower::SentryHttpLayer::with_transaction())
        .layer(sentry_tower::NewSentryLayer::<Request>::new_from_top())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    tracing::info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

fn init_tracing(settings: &Settings) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_format == "json" {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(settings.environment.clone().into()),
            traces_sample_rate: settings.sentry_traces_sample_rate,
            ..Default::default()
        },
    ));
    tracing::info!(environment = %settings.environment, "Sentry initialized");
    Some(guard)
}

fn build_cors(settings: &Settings) -> CorsLayer {
    let origins = settings.cors_origins_list();

    if origins.contains(&"*".to_string()) {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        use axum::http::Method;
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::ORIGIN,
                header::HeaderName::from_static("x-user-region"),
                header::HeaderName::from_static("x-requested-with"),
            ])
    }
}
