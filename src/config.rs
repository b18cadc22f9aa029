use std::env;

/// Value shipped in the sample `.env`; treated the same as an absent key.
const PLACEHOLDER_GEMINI_KEY: &str = "YOUR_GEMINI_API_KEY";

#[derive(Debug, Clone)]
pub struct Settings {
    // App
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
    pub host: String,
    pub port: u16,

    // Database
    pub database_path: String,
    pub database_pool_size: u32,
    pub database_pool_timeout: u64,

    // Gemini
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout: u64,

    // Google Custom Search
    pub google_search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub search_base_url: String,
    pub search_timeout: u64,

    // CORS
    pub cors_origins: String,

    // Rate limiting
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_hour: u32,

    // Logging
    pub log_level: String,
    pub log_format: String,

    // Sentry
    pub sentry_dsn: Option<String>,
    pub sentry_traces_sample_rate: f32,

    // Feedback relay
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub feedback_email_to: Option<String>,
    pub feedback_webhook_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            app_name: env::var("APP_NAME").unwrap_or("BotCure API".into()),
            app_version: env::var("APP_VERSION").unwrap_or("1.0.0".into()),
            environment: env::var("ENVIRONMENT").unwrap_or("development".into()),
            host: env::var("HOST").unwrap_or("0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or("5001".into())
                .parse()
                .unwrap_or(5001),

            database_path: env::var("DATABASE_PATH").unwrap_or("data/botcure.db".into()),
            database_pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or("5".into())
                .parse()
                .unwrap_or(5),
            database_pool_timeout: env::var("DATABASE_POOL_TIMEOUT")
                .unwrap_or("30".into())
                .parse()
                .unwrap_or(30),

            gemini_api_key: non_empty(env::var("GEMINI_API_KEY").ok())
                .filter(|k| k != PLACEHOLDER_GEMINI_KEY),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or("gemini-2.0-flash".into()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or("https://generativelanguage.googleapis.com/v1beta".into()),
            gemini_timeout: env::var("GEMINI_TIMEOUT")
                .unwrap_or("60".into())
                .parse()
                .unwrap_or(60),

            google_search_api_key: non_empty(env::var("GOOGLE_SEARCH_API_KEY").ok()),
            search_engine_id: non_empty(env::var("SEARCH_ENGINE_ID").ok()),
            search_base_url: env::var("SEARCH_BASE_URL")
                .unwrap_or("https://www.googleapis.com/customsearch/v1".into()),
            search_timeout: env::var("SEARCH_TIMEOUT")
                .unwrap_or("15".into())
                .parse()
                .unwrap_or(15),

            cors_origins: env::var("CORS_ORIGINS").unwrap_or("*".into()),

            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or("60".into())
                .parse()
                .unwrap_or(60),
            rate_limit_per_hour: env::var("RATE_LIMIT_PER_HOUR")
                .unwrap_or("1000".into())
                .parse()
                .unwrap_or(1000),

            log_level: env::var("LOG_LEVEL").unwrap_or("info".into()),
            log_format: env::var("LOG_FORMAT").unwrap_or("json".into()),

            sentry_dsn: non_empty(env::var("SENTRY_DSN").ok()),
            sentry_traces_sample_rate: env::var("SENTRY_TRACES_SAMPLE_RATE")
                .unwrap_or("1.0".into())
                .parse()
                .unwrap_or(1.0),

            email_user: non_empty(env::var("EMAIL_USER").ok()),
            email_pass: non_empty(env::var("EMAIL_PASS").ok()),
            smtp_host: env::var("SMTP_HOST").unwrap_or("smtp.gmail.com".into()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or("587".into())
                .parse()
                .unwrap_or(587),
            feedback_email_to: non_empty(env::var("FEEDBACK_EMAIL_TO").ok()),
            feedback_webhook_url: non_empty(env::var("FEEDBACK_WEBHOOK_URL").ok()),
        }
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        if self.cors_origins == "*" {
            return vec!["*".to_string()];
        }
        self.cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn search_configured(&self) -> bool {
        self.google_search_api_key.is_some() && self.search_engine_id.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
