pub mod repositories;

use std::path::Path;
use std::time::{Duration, Instant};

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};

use crate::config::Settings;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn connect(settings: &Settings) -> Result<Self, sqlx::Error> {
        let db_path = resolve_db_path(&settings.database_path);

        if let Some(parent) = Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(settings.database_pool_timeout))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.database_pool_size)
            .acquire_timeout(Duration::from_secs(settings.database_pool_timeout))
            .connect_with(connect_options)
            .await?;

        let version: (String,) = sqlx::query_as("SELECT sqlite_version()")
            .fetch_one(&pool)
            .await?;
        tracing::info!(
            sqlite_version = %version.0,
            path = %db_path,
            pool_size = settings.database_pool_size,
            "Connected to SQLite database"
        );

        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => HealthCheckResult {
                status: "up".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as i64),
                error: None,
            },
            Err(e) => HealthCheckResult {
                status: "down".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }
}

pub struct HealthCheckResult {
    pub status: String,
    pub latency_ms: Option<i64>,
    pub error: Option<String>,
}

pub async fn run_migrations(pool: &SqlitePool, migrations_dir: &str) -> Result<(), sqlx::Error> {
    let path = Path::new(migrations_dir);

    if !path.exists() {
        tracing::warn!(path = %migrations_dir, "Migrations directory not found, skipping");
        return Ok(());
    }

    let migrator = Migrator::new(path).await?;
    migrator.run(pool).await?;

    tracing::info!("Migrations applied successfully");
    Ok(())
}

fn resolve_db_path(db_path: &str) -> String {
    let path = Path::new(db_path);
    if path.is_absolute() {
        return db_path.to_string();
    }

    // Use /app in Docker, otherwise resolve relative to cwd
    let base = if Path::new("/app/migrations").exists() {
        Path::new("/app").to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf())
    };

    base.join(db_path).to_string_lossy().into_owned()
}
