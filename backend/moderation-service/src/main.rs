use actix_web::{web, App, HttpServer};
use moderation_service::{
    config::Config,
    db::{ModerationStore, PgModerationStore},
    handlers::{self, AppState},
    services::{ContentAnalyzer, RandomAnalyzer, RemoteAnalyzer},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Moderation Service...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        http_port = %config.http_port,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    let pool = Arc::new(pool);
    tracing::info!(
        max_connections = config.db_max_connections,
        "Database pool initialized"
    );

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&*pool)
        .await
        .map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            e
        })?;
    tracing::info!("Migrations completed successfully");

    let analyzer: Arc<dyn ContentAnalyzer> = match &config.analyzer_url {
        Some(url) => {
            tracing::info!(endpoint = %url, "Using remote content analyzer");
            Arc::new(RemoteAnalyzer::new(
                url.clone(),
                Duration::from_secs(config.analyzer_timeout_secs),
            )?)
        }
        None => {
            tracing::warn!("ANALYZER_URL not set, content analysis returns placeholder scores");
            Arc::new(RandomAnalyzer::new())
        }
    };

    let store: Arc<dyn ModerationStore> = Arc::new(PgModerationStore::new(pool.clone()));
    let state = web::Data::new(AppState::new(store, analyzer, config.default_queue_limit));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    tracing::info!("Moderation Service listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    tracing::info!("Moderation Service stopped");
    Ok(())
}
