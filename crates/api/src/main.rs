use std::net::SocketAddr;
use std::sync::Arc;

use adstudio_automation::{HttpAutomation, WebhookUrls};
use adstudio_cloud::{GoTrueClient, GoTrueConfig, RemoteFetcher, S3Storage, StorageConfig};
use adstudio_db::PgDatabase;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use adstudio_api::config::ServerConfig;
use adstudio_api::router::build_app_router;
use adstudio_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adstudio_api=debug,tower_http=debug".into()),
        )
        .with(fmt_layer)
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = adstudio_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    adstudio_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    adstudio_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Managed backend ---
    let storage = S3Storage::new(&StorageConfig::from_env()).await;
    let identity = GoTrueClient::new(GoTrueConfig::from_env());

    // --- Automation webhooks ---
    let webhook_urls = WebhookUrls::from_env();
    let configured: Vec<_> = webhook_urls.configured().map(|k| k.label()).collect();
    tracing::info!(?configured, "Automation webhooks loaded");

    // --- App state ---
    let state = AppState {
        db: Arc::new(PgDatabase::new(pool)),
        storage: Arc::new(storage),
        identity: Arc::new(identity),
        automation: Arc::new(HttpAutomation::new(webhook_urls)),
        fetcher: RemoteFetcher::new(&config.fetch),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
