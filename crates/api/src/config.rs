use std::time::Duration;

use adstudio_cloud::FetchConfig;
use adstudio_core::webhook::SYNC_WEBHOOK_TIMEOUT;

use crate::auth::jwt::JwtConfig;

/// Default cap for proxied downloads (100 MiB).
pub const DEFAULT_DOWNLOAD_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Must exceed the synchronous webhook
    /// window or those routes answer 408 before they can answer 504.
    pub request_timeout_secs: u64,
    /// Externally reachable base URL of this API, used to build job
    /// callback URLs.
    pub public_base_url: String,
    /// Front-end origin that OAuth callbacks redirect to.
    pub site_url: String,
    /// Shared secret for callback signatures; unsigned callbacks are
    /// accepted when unset.
    pub callback_secret: Option<String>,
    /// Cap for `GET /downloads`.
    pub download_max_bytes: u64,
    /// Abort window for the synchronous webhook routes.
    pub sync_webhook_timeout: Duration,
    /// Token validation settings.
    pub jwt: JwtConfig,
    /// Timeouts and address policy for remote fetches.
    pub fetch: FetchConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `150`                    |
    /// | `PUBLIC_BASE_URL`         | `http://localhost:3000`  |
    /// | `SITE_URL`                | `http://localhost:5173`  |
    /// | `WEBHOOK_CALLBACK_SECRET` | unset                    |
    /// | `DOWNLOAD_MAX_BYTES`      | `104857600`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "150".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        if request_timeout_secs <= SYNC_WEBHOOK_TIMEOUT.as_secs() {
            tracing::warn!(
                request_timeout_secs,
                sync_webhook_timeout_secs = SYNC_WEBHOOK_TIMEOUT.as_secs(),
                "REQUEST_TIMEOUT_SECS does not exceed the synchronous webhook timeout",
            );
        }

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let site_url = std::env::var("SITE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let callback_secret = std::env::var("WEBHOOK_CALLBACK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let download_max_bytes: u64 = std::env::var("DOWNLOAD_MAX_BYTES")
            .unwrap_or_else(|_| DEFAULT_DOWNLOAD_MAX_BYTES.to_string())
            .parse()
            .expect("DOWNLOAD_MAX_BYTES must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            site_url,
            callback_secret,
            download_max_bytes,
            sync_webhook_timeout: SYNC_WEBHOOK_TIMEOUT,
            jwt: JwtConfig::from_env(),
            fetch: FetchConfig::from_env(),
        }
    }

    /// Session cookies carry `Secure` when the front end is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.site_url.starts_with("https://")
    }

    /// Callback URL handed to the automation platform for a job.
    pub fn job_callback_url(&self, job_id: uuid::Uuid) -> String {
        format!("{}/api/v1/jobs/{job_id}/callback", self.public_base_url)
    }
}
