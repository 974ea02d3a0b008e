use std::sync::Arc;

use adstudio_automation::Automation;
use adstudio_cloud::{IdentityProvider, ObjectStorage, RemoteFetcher};
use adstudio_db::Database;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every collaborator sits behind an `Arc`, and the
/// fetcher's `reqwest::Client` is itself reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Relational storage (Postgres in production).
    pub db: Arc<dyn Database>,
    /// Object storage for uploads and avatars.
    pub storage: Arc<dyn ObjectStorage>,
    /// Hosted identity provider for sign-in and code exchange.
    pub identity: Arc<dyn IdentityProvider>,
    /// Outbound automation webhooks.
    pub automation: Arc<dyn Automation>,
    /// Guarded client for URL-sourced uploads and proxied downloads.
    pub fetcher: RemoteFetcher,
    pub config: Arc<ServerConfig>,
}
