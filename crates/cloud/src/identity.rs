//! Hosted identity provider (GoTrue-compatible auth API).
//!
//! Password sign-in, OAuth PKCE code exchange and sign-out are delegated to
//! the provider; the API only validates the resulting access tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A signed-in session as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: uuid::Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Wrong email/password, or an expired/invalid auth code.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with an unexpected status.
    #[error("Identity provider error ({status}): {body}")]
    Provider { status: u16, body: String },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Exchange an OAuth authorization code for a session.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, IdentityError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

// ---------------------------------------------------------------------------
// GoTrue client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GoTrueConfig {
    /// Base URL of the auth API, e.g. `https://project.example.co/auth/v1`.
    pub url: String,
    /// Public anon key sent in the `apikey` header.
    pub anon_key: String,
}

impl GoTrueConfig {
    /// Load from `AUTH_URL` and `AUTH_ANON_KEY`; both are required.
    pub fn from_env() -> Self {
        let url = std::env::var("AUTH_URL").expect("AUTH_URL must be set");
        let anon_key = std::env::var("AUTH_ANON_KEY").expect("AUTH_ANON_KEY must be set");
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }
}

pub struct GoTrueClient {
    client: reqwest::Client,
    config: GoTrueConfig,
}

impl GoTrueClient {
    pub fn new(config: GoTrueConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: GoTrueConfig) -> Self {
        Self { client, config }
    }

    async fn token(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, IdentityError> {
        let response = self
            .client
            .post(format!("{}/token", self.config.url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<AuthSession>().await?);
        }
        Err(classify_failure(status.as_u16(), response.text().await.unwrap_or_default()))
    }
}

/// 400/401/403/422 mean the grant was rejected; anything else is a
/// provider fault.
fn classify_failure(status: u16, body: String) -> IdentityError {
    match status {
        400 | 401 | 403 | 422 => IdentityError::InvalidCredentials,
        _ => IdentityError::Provider { status, body },
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        self.token(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, IdentityError> {
        self.token(
            "pkce",
            serde_json::json!({
                "auth_code": code,
                "code_verifier": code_verifier.unwrap_or_default(),
            }),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(format!("{}/logout", self.config.url))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(classify_failure(status.as_u16(), response.text().await.unwrap_or_default()))
        }
    }
}
