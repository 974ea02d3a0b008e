//! Handlers for the `/auth` resource (sign-in, OAuth callback, sign-out).

use adstudio_cloud::AuthSession;
use adstudio_core::error::CoreError;
use adstudio_core::i18n::Message;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;
use validator::ValidateEmail;

use crate::auth::cookies::{
    append_cookies, cleared_session_cookies, cleared_verifier_cookie, find_cookie,
    session_cookies, VERIFIER_COOKIE,
};
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::access_token;
use crate::state::AppState;

/// Front-end page shown when an OAuth code cannot be exchanged.
pub const AUTH_ERROR_PATH: &str = "/auth/auth-code-error";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/sign-in`.
///
/// Fields are optional so a missing one is reported by name instead of as
/// a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Query string of `GET /auth/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub next: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/sign-in
///
/// Password sign-in through the identity provider. The session is returned
/// in the body and mirrored into HTTP-only cookies.
pub async fn sign_in(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SignInRequest>,
) -> AppResult<(HeaderMap, Json<AuthSession>)> {
    let email = required(input.email, "email")?;
    let password = input
        .password
        .filter(|p| !p.is_empty())
        .ok_or(CoreError::missing_field("password"))?;

    if !email.validate_email() {
        return Err(AppError::Core(CoreError::Validation(Message::InvalidEmail)));
    }

    let session = state
        .identity
        .sign_in_with_password(&email, &password)
        .await?;

    state
        .db
        .upsert_profile(session.user.id, session.user.email.clone())
        .await?;

    tracing::info!(user_id = %session.user.id, "User signed in");

    let mut headers = HeaderMap::new();
    append_cookies(
        &mut headers,
        session_cookies(&session, state.config.secure_cookies()),
    );
    Ok((headers, Json(session)))
}

/// GET /api/v1/auth/callback
///
/// Exchange an OAuth authorization code and redirect back to the front end.
/// Every outcome is a redirect; failures land on [`AUTH_ERROR_PATH`].
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> (HeaderMap, Redirect) {
    let site_url = &state.config.site_url;
    let secure = state.config.secure_cookies();
    let mut response_headers = HeaderMap::new();

    let Some(code) = params.code.filter(|c| !c.trim().is_empty()) else {
        tracing::warn!("OAuth callback without a code");
        return (
            response_headers,
            Redirect::to(&format!("{site_url}{AUTH_ERROR_PATH}")),
        );
    };

    let verifier = find_cookie(&headers, VERIFIER_COOKIE);
    match state.identity.exchange_code(&code, verifier.as_deref()).await {
        Ok(session) => {
            if let Err(e) = state
                .db
                .upsert_profile(session.user.id, session.user.email.clone())
                .await
            {
                tracing::error!(user_id = %session.user.id, error = %e, "Failed to create profile");
            }
            append_cookies(&mut response_headers, session_cookies(&session, secure));
            append_cookies(&mut response_headers, [cleared_verifier_cookie(secure)]);

            let next = safe_next_path(params.next.as_deref());
            tracing::info!(user_id = %session.user.id, next, "OAuth sign-in completed");
            (
                response_headers,
                Redirect::to(&format!("{site_url}{next}")),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            append_cookies(&mut response_headers, [cleared_verifier_cookie(secure)]);
            (
                response_headers,
                Redirect::to(&format!("{site_url}{AUTH_ERROR_PATH}")),
            )
        }
    }
}

/// POST /api/v1/auth/sign-out
///
/// Revokes the provider session when a token is present, then clears the
/// cookies. Provider failures are logged and ignored.
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap) {
    if let Some(token) = access_token(&headers) {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!(error = %e, "Provider sign-out failed");
        }
    }

    let mut response_headers = HeaderMap::new();
    append_cookies(
        &mut response_headers,
        cleared_session_cookies(state.config.secure_cookies()),
    );
    (StatusCode::NO_CONTENT, response_headers)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required(value: Option<String>, field: &str) -> Result<String, CoreError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::missing_field(field))
}

/// Only same-site absolute paths are followed; anything else becomes `/`.
///
/// Control characters are refused because they cannot go into a
/// `Location` header.
pub fn safe_next_path(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}
