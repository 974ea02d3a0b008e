use adstudio_automation::AutomationError;
use adstudio_cloud::{FetchError, IdentityError, StorageError};
use adstudio_core::error::CoreError;
use adstudio_core::i18n::{Locale, Message};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors plus the collaborator errors, and
/// implements [`IntoResponse`] to produce consistent JSON error bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `adstudio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Automation(#[from] AutomationError),

    /// A bad request with a catalog message.
    #[error("Bad request: {0}")]
    BadRequest(Message),

    /// An internal error; the detail is logged, never returned.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Error details attached to the response so the locale middleware can
/// re-render the body in the caller's language.
#[derive(Debug, Clone)]
pub struct LocalizedError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: Message,
}

impl LocalizedError {
    pub fn body(&self, locale: Locale) -> serde_json::Value {
        json!({
            "error": self.message.text(locale),
            "code": self.code,
        })
    }
}

impl AppError {
    /// Classify into status, machine-readable code, and catalog message.
    pub fn classify(&self) -> LocalizedError {
        let (status, code, message) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id = %id, "Entity not found");
                    (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        Message::NotFound((*entity).to_string()),
                    )
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Collaborators ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Object storage error");
                upstream_failure()
            }
            AppError::Identity(IdentityError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                Message::InvalidCredentials,
            ),
            AppError::Identity(err) => {
                tracing::error!(error = %err, "Identity provider error");
                upstream_failure()
            }
            AppError::Fetch(FetchError::UnsupportedUrl) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", Message::InvalidUrl)
            }
            AppError::Fetch(FetchError::BlockedAddress(addr)) => {
                tracing::warn!(addr = %addr, "Remote fetch to non-public address refused");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", Message::UrlNotAllowed)
            }
            AppError::Fetch(FetchError::TooLarge { max_bytes }) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                Message::FileTooLarge {
                    max_bytes: *max_bytes,
                },
            ),
            AppError::Fetch(err) => {
                tracing::warn!(error = %err, "Remote fetch failed");
                upstream_failure()
            }
            AppError::Automation(AutomationError::Timeout(_)) => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                Message::UpstreamTimeout,
            ),
            AppError::Automation(AutomationError::NotConfigured(kind)) => {
                tracing::error!(kind = %kind, env_var = kind.env_var(), "Webhook URL not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "WEBHOOK_NOT_CONFIGURED",
                    Message::WebhookNotConfigured(kind.label().to_string()),
                )
            }
            AppError::Automation(err) => {
                tracing::error!(error = %err, "Automation webhook error");
                upstream_failure()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        LocalizedError {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let localized = self.classify();
        let body = localized.body(Locale::En);
        let mut response = (localized.status, axum::Json(body)).into_response();
        response.extensions_mut().insert(localized);
        response
    }
}

fn internal() -> (StatusCode, &'static str, Message) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        Message::Internal,
    )
}

fn upstream_failure() -> (StatusCode, &'static str, Message) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "UPSTREAM_ERROR",
        Message::UpstreamFailure,
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, Message) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            Message::NotFound("Resource".into()),
        ),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            tracing::warn!(constraint, "Unique constraint violation");
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                Message::Detail(format!("Duplicate value violates unique constraint: {constraint}")),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
