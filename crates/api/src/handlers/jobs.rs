//! Handlers for the `/jobs` resource: status polling and workflow callbacks.

use adstudio_core::error::CoreError;
use adstudio_core::i18n::Message;
use adstudio_core::signature::{verify_callback_signature, SIGNATURE_HEADER};
use adstudio_core::types::DbId;
use adstudio_db::models::job::{Job, JobCallback};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/jobs/{id}
///
/// Jobs belonging to another user are indistinguishable from missing ones.
pub async fn get_job(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job_id = parse_job_id(&id)?;
    let job = state
        .db
        .find_job(job_id)
        .await?
        .filter(|job| job.user_id == user.user_id)
        .ok_or_else(|| CoreError::not_found("Job", job_id))?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/callback
///
/// Called by the automation platform, not by users. When a callback secret
/// is configured the raw body must carry a valid `x-signature`.
pub async fn callback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<Job>>> {
    if let Some(secret) = state.config.callback_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_callback_signature(secret, &body, signature) {
            tracing::warn!(job_id = %id, "Rejected job callback with bad signature");
            return Err(CoreError::Unauthorized(Message::InvalidCallbackSignature).into());
        }
    }

    let job_id = parse_job_id(&id)?;
    let update: JobCallback = serde_json::from_slice(&body)
        .map_err(|e| CoreError::Validation(Message::Detail(format!("Invalid callback body: {e}"))))?;
    let status = update.status;

    let job = state
        .db
        .apply_job_callback(job_id, update)
        .await?
        .ok_or_else(|| CoreError::not_found("Job", job_id))?;

    tracing::info!(%job_id, status = ?status, "Job callback applied");
    Ok(Json(DataResponse { data: job }))
}

fn parse_job_id(id: &str) -> Result<DbId, CoreError> {
    id.parse().map_err(|_| CoreError::not_found("Job", id))
}
