//! Handlers for the `/generate` resource.
//!
//! Job-backed kinds create a job row, fire the workflow detached and answer
//! 202 immediately; the workflow reports back through the job callback.
//! Product-data and prompt-idea kinds wait for the workflow's answer.

use adstudio_automation::{call_with_timeout, dispatch_detached, AutomationError};
use adstudio_core::error::CoreError;
use adstudio_core::i18n::Message;
use adstudio_core::types::DbId;
use adstudio_core::webhook::{require_fields, WebhookKind};
use adstudio_db::models::job::{Job, NewJob};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, JobAccepted};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Job-backed routes
// ---------------------------------------------------------------------------

/// POST /api/v1/generate/site-analysis
pub async fn site_analysis(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<JobAccepted>>)> {
    start_generation(&state, &user, WebhookKind::SiteAnalysis, body).await
}

/// POST /api/v1/generate/video
pub async fn video(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<JobAccepted>>)> {
    start_generation(&state, &user, WebhookKind::VideoGeneration, body).await
}

/// POST /api/v1/generate/image
pub async fn image(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<JobAccepted>>)> {
    start_generation(&state, &user, WebhookKind::ImageGeneration, body).await
}

/// POST /api/v1/generate/social-content
pub async fn social_content(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<JobAccepted>>)> {
    start_generation(&state, &user, WebhookKind::SocialContent, body).await
}

// ---------------------------------------------------------------------------
// Synchronous routes
// ---------------------------------------------------------------------------

/// POST /api/v1/generate/product-data
///
/// Waits up to the synchronous window for the extracted product data.
pub async fn product_data(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<DataResponse<Value>>> {
    call_sync(&state, &user, WebhookKind::ProductData, body).await
}

/// POST /api/v1/generate/prompt-ideas
pub async fn prompt_ideas(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<DataResponse<Value>>> {
    call_sync(&state, &user, WebhookKind::PromptIdeas, body).await
}

// ---------------------------------------------------------------------------
// Shared flow
// ---------------------------------------------------------------------------

/// Validate, authorize and check configuration. Nothing leaves the process
/// before this succeeds.
async fn preflight(
    state: &AppState,
    user: &AuthUser,
    kind: WebhookKind,
    body: &Value,
) -> AppResult<DbId> {
    require_fields(body, kind.required_fields())?;
    let business_id = parse_business_id(body)?;

    if !state.db.is_linked(business_id, user.user_id).await? {
        return Err(CoreError::not_found("Business", business_id).into());
    }
    if !state.automation.is_configured(kind) {
        return Err(AutomationError::NotConfigured(kind).into());
    }
    Ok(business_id)
}

async fn start_generation(
    state: &AppState,
    user: &AuthUser,
    kind: WebhookKind,
    body: Value,
) -> AppResult<(StatusCode, Json<DataResponse<JobAccepted>>)> {
    let business_id = preflight(state, user, kind, &body).await?;
    let job = start_job(state, user.user_id, business_id, kind, body).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: JobAccepted {
                job_id: job.id,
                status: job.status,
            },
        }),
    ))
}

async fn call_sync(
    state: &AppState,
    user: &AuthUser,
    kind: WebhookKind,
    body: Value,
) -> AppResult<Json<DataResponse<Value>>> {
    let business_id = preflight(state, user, kind, &body).await?;

    let mut payload = into_object(body);
    payload.insert("user_id".into(), Value::String(user.user_id.to_string()));
    payload.insert("business_id".into(), Value::String(business_id.to_string()));

    tracing::info!(kind = %kind, user_id = %user.user_id, %business_id, "Calling workflow synchronously");
    let data = call_with_timeout(
        state.automation.as_ref(),
        kind,
        &Value::Object(payload),
        state.config.sync_webhook_timeout,
    )
    .await?;

    Ok(Json(DataResponse { data }))
}

/// Create a `processing` job and fire its workflow without waiting.
///
/// The outbound payload is the request plus `job_id`, `user_id`,
/// `business_id` and `callback_url`. A failed call marks the job failed
/// with the raw error text.
pub async fn start_job(
    state: &AppState,
    user_id: DbId,
    business_id: DbId,
    kind: WebhookKind,
    request: Value,
) -> AppResult<Job> {
    let job_type = kind.job_type().ok_or_else(|| {
        AppError::InternalError(format!("{kind} is not a job-backed workflow"))
    })?;

    let job = state
        .db
        .create_job(NewJob {
            user_id,
            business_id: Some(business_id),
            job_type,
            request_payload: request.clone(),
        })
        .await?;

    let mut payload = into_object(request);
    payload.insert("job_id".into(), Value::String(job.id.to_string()));
    payload.insert("user_id".into(), Value::String(user_id.to_string()));
    payload.insert("business_id".into(), Value::String(business_id.to_string()));
    payload.insert(
        "callback_url".into(),
        Value::String(state.config.job_callback_url(job.id)),
    );

    let db = state.db.clone();
    let job_id = job.id;
    dispatch_detached(
        state.automation.clone(),
        kind,
        Value::Object(payload),
        move |error| async move {
            if let Err(e) = db.fail_job(job_id, &error).await {
                tracing::error!(%job_id, error = %e, "Failed to mark job failed");
            }
        },
    );

    tracing::info!(job_id = %job.id, kind = %kind, %user_id, %business_id, "Job dispatched");
    Ok(job)
}

fn parse_business_id(body: &Value) -> Result<DbId, CoreError> {
    body.get("business_id")
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| CoreError::Validation(Message::InvalidField("business_id".into())))
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
