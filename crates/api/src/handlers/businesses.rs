//! Handlers for the `/businesses` resource.

use adstudio_core::error::CoreError;
use adstudio_core::gallery::clamp_limit;
use adstudio_core::site_url::normalize_url;
use adstudio_core::types::DbId;
use adstudio_core::webhook::WebhookKind;
use adstudio_db::models::business::{LinkedBusiness, NewBusiness, ROLE_MEMBER, ROLE_OWNER};
use adstudio_db::models::job::Job;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::handlers::generation::start_job;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /businesses/connect`.
#[derive(Debug, Deserialize)]
pub struct ConnectBusiness {
    pub url: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectedBusiness {
    pub business_id: DbId,
    pub job_id: DbId,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct UnlinkedBusiness {
    pub business_id: DbId,
    pub detached: bool,
    pub remaining_links: i64,
}

/// POST /api/v1/businesses/connect
///
/// Normalizes the URL, reuses or creates the business, links the caller and
/// starts a site-analysis job. The caller becomes `owner` when nobody else
/// holds a link.
pub async fn connect(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ConnectBusiness>,
) -> AppResult<(StatusCode, Json<DataResponse<ConnectedBusiness>>)> {
    let raw_url = input
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| CoreError::missing_field("url"))?;
    let url = normalize_url(&raw_url)?;
    let name = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    let (business, role) = match state.db.find_business_by_url(&url).await? {
        Some(existing) if existing.detached_at.is_none() => (existing, ROLE_MEMBER),
        Some(detached) => (detached, ROLE_OWNER),
        None => {
            let created = state
                .db
                .create_business(NewBusiness {
                    url: url.clone(),
                    name: name.clone(),
                    created_by: user.user_id,
                })
                .await?;
            tracing::info!(business_id = %created.id, url = %created.url, "Business created");
            (created, ROLE_OWNER)
        }
    };

    state.db.link_user(business.id, user.user_id, role).await?;

    let job = start_job(
        &state,
        user.user_id,
        business.id,
        WebhookKind::SiteAnalysis,
        json!({ "url": url, "name": name.or(business.name) }),
    )
    .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: ConnectedBusiness {
                business_id: business.id,
                job_id: job.id,
                url,
            },
        }),
    ))
}

/// GET /api/v1/businesses
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<LinkedBusiness>>>> {
    let businesses = state.db.list_businesses(user.user_id).await?;
    Ok(Json(DataResponse { data: businesses }))
}

/// DELETE /api/v1/businesses/{id}/link
///
/// Removes the caller's link. Removing the last link soft-deletes the
/// business.
pub async fn unlink(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<UnlinkedBusiness>>> {
    let business_id = parse_id(&id)?;
    let outcome = state
        .db
        .unlink_user(business_id, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Business", business_id))?;

    tracing::info!(
        %business_id,
        user_id = %user.user_id,
        detached = outcome.detached,
        remaining_links = outcome.remaining_links,
        "Business link removed",
    );

    Ok(Json(DataResponse {
        data: UnlinkedBusiness {
            business_id,
            detached: outcome.detached,
            remaining_links: outcome.remaining_links,
        },
    }))
}

/// GET /api/v1/businesses/{id}/jobs
///
/// Most recent jobs for a linked business, newest first.
pub async fn list_jobs(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Job>>>> {
    let business_id = parse_id(&id)?;
    if !state.db.is_linked(business_id, user.user_id).await? {
        return Err(CoreError::not_found("Business", business_id).into());
    }
    let jobs = state
        .db
        .list_jobs_for_business(user.user_id, business_id, clamp_limit(params.limit))
        .await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// Ids that are not UUIDs cannot exist, so they are reported as not found.
fn parse_id(id: &str) -> Result<DbId, CoreError> {
    id.parse().map_err(|_| CoreError::not_found("Business", id))
}
