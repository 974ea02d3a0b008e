//! Automation job rows.

use adstudio_core::job::{CallbackStatus, JobStatus, JobType};
use adstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub user_id: DbId,
    pub business_id: Option<DbId>,
    pub product: String,
    #[sqlx(try_from = "String")]
    pub job_type: JobType,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub request_payload: serde_json::Value,
    pub result_payload: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Insert DTO. New jobs always start as `processing`.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: DbId,
    pub business_id: Option<DbId>,
    pub job_type: JobType,
    pub request_payload: serde_json::Value,
}

/// Body of `POST /api/v1/jobs/{id}/callback`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobCallback {
    pub status: CallbackStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}
