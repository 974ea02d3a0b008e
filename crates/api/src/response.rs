//! Shared response envelope types for API handlers.
//!
//! Success responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body of every job-backed generation route (202 Accepted).
#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub job_id: uuid::Uuid,
    pub status: adstudio_core::job::JobStatus,
}
