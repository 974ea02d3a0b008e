//! Repository for the `jobs` table.

use adstudio_core::job::JobStatus;
use adstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::job::{Job, JobCallback, NewJob};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, user_id, business_id, product, job_type, status, \
    request_payload, result_payload, error_message, \
    created_at, updated_at, completed_at";

pub struct JobRepo;

impl JobRepo {
    /// Insert a job in `processing` state and return the row.
    pub async fn create(pool: &PgPool, input: &NewJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (user_id, business_id, product, job_type, status, request_payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(input.user_id)
            .bind(input.business_id)
            .bind(input.job_type.product())
            .bind(input.job_type.as_str())
            .bind(JobStatus::Processing.as_str())
            .bind(&input.request_payload)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a job failed with the raw error string.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(JobStatus::Failed.as_str())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Overwrite status, result and error from an external callback.
    ///
    /// `completed_at` is set when the new status is terminal and cleared
    /// otherwise. Returns `None` when the job does not exist.
    pub async fn apply_callback(
        pool: &PgPool,
        id: DbId,
        callback: &JobCallback,
    ) -> Result<Option<Job>, sqlx::Error> {
        let status = JobStatus::from(callback.status);
        let query = format!(
            "UPDATE jobs \
             SET status = $2, result_payload = $3, error_message = $4, updated_at = NOW(), \
                 completed_at = CASE WHEN $5 THEN NOW() ELSE NULL END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(&callback.result)
            .bind(&callback.error)
            .bind(status.is_terminal())
            .fetch_optional(pool)
            .await
    }

    /// Most recent jobs a user started for one business.
    pub async fn list_for_business(
        pool: &PgPool,
        user_id: DbId,
        business_id: DbId,
        limit: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE user_id = $1 AND business_id = $2 \
             ORDER BY created_at DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(user_id)
            .bind(business_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
