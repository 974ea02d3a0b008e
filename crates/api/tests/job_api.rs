//! HTTP-level tests for job polling and workflow callbacks.

mod common;

use adstudio_core::job::{JobStatus, JobType};
use adstudio_core::signature::{compute_callback_hmac, SIGNATURE_HEADER};
use adstudio_core::types::DbId;
use adstudio_db::models::job::{Job, NewJob};
use adstudio_db::JobStore;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, test_config, TestApp};
use serde_json::json;

async fn seed_job(app: &TestApp, user_id: DbId) -> Job {
    app.db
        .create_job(NewJob {
            user_id,
            business_id: None,
            job_type: JobType::VideoGeneration,
            request_payload: json!({ "prompt": "sunrise over the bay" }),
        })
        .await
        .unwrap()
}

fn callback_request(job_id: &str, body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/jobs/{job_id}/callback"))
        .header(CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_can_poll_job() {
    let app = TestApp::new();
    let job = seed_job(&app, app.user_id).await;

    let response = app
        .get_auth(&format!("/api/v1/jobs/{}", job.id), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "processing");
    assert_eq!(json["data"]["job_type"], "video_generation");
    assert_eq!(json["data"]["product"], "video");
}

#[tokio::test]
async fn unknown_job_is_404() {
    let app = TestApp::new();

    let response = app
        .get_auth(&format!("/api/v1/jobs/{}", uuid::Uuid::new_v4()), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Job not found");
}

#[tokio::test]
async fn malformed_job_id_is_404() {
    let app = TestApp::new();

    let response = app.get_auth("/api/v1/jobs/12345", &app.token()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn another_users_job_is_404() {
    let app = TestApp::new();
    let job = seed_job(&app, uuid::Uuid::new_v4()).await;

    let response = app
        .get_auth(&format!("/api/v1/jobs/{}", job.id), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn polling_requires_authentication() {
    let app = TestApp::new();
    let job = seed_job(&app, app.user_id).await;

    let response = app.get(&format!("/api/v1/jobs/{}", job.id)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_callback_overwrites_status_and_result() {
    let app = TestApp::new();
    let job = seed_job(&app, app.user_id).await;
    let body = json!({
        "status": "completed",
        "result": { "video_url": "https://cdn.test/v.mp4" }
    })
    .to_string();

    let response = app
        .send(callback_request(&job.id.to_string(), &body, None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.db.job(job.id).unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(
        stored.result_payload.unwrap()["video_url"],
        "https://cdn.test/v.mp4"
    );
    assert!(stored.completed_at.is_some());

    let polled = body_json(
        app.get_auth(&format!("/api/v1/jobs/{}", job.id), &app.token())
            .await,
    )
    .await;
    assert_eq!(polled["data"]["status"], "completed");
}

#[tokio::test]
async fn failed_callback_records_error() {
    let app = TestApp::new();
    let job = seed_job(&app, app.user_id).await;
    let body = json!({ "status": "failed", "error": "render farm offline" }).to_string();

    let response = app
        .send(callback_request(&job.id.to_string(), &body, None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.db.job(job.id).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error_message.as_deref(), Some("render farm offline"));
}

#[tokio::test]
async fn callback_for_unknown_job_is_404() {
    let app = TestApp::new();
    let body = json!({ "status": "completed" }).to_string();

    let response = app
        .send(callback_request(&uuid::Uuid::new_v4().to_string(), &body, None))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn callback_with_unknown_status_is_400() {
    let app = TestApp::new();
    let job = seed_job(&app, app.user_id).await;
    let body = json!({ "status": "pending" }).to_string();

    let response = app
        .send(callback_request(&job.id.to_string(), &body, None))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.db.job(job.id).unwrap().status, JobStatus::Processing);
}

#[tokio::test]
async fn signed_callbacks_are_enforced_when_secret_is_set() {
    let config = adstudio_api::config::ServerConfig {
        callback_secret: Some("callback-secret".into()),
        ..test_config()
    };
    let app = TestApp::with_config(config);
    let job = seed_job(&app, app.user_id).await;
    let body = json!({ "status": "completed" }).to_string();

    let unsigned = app
        .send(callback_request(&job.id.to_string(), &body, None))
        .await;
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let forged = app
        .send(callback_request(&job.id.to_string(), &body, Some("deadbeef")))
        .await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.db.job(job.id).unwrap().status, JobStatus::Processing);

    let signature = compute_callback_hmac("callback-secret", body.as_bytes());
    let signed = app
        .send(callback_request(&job.id.to_string(), &body, Some(&signature)))
        .await;
    assert_eq!(signed.status(), StatusCode::OK);
    assert_eq!(app.db.job(job.id).unwrap().status, JobStatus::Completed);
}
