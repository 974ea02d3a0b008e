//! HTTP-level tests for connecting, listing and unlinking businesses.

mod common;

use adstudio_automation::testing::RecordingAutomation;
use adstudio_core::job::{JobStatus, JobType};
use adstudio_core::webhook::WebhookKind;
use adstudio_db::BusinessStore;
use axum::http::StatusCode;
use common::{body_json, eventually, TestApp};
use serde_json::json;

#[tokio::test]
async fn connect_normalizes_url_and_starts_site_analysis() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "HTTP://WWW.Example.com/", "name": "Example Co" }),
            &token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["url"], "https://example.com");

    let business_id: uuid::Uuid = json["data"]["business_id"].as_str().unwrap().parse().unwrap();
    let job_id: uuid::Uuid = json["data"]["job_id"].as_str().unwrap().parse().unwrap();

    let job = app.db.job(job_id).unwrap();
    assert_eq!(job.job_type, JobType::SiteAnalysis);
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.business_id, Some(business_id));

    eventually(|| app.automation.calls().len() == 1).await;
    let (kind, payload) = app.automation.calls().remove(0);
    assert_eq!(kind, WebhookKind::SiteAnalysis);
    assert_eq!(payload["url"], "https://example.com");
    assert_eq!(payload["job_id"], job_id.to_string());
    assert_eq!(
        payload["callback_url"],
        format!("http://api.test/api/v1/jobs/{job_id}/callback")
    );
}

#[tokio::test]
async fn same_site_from_two_users_shares_one_business() {
    let app = TestApp::new();
    let other = uuid::Uuid::new_v4();

    let first = body_json(
        app.post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "example.com" }),
            &app.token(),
        )
        .await,
    )
    .await;
    let second = body_json(
        app.post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "www.example.com/" }),
            &app.token_for(other),
        )
        .await,
    )
    .await;

    assert_eq!(first["data"]["business_id"], second["data"]["business_id"]);
    let business_id = first["data"]["business_id"].as_str().unwrap().parse().unwrap();
    assert_eq!(app.db.link_count(business_id), 2);

    let listed = body_json(app.get_auth("/api/v1/businesses", &app.token_for(other)).await).await;
    assert_eq!(listed["data"][0]["role"], "member");
}

#[tokio::test]
async fn connect_without_url_is_400_and_sends_nothing() {
    let app = TestApp::new();

    let response = app
        .post_json_auth("/api/v1/businesses/connect", json!({}), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required field: url");
    assert_eq!(app.db.job_count(), 0);
    assert!(app.automation.calls().is_empty());
}

#[tokio::test]
async fn connect_with_unparseable_url_is_400() {
    let app = TestApp::new();

    let response = app
        .post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "not a website" }),
            &app.token(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_site_analysis_marks_job_failed() {
    let app = TestApp::with_automation(RecordingAutomation::failing("scraper down"));

    let json = body_json(
        app.post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "example.com" }),
            &app.token(),
        )
        .await,
    )
    .await;
    let job_id = json["data"]["job_id"].as_str().unwrap().parse().unwrap();

    eventually(|| app.db.job(job_id).unwrap().status == JobStatus::Failed).await;
    let job = app.db.job(job_id).unwrap();
    assert!(job.error_message.unwrap().contains("scraper down"));
}

#[tokio::test]
async fn unconfigured_site_analysis_still_records_a_failed_job() {
    let app =
        TestApp::with_automation(RecordingAutomation::new().without(WebhookKind::SiteAnalysis));

    let response = app
        .post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "example.com" }),
            &app.token(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    let job_id = json["data"]["job_id"].as_str().unwrap().parse().unwrap();
    eventually(|| app.db.job(job_id).unwrap().status == JobStatus::Failed).await;
}

// ---------------------------------------------------------------------------
// Unlink / soft delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlinking_last_user_soft_deletes_business() {
    let app = TestApp::new();
    let business_id = app.linked_business(app.user_id, "https://solo.test").await;

    let response = app
        .delete_auth(&format!("/api/v1/businesses/{business_id}/link"), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["detached"], true);
    assert_eq!(json["data"]["remaining_links"], 0);
    assert!(app.db.business(business_id).unwrap().detached_at.is_some());

    let listed = body_json(app.get_auth("/api/v1/businesses", &app.token()).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unlinking_non_last_user_keeps_business() {
    let app = TestApp::new();
    let other = uuid::Uuid::new_v4();
    let business_id = app.linked_business(app.user_id, "https://shared.test").await;
    app.db.link_user(business_id, other, "member").await.unwrap();

    let response = app
        .delete_auth(&format!("/api/v1/businesses/{business_id}/link"), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["detached"], false);
    assert_eq!(json["data"]["remaining_links"], 1);
    assert!(app.db.business(business_id).unwrap().detached_at.is_none());
}

#[tokio::test]
async fn unlinking_without_a_link_is_404() {
    let app = TestApp::new();
    let business_id = app.linked_business(uuid::Uuid::new_v4(), "https://theirs.test").await;

    let response = app
        .delete_auth(&format!("/api/v1/businesses/{business_id}/link"), &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.db.link_count(business_id), 1);
}

#[tokio::test]
async fn unlinking_malformed_id_is_404() {
    let app = TestApp::new();

    let response = app
        .delete_auth("/api/v1/businesses/not-a-uuid/link", &app.token())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reconnecting_detached_business_restores_it() {
    let app = TestApp::new();
    let business_id = app.linked_business(app.user_id, "https://example.com").await;
    app.delete_auth(&format!("/api/v1/businesses/{business_id}/link"), &app.token())
        .await;

    let json = body_json(
        app.post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "example.com" }),
            &app.token(),
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["business_id"], business_id.to_string());
    assert!(app.db.business(business_id).unwrap().detached_at.is_none());
    let listed = body_json(app.get_auth("/api/v1/businesses", &app.token()).await).await;
    assert_eq!(listed["data"][0]["role"], "owner");
}

#[tokio::test]
async fn business_jobs_are_listed_for_linked_users_only() {
    let app = TestApp::new();
    let connected = body_json(
        app.post_json_auth(
            "/api/v1/businesses/connect",
            json!({ "url": "example.com" }),
            &app.token(),
        )
        .await,
    )
    .await;
    let business_id = connected["data"]["business_id"].as_str().unwrap();

    let mine = app
        .get_auth(&format!("/api/v1/businesses/{business_id}/jobs"), &app.token())
        .await;
    assert_eq!(mine.status(), StatusCode::OK);
    let json = body_json(mine).await;
    assert_eq!(json["data"][0]["job_type"], "site_analysis");

    let theirs = app
        .get_auth(
            &format!("/api/v1/businesses/{business_id}/jobs"),
            &app.token_for(uuid::Uuid::new_v4()),
        )
        .await;
    assert_eq!(theirs.status(), StatusCode::NOT_FOUND);
}
