//! HTTP-level tests for the saved-project gallery.

mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::{json, Value};

async fn save(app: &TestApp, token: &str, body: Value) -> Value {
    let response = app.post_json_auth("/api/v1/projects", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn titles(listing: &Value) -> Vec<String> {
    listing["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn saved_project_round_trips_through_the_gallery() {
    let app = TestApp::new();
    let token = app.token();

    let project = save(
        &app,
        &token,
        json!({
            "product_type": "video",
            "title": "Spring launch",
            "media_urls": ["https://cdn.test/v.mp4"],
            "parameters": { "prompt": "blossoms in slow motion" }
        }),
    )
    .await;
    assert_eq!(project["product_type"], "video");
    assert_eq!(project["is_favorite"], false);

    let id = project["id"].as_str().unwrap();
    let fetched = body_json(app.get_auth(&format!("/api/v1/projects/{id}"), &token).await).await;
    assert_eq!(fetched["data"]["title"], "Spring launch");
}

#[tokio::test]
async fn listing_filters_by_type_favorite_and_search() {
    let app = TestApp::new();
    let token = app.token();
    save(&app, &token, json!({ "product_type": "image", "title": "Beach poster" })).await;
    let video = save(
        &app,
        &token,
        json!({
            "product_type": "video",
            "title": "Teaser",
            "parameters": { "prompt": "Beach sunset drone shot" }
        }),
    )
    .await;
    save(&app, &token, json!({ "product_type": "social", "title": "Carousel" })).await;

    let videos =
        body_json(app.get_auth("/api/v1/projects?product_type=video", &token).await).await;
    assert_eq!(titles(&videos), vec!["Teaser"]);

    let mut beach =
        titles(&body_json(app.get_auth("/api/v1/projects?search=beach", &token).await).await);
    beach.sort();
    assert_eq!(beach, vec!["Beach poster", "Teaser"]);

    let id = video["id"].as_str().unwrap();
    let favorited = app
        .patch_json_auth(
            &format!("/api/v1/projects/{id}/favorite"),
            json!({ "is_favorite": true }),
            &token,
        )
        .await;
    assert_eq!(favorited.status(), StatusCode::OK);

    let favorites = body_json(app.get_auth("/api/v1/projects?favorites=true", &token).await).await;
    assert_eq!(titles(&favorites), vec!["Teaser"]);
}

#[tokio::test]
async fn listing_is_scoped_to_owner() {
    let app = TestApp::new();
    save(&app, &app.token(), json!({ "product_type": "image", "title": "Mine" })).await;

    let other = app.token_for(uuid::Uuid::new_v4());
    let listing = body_json(app.get_auth("/api/v1/projects", &other).await).await;

    assert!(listing["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn another_users_project_is_404() {
    let app = TestApp::new();
    let project = save(&app, &app.token(), json!({ "product_type": "image" })).await;
    let id = project["id"].as_str().unwrap();
    let other = app.token_for(uuid::Uuid::new_v4());

    let get = app.get_auth(&format!("/api/v1/projects/{id}"), &other).await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let patch = app
        .patch_json_auth(
            &format!("/api/v1/projects/{id}/favorite"),
            json!({ "is_favorite": true }),
            &other,
        )
        .await;
    assert_eq!(patch.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_400() {
    let app = TestApp::new();
    let token = app.token();

    let missing_type = app
        .post_json_auth("/api/v1/projects", json!({ "title": "x" }), &token)
        .await;
    assert_eq!(missing_type.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing_type).await["error"],
        "Missing required field: product_type"
    );

    let bad_type = app
        .post_json_auth("/api/v1/projects", json!({ "product_type": "podcast" }), &token)
        .await;
    assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);

    let bad_media = app
        .post_json_auth(
            "/api/v1/projects",
            json!({ "product_type": "image", "media_urls": ["javascript:alert(1)"] }),
            &token,
        )
        .await;
    assert_eq!(bad_media.status(), StatusCode::BAD_REQUEST);

    let bad_filter = app.get_auth("/api/v1/projects?sort=random", &token).await;
    assert_eq!(bad_filter.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn favorite_toggle_requires_flag() {
    let app = TestApp::new();
    let project = save(&app, &app.token(), json!({ "product_type": "social" })).await;
    let id = project["id"].as_str().unwrap();

    let response = app
        .patch_json_auth(
            &format!("/api/v1/projects/{id}/favorite"),
            json!({}),
            &app.token(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required field: is_favorite"
    );
}
