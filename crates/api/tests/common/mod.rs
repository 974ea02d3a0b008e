#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use adstudio_api::auth::jwt::{generate_access_token, JwtConfig, DEFAULT_AUDIENCE};
use adstudio_api::config::{ServerConfig, DEFAULT_DOWNLOAD_MAX_BYTES};
use adstudio_api::router::build_app_router;
use adstudio_api::state::AppState;
use adstudio_automation::testing::RecordingAutomation;
use adstudio_cloud::testing::{MemoryStorage, StaticIdentityProvider};
use adstudio_cloud::{FetchConfig, RemoteFetcher};
use adstudio_core::types::DbId;
use adstudio_db::memory::MemoryDatabase;
use adstudio_db::models::business::{NewBusiness, ROLE_OWNER};
use adstudio_db::BusinessStore;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_EMAIL: &str = "owner@studio.test";
pub const TEST_PASSWORD: &str = "correct-horse";
pub const TEST_AUTH_CODE: &str = "valid-code";
pub const MULTIPART_BOUNDARY: &str = "adstudio-test-boundary";

/// PNG signature followed by padding; enough for format sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://api.test".to_string(),
        site_url: "http://localhost:5173".to_string(),
        callback_secret: None,
        download_max_bytes: DEFAULT_DOWNLOAD_MAX_BYTES,
        sync_webhook_timeout: Duration::from_secs(5),
        jwt: JwtConfig {
            secret: "integration-test-secret-that-is-long-enough".to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        },
        fetch: FetchConfig::default(),
    }
}

/// `test_config` with the remote-fetch address guard off, so handlers can
/// reach servers started by [`serve_raw`] on 127.0.0.1.
pub fn local_fetch_config() -> ServerConfig {
    let mut config = test_config();
    config.fetch.allow_private_networks = true;
    config
}

/// The full router over in-memory collaborators, plus handles to inspect
/// them.
pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub db: Arc<MemoryDatabase>,
    pub storage: Arc<MemoryStorage>,
    pub identity: Arc<StaticIdentityProvider>,
    pub automation: Arc<RecordingAutomation>,
    pub user_id: DbId,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(test_config(), RecordingAutomation::new())
    }

    pub fn with_automation(automation: RecordingAutomation) -> Self {
        Self::build(test_config(), automation)
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self::build(config, RecordingAutomation::new())
    }

    pub fn build(config: ServerConfig, automation: RecordingAutomation) -> Self {
        let user_id = uuid::Uuid::new_v4();
        let db = Arc::new(MemoryDatabase::new());
        let storage = Arc::new(MemoryStorage::new());
        let identity = Arc::new(StaticIdentityProvider::new(
            TEST_EMAIL,
            TEST_PASSWORD,
            TEST_AUTH_CODE,
            user_id,
        ));
        let automation = Arc::new(automation);

        let state = AppState {
            db: db.clone(),
            storage: storage.clone(),
            identity: identity.clone(),
            automation: automation.clone(),
            fetcher: RemoteFetcher::new(&config.fetch),
            config: Arc::new(config.clone()),
        };
        let router = build_app_router(state, &config);

        Self {
            router,
            config,
            db,
            storage,
            identity,
            automation,
            user_id,
        }
    }

    /// Access token for the default test user.
    pub fn token(&self) -> String {
        self.token_for(self.user_id)
    }

    pub fn token_for(&self, user_id: DbId) -> String {
        generate_access_token(user_id, Some(TEST_EMAIL), 900, &self.config.jwt)
            .expect("token generation should succeed")
    }

    /// Create a business linked to `user_id` as owner.
    pub async fn linked_business(&self, user_id: DbId, url: &str) -> DbId {
        let business = self
            .db
            .create_business(NewBusiness {
                url: url.to_string(),
                name: None,
                created_by: user_id,
            })
            .await
            .expect("business creation should succeed");
        self.db
            .link_user(business.id, user_id, ROLE_OWNER)
            .await
            .expect("link should succeed");
        business.id
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(request(Method::GET, uri, None, Body::empty())).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response {
        self.send(request(Method::GET, uri, Some(token), Body::empty()))
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.send(json_request(Method::POST, uri, None, &body)).await
    }

    pub async fn post_json_auth(&self, uri: &str, body: serde_json::Value, token: &str) -> Response {
        self.send(json_request(Method::POST, uri, Some(token), &body))
            .await
    }

    pub async fn patch_json_auth(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> Response {
        self.send(json_request(Method::PATCH, uri, Some(token), &body))
            .await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response {
        self.send(request(Method::DELETE, uri, Some(token), Body::empty()))
            .await
    }

    /// POST a multipart form with one `file` part and optional text parts.
    pub async fn post_multipart_auth(
        &self,
        uri: &str,
        file: &[u8],
        content_type: &str,
        fields: &[(&str, &str)],
        token: &str,
    ) -> Response {
        let body = multipart_body(file, content_type, fields);
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn multipart_body(file: &[u8], content_type: &str, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `check` until it holds; detached webhook calls finish after the
/// response is returned.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 1s");
}

/// Serve `response` verbatim (status line, headers and body) to every
/// connection on an ephemeral 127.0.0.1 port, closing the socket after each
/// write. Returns the base URL.
pub async fn serve_raw(response: Vec<u8>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let response = Arc::new(response);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                // Drain the request head before answering.
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                // The client may hang up early on oversized bodies.
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// An HTTP/1.1 response with the given status, content type and body.
/// `Content-Length` is sent only when `with_length` is set; otherwise the
/// body runs until the connection closes.
pub fn raw_response(status: &str, content_type: &str, body: &[u8], with_length: bool) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nConnection: close\r\n");
    if with_length {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("\r\n");
    let mut out = head.into_bytes();
    out.extend_from_slice(body);
    out
}
