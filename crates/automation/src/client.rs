//! HTTP client for the automation webhooks.
//!
//! [`HttpAutomation`] POSTs a JSON payload to the workflow URL configured
//! for a [`WebhookKind`]. There is no retry and no client-level timeout:
//! detached calls run until the workflow answers, and synchronous callers
//! bound the wait themselves.

use std::time::Duration;

use adstudio_core::webhook::WebhookKind;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::WebhookUrls;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// No URL is configured for the workflow.
    #[error("No webhook URL configured for {0}")]
    NotConfigured(WebhookKind),

    /// The underlying HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The workflow returned a non-2xx status code.
    #[error("Webhook returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A synchronous call exceeded its abort window.
    #[error("Webhook did not respond within {0:?}")]
    Timeout(Duration),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Automation: Send + Sync {
    /// Whether a URL is configured for `kind`.
    fn is_configured(&self, kind: WebhookKind) -> bool;

    /// POST `payload` to the workflow and return its JSON answer.
    async fn call(&self, kind: WebhookKind, payload: &Value) -> Result<Value, AutomationError>;
}

// ---------------------------------------------------------------------------
// HttpAutomation
// ---------------------------------------------------------------------------

pub struct HttpAutomation {
    client: reqwest::Client,
    urls: WebhookUrls,
}

impl HttpAutomation {
    pub fn new(urls: WebhookUrls) -> Self {
        Self::with_client(reqwest::Client::new(), urls)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, urls: WebhookUrls) -> Self {
        Self { client, urls }
    }
}

#[async_trait]
impl Automation for HttpAutomation {
    fn is_configured(&self, kind: WebhookKind) -> bool {
        self.urls.get(kind).is_some()
    }

    async fn call(&self, kind: WebhookKind, payload: &Value) -> Result<Value, AutomationError> {
        let url = self.urls.get(kind).ok_or(AutomationError::NotConfigured(kind))?;

        tracing::debug!(kind = %kind, url, "Calling automation webhook");
        let response = self.client.post(url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AutomationError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(parse_body(&body))
    }
}

/// Empty bodies become `null`; anything that is not JSON is wrapped as
/// `{"raw": <text>}`.
pub fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::json!({ "raw": body }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body(r#"{"ok":true}"#), serde_json::json!({"ok": true}));
        assert_eq!(parse_body("Accepted"), serde_json::json!({"raw": "Accepted"}));
    }

    #[tokio::test]
    async fn unconfigured_kind_fails_without_request() {
        let automation = HttpAutomation::new(WebhookUrls::default());
        assert!(!automation.is_configured(WebhookKind::VideoGeneration));
        assert_matches!(
            automation.call(WebhookKind::VideoGeneration, &Value::Null).await,
            Err(AutomationError::NotConfigured(WebhookKind::VideoGeneration))
        );
    }

    #[test]
    fn error_display_http_status() {
        let err = AutomationError::HttpStatus {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Webhook returned HTTP 502: bad gateway");
    }

    #[test]
    fn error_display_request() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = AutomationError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
