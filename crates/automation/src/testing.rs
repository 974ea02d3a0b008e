//! Recording stand-in for the automation workflows.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use adstudio_core::webhook::WebhookKind;
use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Automation, AutomationError};

/// Records every call and answers with a canned response or failure.
pub struct RecordingAutomation {
    calls: Mutex<Vec<(WebhookKind, Value)>>,
    response: Value,
    failure: Option<String>,
    delay: Option<Duration>,
    unconfigured: HashSet<WebhookKind>,
}

impl Default for RecordingAutomation {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response: serde_json::json!({ "accepted": true }),
            failure: None,
            delay: None,
            unconfigured: HashSet::new(),
        }
    }
}

impl RecordingAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with HTTP 500 and `body`.
    pub fn failing(body: &str) -> Self {
        Self {
            failure: Some(body.to_string()),
            ..Self::default()
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = response;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn without(mut self, kind: WebhookKind) -> Self {
        self.unconfigured.insert(kind);
        self
    }

    pub fn calls(&self) -> Vec<(WebhookKind, Value)> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl Automation for RecordingAutomation {
    fn is_configured(&self, kind: WebhookKind) -> bool {
        !self.unconfigured.contains(&kind)
    }

    async fn call(&self, kind: WebhookKind, payload: &Value) -> Result<Value, AutomationError> {
        if !self.is_configured(kind) {
            return Err(AutomationError::NotConfigured(kind));
        }
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((kind, payload.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(body) => Err(AutomationError::HttpStatus {
                status: 500,
                body: body.clone(),
            }),
            None => Ok(self.response.clone()),
        }
    }
}
