//! Fire-and-forget and bounded-wait calling conventions.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use adstudio_core::webhook::WebhookKind;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::client::{Automation, AutomationError};

/// Call the workflow on a background task without awaiting it.
///
/// On error, `on_failure` receives the raw error string (used to mark the
/// job failed). Nothing retries, and the caller's request is not held
/// open. The handle is returned for tests; request handlers drop it.
pub fn dispatch_detached<F, Fut>(
    automation: Arc<dyn Automation>,
    kind: WebhookKind,
    payload: Value,
    on_failure: F,
) -> JoinHandle<()>
where
    F: FnOnce(String) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        match automation.call(kind, &payload).await {
            Ok(_) => tracing::info!(kind = %kind, "Automation webhook accepted"),
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Automation webhook failed");
                on_failure(e.to_string()).await;
            }
        }
    })
}

/// Await the workflow for at most `timeout`; the in-flight request is
/// dropped when the window closes.
pub async fn call_with_timeout(
    automation: &dyn Automation,
    kind: WebhookKind,
    payload: &Value,
    timeout: Duration,
) -> Result<Value, AutomationError> {
    match tokio::time::timeout(timeout, automation.call(kind, payload)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(kind = %kind, timeout_secs = timeout.as_secs_f64(), "Automation webhook timed out");
            Err(AutomationError::Timeout(timeout))
        }
    }
}
