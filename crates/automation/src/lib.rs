//! Outbound calls to the external automation workflows.
//!
//! Job-backed workflows are fired with [`dispatch_detached`] and report
//! back through the job callback route; the synchronous ones are awaited
//! with [`call_with_timeout`].

pub mod client;
pub mod config;
pub mod dispatch;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use client::{Automation, AutomationError, HttpAutomation};
pub use config::WebhookUrls;
pub use dispatch::{call_with_timeout, dispatch_detached};
