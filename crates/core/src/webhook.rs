//! Automation webhook kinds and payload rules.

use std::time::Duration;

use serde_json::Value;

use crate::error::CoreError;
use crate::job::JobType;

/// Abort window for webhook calls the handler waits on.
pub const SYNC_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(120);

/// Each external automation workflow the backend can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookKind {
    SiteAnalysis,
    ProductData,
    VideoGeneration,
    ImageGeneration,
    SocialContent,
    PromptIdeas,
}

impl WebhookKind {
    pub const ALL: [WebhookKind; 6] = [
        Self::SiteAnalysis,
        Self::ProductData,
        Self::VideoGeneration,
        Self::ImageGeneration,
        Self::SocialContent,
        Self::PromptIdeas,
    ];

    /// Environment variable holding the workflow's URL.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::SiteAnalysis => "WEBHOOK_SITE_ANALYSIS_URL",
            Self::ProductData => "WEBHOOK_PRODUCT_DATA_URL",
            Self::VideoGeneration => "WEBHOOK_VIDEO_GENERATION_URL",
            Self::ImageGeneration => "WEBHOOK_IMAGE_GENERATION_URL",
            Self::SocialContent => "WEBHOOK_SOCIAL_CONTENT_URL",
            Self::PromptIdeas => "WEBHOOK_PROMPT_IDEAS_URL",
        }
    }

    /// Human-readable name used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::SiteAnalysis => "site analysis",
            Self::ProductData => "product data",
            Self::VideoGeneration => "video generation",
            Self::ImageGeneration => "image generation",
            Self::SocialContent => "social content",
            Self::PromptIdeas => "prompt ideas",
        }
    }

    /// Synchronous kinds are awaited by the handler with
    /// [`SYNC_WEBHOOK_TIMEOUT`]; the rest are job-backed and detached.
    pub fn is_sync(self) -> bool {
        self.job_type().is_none()
    }

    pub fn job_type(self) -> Option<JobType> {
        match self {
            Self::SiteAnalysis => Some(JobType::SiteAnalysis),
            Self::VideoGeneration => Some(JobType::VideoGeneration),
            Self::ImageGeneration => Some(JobType::ImageGeneration),
            Self::SocialContent => Some(JobType::SocialContent),
            Self::ProductData | Self::PromptIdeas => None,
        }
    }

    /// Fields a request must carry before the workflow is called.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::SiteAnalysis => &["business_id"],
            Self::ProductData => &["business_id", "product_url"],
            Self::VideoGeneration => &["business_id", "prompt"],
            Self::ImageGeneration => &["business_id", "prompt"],
            Self::SocialContent => &["business_id", "platform", "topic"],
            Self::PromptIdeas => &["business_id", "product_type"],
        }
    }
}

impl std::fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fail on the first field that is absent, `null`, or a blank string.
///
/// A payload that is not a JSON object fails on its first required field.
pub fn require_fields(payload: &Value, fields: &[&str]) -> Result<(), CoreError> {
    for field in fields {
        let present = match payload.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(CoreError::missing_field(*field));
        }
    }
    Ok(())
}
