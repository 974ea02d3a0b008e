//! Job vocabulary: lifecycle statuses, job types, callback statuses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::i18n::Message;

/// Lifecycle status of an automation job.
///
/// Jobs are created as `Processing`; the external system moves them to a
/// terminal status through the callback route, or the dispatcher marks
/// them `Failed` when the outbound call errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed and failed jobs receive a `completed_at` timestamp.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(Message::InvalidField("status".into()))),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Statuses the external callback is allowed to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Processing,
    Completed,
    Failed,
}

impl From<CallbackStatus> for JobStatus {
    fn from(status: CallbackStatus) -> Self {
        match status {
            CallbackStatus::Processing => Self::Processing,
            CallbackStatus::Completed => Self::Completed,
            CallbackStatus::Failed => Self::Failed,
        }
    }
}

/// Kind of work a job row tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    SiteAnalysis,
    VideoGeneration,
    ImageGeneration,
    SocialContent,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SiteAnalysis => "site_analysis",
            Self::VideoGeneration => "video_generation",
            Self::ImageGeneration => "image_generation",
            Self::SocialContent => "social_content",
        }
    }

    /// Product label stored alongside the job.
    pub fn product(self) -> &'static str {
        match self {
            Self::SiteAnalysis => "business",
            Self::VideoGeneration => "video",
            Self::ImageGeneration => "image",
            Self::SocialContent => "social",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site_analysis" => Ok(Self::SiteAnalysis),
            "video_generation" => Ok(Self::VideoGeneration),
            "image_generation" => Ok(Self::ImageGeneration),
            "social_content" => Ok(Self::SocialContent),
            _ => Err(CoreError::Validation(Message::InvalidField("job_type".into()))),
        }
    }
}

impl TryFrom<String> for JobType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
