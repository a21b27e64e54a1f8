//! The two model capabilities the system is built on.
//!
//! Callers only see these traits, so the hosted provider behind detection
//! or redaction can be swapped (Gemini, Bedrock, a stub in tests) without
//! touching the pipeline.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::detection::PiiDetection;
use crate::models::image::ImageData;
use crate::prompts::{DetectionPrompt, RedactionPrompt};

/// Failure of an external model call, classified for retry decisions.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("response did not conform to expected schema: {0}")]
    SchemaViolation(String),

    #[error("no image in response: {0}")]
    NoImage(String),
}

impl ProviderError {
    /// Whether repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::RateLimited(_) | Self::Unavailable(_)
        )
    }
}

#[async_trait]
pub trait PiiDetector: Send + Sync {
    /// Locate PII in `image`. Returns an empty list, not an error, when
    /// nothing is found.
    async fn detect(
        &self,
        image: &ImageData,
        prompt: &DetectionPrompt,
    ) -> Result<Vec<PiiDetection>, ProviderError>;

    /// Provider name for logs, e.g. `"gemini"`.
    fn provider_name(&self) -> &str;

    fn model_id(&self) -> &str;
}

#[async_trait]
pub trait ImageRedactor: Send + Sync {
    /// Regenerate `image` following `prompt`.
    async fn redact(
        &self,
        image: &ImageData,
        prompt: &RedactionPrompt,
    ) -> Result<ImageData, ProviderError>;

    fn provider_name(&self) -> &str;

    fn model_id(&self) -> &str;
}
