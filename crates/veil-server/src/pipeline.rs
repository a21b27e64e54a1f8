//! Detection and masking, composed the way the HTTP routes need them.
//!
//! Every external call goes through the retry policy with a per-call
//! timeout. Detector output is sanitized before anything else sees it, and
//! a failed detection never proceeds to masking.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use veil_core::capability::{ImageRedactor, PiiDetector, ProviderError};
use veil_core::error::CoreError;
use veil_core::models::detection::PiiDetection;
use veil_core::models::image::{ImageData, ImageDimensions};
use veil_core::models::redaction::{RedactionPlan, RedactionStyle};
use veil_core::models::report::{DetectionReport, MASK_FAILED_MESSAGE, MaskStatus};
use veil_core::policy::{self, IdPrefixPolicy, PolicyFinding};
use veil_core::prompts;

use crate::config::Composition;
use crate::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("detection failed: {0}")]
    Detection(ProviderError),

    #[error("could not generate masked image: {0}")]
    Generation(ProviderError),
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub id_policy: IdPrefixPolicy,
    pub retry: RetryPolicy,
    pub call_timeout: Duration,
    pub max_upload_bytes: usize,
}

/// An uploaded image whose header has been checked.
#[derive(Debug, Clone)]
pub struct InspectedImage {
    pub image: ImageData,
    pub dimensions: ImageDimensions,
}

/// Result of the masking stage.
#[derive(Debug, Clone)]
pub enum Masked {
    /// Nothing to redact; the input image untouched.
    Unchanged(ImageData),
    /// A regenerated image from the redactor.
    Regenerated(ImageData),
}

impl Masked {
    pub fn image(&self) -> &ImageData {
        match self {
            Self::Unchanged(image) | Self::Regenerated(image) => image,
        }
    }

    pub fn is_regenerated(&self) -> bool {
        matches!(self, Self::Regenerated(_))
    }

    pub fn into_status(self) -> MaskStatus {
        match self {
            Self::Unchanged(image) => MaskStatus::Unchanged {
                masked_image: image.to_data_uri(),
            },
            Self::Regenerated(image) => MaskStatus::Masked {
                masked_image: image.to_data_uri(),
            },
        }
    }
}

/// Masking result plus the corrections made to the detections it was given.
#[derive(Debug, Clone)]
pub struct MaskOutput {
    pub masked: Masked,
    pub findings: Vec<PolicyFinding>,
}

/// Detection report plus the masking outcome. Masking failures are carried
/// in `mask` so the detections are never lost.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub report: DetectionReport,
    pub mask: MaskStatus,
}

pub struct Pipeline {
    detector: Arc<dyn PiiDetector>,
    redactor: Arc<dyn ImageRedactor>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn PiiDetector>,
        redactor: Arc<dyn ImageRedactor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            detector,
            redactor,
            settings,
        }
    }

    pub fn detector(&self) -> &dyn PiiDetector {
        self.detector.as_ref()
    }

    pub fn redactor(&self) -> &dyn ImageRedactor {
        self.redactor.as_ref()
    }

    /// Parse a data URI and check the image before any external call.
    pub fn inspect(&self, data_uri: &str) -> Result<InspectedImage, PipelineError> {
        let image = ImageData::from_data_uri(data_uri)?;
        if image.bytes.len() > self.settings.max_upload_bytes {
            return Err(PipelineError::TooLarge {
                size: image.bytes.len(),
                limit: self.settings.max_upload_bytes,
            });
        }
        let metadata = image.inspect()?;
        Ok(InspectedImage {
            image,
            dimensions: metadata.dimensions,
        })
    }

    pub async fn detect(
        &self,
        request_id: Uuid,
        input: &InspectedImage,
    ) -> Result<DetectionReport, PipelineError> {
        let prompt = prompts::detection_prompt(input.dimensions, &self.settings.id_policy);

        let raw = self
            .settings
            .retry
            .run("detect", self.settings.call_timeout, || {
                self.detector.detect(&input.image, &prompt)
            })
            .await
            .map_err(|e| {
                warn!(%request_id, provider = self.detector.provider_name(), error = %e, "detection failed");
                PipelineError::Detection(e)
            })?;

        let returned = raw.len();
        let sanitized = policy::sanitize(raw, input.dimensions, &self.settings.id_policy);
        log_findings(request_id, "detect", &sanitized.findings);

        let report = DetectionReport::new(
            request_id,
            input.dimensions,
            sanitized.detections,
            sanitized.findings,
        );

        info!(
            %request_id,
            provider = self.detector.provider_name(),
            model = self.detector.model_id(),
            returned,
            kept = report.pii_elements.len(),
            overlays = report.overlays.len(),
            "detection complete"
        );

        Ok(report)
    }

    /// Redact `detections` from the image. Detections from outside the
    /// pipeline are sanitized again, which leaves already-sanitized lists
    /// unchanged.
    pub async fn mask(
        &self,
        request_id: Uuid,
        input: &InspectedImage,
        detections: &[PiiDetection],
        style: RedactionStyle,
    ) -> Result<MaskOutput, PipelineError> {
        let sanitized = policy::sanitize(
            detections.to_vec(),
            input.dimensions,
            &self.settings.id_policy,
        );
        log_findings(request_id, "mask", &sanitized.findings);
        let plan = RedactionPlan::build(&sanitized.detections, style, &self.settings.id_policy);

        let Some(prompt) = prompts::redaction_prompt(&plan) else {
            info!(%request_id, detections = detections.len(), "nothing to redact, returning original image");
            return Ok(MaskOutput {
                masked: Masked::Unchanged(input.image.clone()),
                findings: sanitized.findings,
            });
        };

        let output = self
            .settings
            .retry
            .run("redact", self.settings.call_timeout, || {
                self.redactor.redact(&input.image, &prompt)
            })
            .await
            .map_err(|e| {
                warn!(%request_id, provider = self.redactor.provider_name(), error = %e, "redaction failed");
                PipelineError::Generation(e)
            })?;

        if let Err(e) = output.inspect() {
            warn!(%request_id, error = %e, "redactor returned an unusable image");
            return Err(PipelineError::Generation(ProviderError::NoImage(
                e.to_string(),
            )));
        }

        info!(
            %request_id,
            provider = self.redactor.provider_name(),
            model = self.redactor.model_id(),
            regions = plan.len(),
            ?style,
            output_bytes = output.bytes.len(),
            "masked image generated"
        );

        Ok(MaskOutput {
            masked: Masked::Regenerated(output),
            findings: sanitized.findings,
        })
    }

    /// Detect, then mask. Detection failure fails the whole call; a masking
    /// failure only marks the mask as failed.
    pub async fn process(
        &self,
        request_id: Uuid,
        input: &InspectedImage,
        style: RedactionStyle,
        composition: Composition,
    ) -> Result<ProcessOutcome, PipelineError> {
        match composition {
            Composition::Sequential => {
                let report = self.detect(request_id, input).await?;
                let mask = self
                    .mask(request_id, input, &report.pii_elements, style)
                    .await;
                Ok(ProcessOutcome {
                    report,
                    mask: mask_status(request_id, mask),
                })
            }
            Composition::Concurrent => {
                let masking = async {
                    let own = self.detect(request_id, input).await?;
                    self.mask(request_id, input, &own.pii_elements, style).await
                };
                let (report, mask) = tokio::join!(self.detect(request_id, input), masking);
                Ok(ProcessOutcome {
                    report: report?,
                    mask: mask_status(request_id, mask),
                })
            }
        }
    }
}

fn log_findings(request_id: Uuid, stage: &'static str, findings: &[PolicyFinding]) {
    for finding in findings {
        info!(%request_id, stage, index = finding.index, kind = ?finding.kind, "detection corrected");
    }
}

fn mask_status(request_id: Uuid, result: Result<MaskOutput, PipelineError>) -> MaskStatus {
    match result {
        Ok(output) => output.masked.into_status(),
        Err(e) => {
            warn!(%request_id, error = %e, "masking failed, keeping detections");
            MaskStatus::Failed {
                message: MASK_FAILED_MESSAGE.to_string(),
            }
        }
    }
}
