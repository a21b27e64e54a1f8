use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::models::detection::PiiDetection;
use crate::models::image::ImageDimensions;
use crate::models::overlay::{OverlayBox, compute_overlays};
use crate::policy::PolicyFinding;

pub const NO_PII_MESSAGE: &str = "No PII detected";
pub const MASK_FAILED_MESSAGE: &str = "Could not generate masked image";

/// Per-category counts for the badge list. Box-less detections are counted
/// here even though they never get an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    /// How many of `count` carry a usable bounding box.
    pub located: usize,
}

/// Categories in order of first appearance.
pub fn summarize(detections: &[PiiDetection]) -> Vec<CategorySummary> {
    let mut summary: Vec<CategorySummary> = Vec::new();

    for detection in detections {
        let label = detection.category.label();
        let located = usize::from(detection.bounding_box.is_some());
        match summary.iter_mut().find(|s| s.category == label) {
            Some(entry) => {
                entry.count += 1;
                entry.located += located;
            }
            None => summary.push(CategorySummary {
                category: label.to_string(),
                count: 1,
                located,
            }),
        }
    }

    summary
}

/// Everything the presentation layer needs about one detection run.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DetectionReport {
    pub request_id: Uuid,
    pub dimensions: ImageDimensions,
    pub pii_elements: Vec<PiiDetection>,
    pub overlays: Vec<OverlayBox>,
    pub summary: Vec<CategorySummary>,
    pub findings: Vec<PolicyFinding>,
    #[ts(type = "string")]
    pub processed_at: jiff::Timestamp,
}

impl DetectionReport {
    pub fn new(
        request_id: Uuid,
        dimensions: ImageDimensions,
        pii_elements: Vec<PiiDetection>,
        findings: Vec<PolicyFinding>,
    ) -> Self {
        let overlays = compute_overlays(dimensions, &pii_elements);
        let summary = summarize(&pii_elements);
        Self {
            request_id,
            dimensions,
            pii_elements,
            overlays,
            summary,
            findings,
            processed_at: jiff::Timestamp::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pii_elements.is_empty()
    }

    pub fn message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_PII_MESSAGE)
    }
}

/// Outcome of the masking stage as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum MaskStatus {
    /// A new image was generated. Regions outside the redactions are
    /// best-effort copies of the original, not pixel-exact.
    #[serde(rename_all = "camelCase")]
    Masked { masked_image: String },
    /// Nothing needed redacting; this is the uploaded image byte-for-byte.
    #[serde(rename_all = "camelCase")]
    Unchanged { masked_image: String },
    Failed { message: String },
}
