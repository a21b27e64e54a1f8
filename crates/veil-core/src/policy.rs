//! Defensive validation of detector output.
//!
//! The detection model is not trusted to respect geometry or business
//! rules, so every list it returns goes through [`sanitize`] before any
//! overlay, summary, or redaction instruction is derived from it. Each
//! correction is reported as a [`PolicyFinding`] so that nothing changes
//! silently.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::models::detection::{PiiCategory, PiiDetection};
use crate::models::image::ImageDimensions;

/// Only the leading digits of a national ID are sensitive; the rest of the
/// number stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPrefixPolicy {
    /// How many leading digits are reported and redacted.
    pub prefix_digits: usize,
    /// Digits per printed group (`1234 5678 9012` has groups of 4).
    pub group_size: usize,
}

impl Default for IdPrefixPolicy {
    fn default() -> Self {
        Self {
            prefix_digits: 8,
            group_size: 4,
        }
    }
}

impl IdPrefixPolicy {
    pub fn new(prefix_digits: usize, group_size: usize) -> Result<Self, CoreError> {
        if prefix_digits == 0 {
            return Err(CoreError::InvalidSetting {
                field: "prefix_digits",
                value: prefix_digits.to_string(),
            });
        }
        if group_size == 0 {
            return Err(CoreError::InvalidSetting {
                field: "group_size",
                value: group_size.to_string(),
            });
        }
        Ok(Self {
            prefix_digits,
            group_size,
        })
    }
}

/// A correction or flag raised while sanitizing a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PolicyFinding {
    /// Position of the detection in the list the model returned.
    pub index: usize,
    pub kind: FindingKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum FindingKind {
    /// The box extended past the image and was clamped to its edges.
    BoxClamped,
    /// The box had no usable area and was removed from the detection.
    BoxRejected { reason: String },
    /// The model reported more digits than the prefix; value and box were cut.
    IdTruncated {
        found_digits: usize,
        kept_digits: usize,
    },
    /// The model reported fewer digits than the prefix.
    IdTooShort { expected: usize, found: usize },
    /// An identical detection was already in the list.
    Duplicate,
}

/// Detections that passed validation, plus everything that was changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sanitized {
    pub detections: Vec<PiiDetection>,
    pub findings: Vec<PolicyFinding>,
}

pub fn sanitize(
    detections: Vec<PiiDetection>,
    dimensions: ImageDimensions,
    policy: &IdPrefixPolicy,
) -> Sanitized {
    let mut out = Sanitized::default();

    for (index, mut detection) in detections.into_iter().enumerate() {
        detection.value = detection.value.trim().to_string();

        if let Some(kind) = sanitize_box(&mut detection, dimensions) {
            out.findings.push(PolicyFinding { index, kind });
        }

        if detection.category == PiiCategory::NationalId
            && let Some(kind) = apply_id_prefix(&mut detection, policy)
        {
            out.findings.push(PolicyFinding { index, kind });
        }

        if out.detections.contains(&detection) {
            out.findings.push(PolicyFinding {
                index,
                kind: FindingKind::Duplicate,
            });
            continue;
        }

        out.detections.push(detection);
    }

    out
}

fn sanitize_box(detection: &mut PiiDetection, dimensions: ImageDimensions) -> Option<FindingKind> {
    let original = detection.bounding_box?;

    if !original.is_finite() {
        detection.bounding_box = None;
        return Some(FindingKind::BoxRejected {
            reason: "non-finite coordinates".to_string(),
        });
    }

    let clamped = original.clamp_to(dimensions);
    if !clamped.is_well_formed() {
        detection.bounding_box = None;
        return Some(FindingKind::BoxRejected {
            reason: format!(
                "empty or inverted rectangle ({}, {}, {}, {})",
                original.x1, original.y1, original.x2, original.y2
            ),
        });
    }

    detection.bounding_box = Some(clamped);
    (clamped != original).then_some(FindingKind::BoxClamped)
}

/// Reduce a national ID to exactly `prefix_digits` digits.
///
/// When the model returned the whole number, the box is narrowed to the
/// share of the printed value that the kept digits occupy. Separators count
/// toward that share since they take up width on the card.
fn apply_id_prefix(detection: &mut PiiDetection, policy: &IdPrefixPolicy) -> Option<FindingKind> {
    let printed: Vec<char> = detection.value.chars().collect();
    let digits: String = printed.iter().filter(|c| c.is_ascii_digit()).collect();
    let found = digits.len();

    if found < policy.prefix_digits {
        if found > 0 {
            detection.value = digits;
        }
        return Some(FindingKind::IdTooShort {
            expected: policy.prefix_digits,
            found,
        });
    }

    detection.value = digits[..policy.prefix_digits].to_string();

    if found == policy.prefix_digits {
        return None;
    }

    let kept_chars = printed
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_digit())
        .nth(policy.prefix_digits - 1)
        .map(|(i, _)| i + 1)
        .unwrap_or(printed.len());

    if let Some(b) = detection.bounding_box.as_mut() {
        let share = kept_chars as f64 / printed.len() as f64;
        b.x2 = b.x1 + b.width() * share;
    }

    Some(FindingKind::IdTruncated {
        found_digits: found,
        kept_digits: policy.prefix_digits,
    })
}
