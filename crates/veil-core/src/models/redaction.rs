use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::models::detection::{BoundingBox, PiiCategory, PiiDetection};
use crate::policy::IdPrefixPolicy;

/// Gaussian blur strength requested for photos.
pub const PHOTO_BLUR_RADIUS_PX: u32 = 12;

/// How detected PII should be removed from the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RedactionStyle {
    /// Solid black rectangles over every located detection.
    Mask,
    /// Photos blurred, text replaced by styled placeholders, gender kept.
    #[default]
    Redact,
}

impl FromStr for RedactionStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mask" => Ok(Self::Mask),
            "redact" => Ok(Self::Redact),
            other => Err(CoreError::InvalidSetting {
                field: "redaction style",
                value: other.to_string(),
            }),
        }
    }
}

/// What to do with one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Treatment {
    OpaqueFill,
    Blur { radius_px: u32 },
    Placeholder {
        original: String,
        replacement: String,
        /// The value is only a prefix of a longer printed number whose tail
        /// must stay visible.
        prefix_only: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRedaction {
    pub category: PiiCategory,
    pub bounding_box: BoundingBox,
    pub treatment: Treatment,
}

/// The regions an image redactor is asked to change.
///
/// An empty plan means the image must be returned untouched without
/// calling the redactor at all.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionPlan {
    pub style: RedactionStyle,
    pub items: Vec<PlannedRedaction>,
}

impl RedactionPlan {
    pub fn build(
        detections: &[PiiDetection],
        style: RedactionStyle,
        id_policy: &IdPrefixPolicy,
    ) -> Self {
        let items = detections
            .iter()
            .filter_map(|d| {
                let bounding_box = d.bounding_box.filter(BoundingBox::is_well_formed)?;
                let treatment = treatment_for(d, style, id_policy)?;
                Some(PlannedRedaction {
                    category: d.category.clone(),
                    bounding_box,
                    treatment,
                })
            })
            .collect();

        Self { style, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// `None` means the detection is deliberately left as it is.
///
/// A national ID is only acted on when its value is exactly the policy
/// prefix. Anything shorter may be a partial read or the visible tail of an
/// already masked number, so it is reported but never overwritten.
fn treatment_for(
    detection: &PiiDetection,
    style: RedactionStyle,
    id_policy: &IdPrefixPolicy,
) -> Option<Treatment> {
    if detection.category == PiiCategory::NationalId && !is_full_prefix(&detection.value, id_policy)
    {
        return None;
    }

    if style == RedactionStyle::Mask {
        return Some(Treatment::OpaqueFill);
    }

    let (replacement, prefix_only) = match &detection.category {
        PiiCategory::Photo => {
            return Some(Treatment::Blur {
                radius_px: PHOTO_BLUR_RADIUS_PX,
            });
        }
        PiiCategory::Gender => return None,
        PiiCategory::NationalId => (
            grouped_placeholder(id_policy.prefix_digits, id_policy.group_size),
            true,
        ),
        _ => (placeholder_for(&detection.value), false),
    };

    if replacement.is_empty() {
        return Some(Treatment::OpaqueFill);
    }

    Some(Treatment::Placeholder {
        original: detection.value.clone(),
        replacement,
        prefix_only,
    })
}

fn is_full_prefix(value: &str, id_policy: &IdPrefixPolicy) -> bool {
    value.len() == id_policy.prefix_digits && value.chars().all(|c| c.is_ascii_digit())
}

/// Replace every visible character with `X`, keeping whitespace where it is.
pub fn placeholder_for(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { c } else { 'X' })
        .collect()
}

/// `XXXX XXXX` for an 8-digit prefix printed in groups of 4.
pub fn grouped_placeholder(digits: usize, group_size: usize) -> String {
    let group_size = group_size.max(1);
    let mut out = String::with_capacity(digits + digits / group_size);
    for i in 0..digits {
        if i > 0 && i % group_size == 0 {
            out.push(' ');
        }
        out.push('X');
    }
    out
}
