use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::models::image::ImageDimensions;

/// Kind of PII found on a document.
///
/// The set is open: the model may emit labels we have never seen, which
/// are kept verbatim as [`PiiCategory::Other`]. Known labels are normalized
/// so that "Aadhaar Number" and "national-ID number" compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PiiCategory {
    Name,
    DateOfBirth,
    Gender,
    NationalId,
    Photo,
    Email,
    Phone,
    Address,
    Other(String),
}

impl PiiCategory {
    pub fn parse(label: &str) -> Self {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "name" | "fullname" => Self::Name,
            "dateofbirth" | "yearofbirth" | "dob" | "birthdate" => Self::DateOfBirth,
            "gender" | "sex" => Self::Gender,
            "nationalid" | "nationalidnumber" | "aadhaar" | "aadhaarnumber" | "aadharnumber"
            | "idnumber" => Self::NationalId,
            "photo" | "face" | "portrait" => Self::Photo,
            "email" | "emailaddress" => Self::Email,
            "phone" | "phonenumber" | "mobile" | "mobilenumber" => Self::Phone,
            "address" => Self::Address,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Name => "Name",
            Self::DateOfBirth => "Date of Birth",
            Self::Gender => "Gender",
            Self::NationalId => "National ID Number",
            Self::Photo => "Photo",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::Other(label) => label,
        }
    }

    /// Photos are regions of imagery; everything else is printed text.
    pub fn is_textual(&self) -> bool {
        !matches!(self, Self::Photo)
    }
}

impl From<String> for PiiCategory {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<PiiCategory> for String {
    fn from(category: PiiCategory) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Axis-aligned rectangle in the pixel space of the full-resolution image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn is_finite(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|c| c.is_finite())
    }

    /// True when the rectangle encloses a positive area.
    pub fn is_well_formed(&self) -> bool {
        self.is_finite() && self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Clamp every coordinate into `[0, width] × [0, height]`.
    pub fn clamp_to(&self, dimensions: ImageDimensions) -> Self {
        let w = f64::from(dimensions.width);
        let h = f64::from(dimensions.height);
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }
}

/// A single piece of PII reported by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PiiDetection {
    #[serde(alias = "type")]
    #[ts(type = "string")]
    pub category: PiiCategory,
    /// Extracted text, or a sentinel such as `"face"` for a photo.
    pub value: String,
    #[serde(
        default,
        alias = "bounding_box",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub bounding_box: Option<BoundingBox>,
}

impl PiiDetection {
    pub fn new(category: PiiCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
            bounding_box: None,
        }
    }

    pub fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// The structured payload a detector model is asked to return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionPayload {
    #[serde(alias = "pii_elements")]
    pub pii_elements: Vec<PiiDetection>,
}

impl DetectionPayload {
    /// Parse the text reply of a model into a payload.
    ///
    /// Models that do not support constrained JSON output tend to wrap the
    /// object in a markdown fence or a sentence of prose, so only the
    /// outermost `{ ... }` span is parsed.
    pub fn from_model_text(text: &str) -> Result<Self, CoreError> {
        let trimmed = text.trim();
        let json = match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => {
                return Err(CoreError::SchemaViolation(
                    "response contains no JSON object".to_string(),
                ));
            }
        };

        serde_json::from_str(json).map_err(|e| CoreError::SchemaViolation(e.to_string()))
    }
}
