//! Mapping of detection boxes onto a displayed image.
//!
//! The image may be rendered at any size, so boxes are expressed as
//! percentages of the natural dimensions. Natural dimensions are only known
//! once the image header has been read ([`ImageData::inspect`]); overlays are
//! always computed after that step, never guessed.
//!
//! [`ImageData::inspect`]: crate::models::image::ImageData::inspect

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::detection::{BoundingBox, PiiDetection};
use crate::models::image::ImageDimensions;

/// Position of an overlay, in percent of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OverlayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl OverlayRect {
    /// Returns `None` for boxes without area or images without dimensions.
    pub fn from_box(bounding_box: &BoundingBox, dimensions: ImageDimensions) -> Option<Self> {
        if dimensions.width == 0 || dimensions.height == 0 || !bounding_box.is_well_formed() {
            return None;
        }

        let w = f64::from(dimensions.width);
        let h = f64::from(dimensions.height);

        Some(Self {
            left: 100.0 * bounding_box.x1 / w,
            top: 100.0 * bounding_box.y1 / h,
            width: 100.0 * bounding_box.width() / w,
            height: 100.0 * bounding_box.height() / h,
        })
    }
}

/// An outline drawn over the image, with its hover label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OverlayBox {
    /// Index into the detection list this overlay belongs to.
    pub detection_index: usize,
    pub label: String,
    pub rect: OverlayRect,
}

pub fn compute_overlays(
    dimensions: ImageDimensions,
    detections: &[PiiDetection],
) -> Vec<OverlayBox> {
    detections
        .iter()
        .enumerate()
        .filter_map(|(index, detection)| {
            let rect = OverlayRect::from_box(detection.bounding_box.as_ref()?, dimensions)?;
            Some(OverlayBox {
                detection_index: index,
                label: detection.category.label().to_string(),
                rect,
            })
        })
        .collect()
}
