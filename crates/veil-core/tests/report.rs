use uuid::Uuid;
use veil_core::models::detection::{BoundingBox, PiiCategory, PiiDetection};
use veil_core::models::image::ImageDimensions;
use veil_core::models::report::{DetectionReport, MaskStatus, NO_PII_MESSAGE, summarize};

const DIMS: ImageDimensions = ImageDimensions {
    width: 800,
    height: 600,
};

#[test]
fn empty_report_says_no_pii() {
    let report = DetectionReport::new(Uuid::new_v4(), DIMS, Vec::new(), Vec::new());
    assert!(report.overlays.is_empty());
    assert!(report.summary.is_empty());
    assert_eq!(report.message(), Some(NO_PII_MESSAGE));
}

#[test]
fn boxless_detection_is_summarized_without_overlay() {
    let report = DetectionReport::new(
        Uuid::new_v4(),
        DIMS,
        vec![PiiDetection::new(PiiCategory::Address, "12 MG Road")],
        Vec::new(),
    );

    assert!(report.overlays.is_empty());
    assert_eq!(report.summary.len(), 1);
    assert_eq!(report.summary[0].category, "Address");
    assert_eq!(report.summary[0].count, 1);
    assert_eq!(report.summary[0].located, 0);
    assert_eq!(report.message(), None);
}

#[test]
fn summary_groups_by_category_in_order() {
    let detections = vec![
        PiiDetection::new(PiiCategory::Phone, "1"),
        PiiDetection::new(PiiCategory::Name, "A").with_box(BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
        PiiDetection::new(PiiCategory::Phone, "2").with_box(BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
    ];

    let summary = summarize(&detections);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].category, "Phone");
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[0].located, 1);
    assert_eq!(summary[1].category, "Name");
}

#[test]
fn mask_status_is_tagged() {
    let failed = MaskStatus::Failed {
        message: "Could not generate masked image".to_string(),
    };
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["status"], "failed");

    let masked = MaskStatus::Masked {
        masked_image: "data:image/png;base64,AA==".to_string(),
    };
    let json = serde_json::to_value(&masked).unwrap();
    assert_eq!(json["status"], "masked");
    assert_eq!(json["maskedImage"], "data:image/png;base64,AA==");
}
