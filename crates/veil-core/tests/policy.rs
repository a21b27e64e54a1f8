use veil_core::models::detection::{BoundingBox, PiiCategory, PiiDetection};
use veil_core::models::image::ImageDimensions;
use veil_core::policy::{FindingKind, IdPrefixPolicy, PolicyFinding, sanitize};

const DIMS: ImageDimensions = ImageDimensions {
    width: 1000,
    height: 500,
};

fn aadhaar(value: &str, bbox: Option<BoundingBox>) -> PiiDetection {
    PiiDetection {
        category: PiiCategory::NationalId,
        value: value.to_string(),
        bounding_box: bbox,
    }
}

#[test]
fn in_bounds_detections_pass_untouched() {
    let detection = PiiDetection::new(PiiCategory::Name, "Asha Verma")
        .with_box(BoundingBox::new(10.0, 10.0, 200.0, 40.0));

    let out = sanitize(vec![detection.clone()], DIMS, &IdPrefixPolicy::default());
    assert_eq!(out.detections, vec![detection]);
    assert!(out.findings.is_empty());
}

#[test]
fn boxes_are_clamped_into_the_image() {
    let detection = PiiDetection::new(PiiCategory::Photo, "face")
        .with_box(BoundingBox::new(-20.0, 300.0, 180.0, 640.0));

    let out = sanitize(vec![detection], DIMS, &IdPrefixPolicy::default());
    assert_eq!(
        out.detections[0].bounding_box,
        Some(BoundingBox::new(0.0, 300.0, 180.0, 500.0))
    );
    assert_eq!(
        out.findings,
        vec![PolicyFinding {
            index: 0,
            kind: FindingKind::BoxClamped
        }]
    );
}

#[test]
fn inverted_and_empty_boxes_are_rejected_but_detection_kept() {
    let detections = vec![
        PiiDetection::new(PiiCategory::Name, "Asha")
            .with_box(BoundingBox::new(300.0, 50.0, 100.0, 150.0)),
        PiiDetection::new(PiiCategory::Email, "asha@example.com")
            .with_box(BoundingBox::new(100.0, 50.0, 300.0, 50.0)),
        PiiDetection::new(PiiCategory::Phone, "98765 43210")
            .with_box(BoundingBox::new(1200.0, 50.0, 1300.0, 80.0)),
    ];

    let out = sanitize(detections, DIMS, &IdPrefixPolicy::default());
    assert_eq!(out.detections.len(), 3);
    assert!(out.detections.iter().all(|d| d.bounding_box.is_none()));
    assert_eq!(out.findings.len(), 3);
    assert!(
        out.findings
            .iter()
            .all(|f| matches!(f.kind, FindingKind::BoxRejected { .. }))
    );
}

#[test]
fn non_finite_coordinates_are_rejected() {
    let detection = PiiDetection::new(PiiCategory::Name, "Asha")
        .with_box(BoundingBox::new(f64::NAN, 0.0, 10.0, 10.0));

    let out = sanitize(vec![detection], DIMS, &IdPrefixPolicy::default());
    assert!(out.detections[0].bounding_box.is_none());
}

#[test]
fn id_with_exact_prefix_is_normalized_to_digits() {
    let out = sanitize(
        vec![aadhaar("1234 5678", None)],
        DIMS,
        &IdPrefixPolicy::default(),
    );
    assert_eq!(out.detections[0].value, "12345678");
    assert!(out.findings.is_empty());
}

#[test]
fn full_id_is_truncated_to_prefix_and_box_narrowed() {
    // 14 printed characters; the 8th digit is the 9th character.
    let bbox = BoundingBox::new(100.0, 400.0, 380.0, 430.0);
    let out = sanitize(
        vec![aadhaar("1234 5678 9012", Some(bbox))],
        DIMS,
        &IdPrefixPolicy::default(),
    );

    let detection = &out.detections[0];
    assert_eq!(detection.value, "12345678");
    assert_eq!(detection.value.len(), 8);

    let narrowed = detection.bounding_box.expect("box kept");
    assert_eq!(narrowed.x1, 100.0);
    assert!((narrowed.x2 - (100.0 + 280.0 * 9.0 / 14.0)).abs() < 1e-9);
    assert_eq!(narrowed.y1, 400.0);
    assert_eq!(narrowed.y2, 430.0);

    assert_eq!(
        out.findings,
        vec![PolicyFinding {
            index: 0,
            kind: FindingKind::IdTruncated {
                found_digits: 12,
                kept_digits: 8
            }
        }]
    );
}

#[test]
fn short_id_is_flagged_not_passed_silently() {
    let out = sanitize(
        vec![aadhaar("1234", None)],
        DIMS,
        &IdPrefixPolicy::default(),
    );
    assert_eq!(
        out.findings[0].kind,
        FindingKind::IdTooShort {
            expected: 8,
            found: 4
        }
    );
}

#[test]
fn prefix_width_is_configurable() {
    let policy = IdPrefixPolicy::new(6, 3).unwrap();
    let out = sanitize(vec![aadhaar("123 456 789", None)], DIMS, &policy);
    assert_eq!(out.detections[0].value, "123456");
}

#[test]
fn zero_width_prefix_is_invalid() {
    assert!(IdPrefixPolicy::new(0, 4).is_err());
    assert!(IdPrefixPolicy::new(8, 0).is_err());
}

#[test]
fn duplicates_collapse() {
    let d = PiiDetection::new(PiiCategory::Gender, "Female");
    let out = sanitize(vec![d.clone(), d], DIMS, &IdPrefixPolicy::default());
    assert_eq!(out.detections.len(), 1);
    assert_eq!(out.findings[0].index, 1);
    assert_eq!(out.findings[0].kind, FindingKind::Duplicate);
}

#[test]
fn non_id_values_are_only_trimmed() {
    let out = sanitize(
        vec![PiiDetection::new(PiiCategory::Phone, "  98765 43210 ")],
        DIMS,
        &IdPrefixPolicy::default(),
    );
    assert_eq!(out.detections[0].value, "98765 43210");
}
