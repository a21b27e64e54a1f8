use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use veil_core::capability::{PiiDetector, ProviderError};
use veil_core::models::detection::{BoundingBox, PiiCategory};
use veil_core::models::image::{ImageData, ImageDimensions, ImageMime};
use veil_core::policy::IdPrefixPolicy;
use veil_core::prompts::detection_prompt;
use veil_gemini::client::GeminiClient;
use veil_gemini::detect::GeminiDetector;

const MODEL: &str = "test-model";
const PATH: &str = "/models/test-model:generateContent";

fn detector(base_url: &str) -> GeminiDetector {
    let client = GeminiClient::new("test-key", base_url, Duration::from_secs(5)).unwrap();
    GeminiDetector::new(client, MODEL)
}

fn sample_image() -> ImageData {
    ImageData::new(ImageMime::Png, vec![0x89, b'P', b'N', b'G'])
}

fn prompt() -> veil_core::prompts::DetectionPrompt {
    detection_prompt(
        ImageDimensions {
            width: 1000,
            height: 500,
        },
        &IdPrefixPolicy::default(),
    )
}

fn reply_with_text(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 1200, "candidatesTokenCount": 80 }
    })
    .to_string()
}

#[tokio::test]
async fn parses_structured_reply() {
    let mut server = mockito::Server::new_async().await;
    let payload = json!({
        "piiElements": [
            { "type": "Name", "value": "Asha Verma", "bounding_box": { "x1": 220, "y1": 120, "x2": 420, "y2": 150 } },
            { "type": "Aadhaar Number", "value": "12345678" }
        ]
    });
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })),
            Matcher::Regex(r#""inlineData":\{"mimeType":"image/png","data":"iVBORw=="\}"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_with_text(&payload.to_string()))
        .create_async()
        .await;

    let detections = detector(&server.url())
        .detect(&sample_image(), &prompt())
        .await
        .expect("detection succeeds");

    mock.assert_async().await;
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].category, PiiCategory::Name);
    assert_eq!(
        detections[0].bounding_box,
        Some(BoundingBox::new(220.0, 120.0, 420.0, 150.0))
    );
    assert_eq!(detections[1].category, PiiCategory::NationalId);
    assert!(detections[1].bounding_box.is_none());
}

#[tokio::test]
async fn empty_list_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(reply_with_text(r#"{"piiElements": []}"#))
        .create_async()
        .await;

    let detections = detector(&server.url())
        .detect(&sample_image(), &prompt())
        .await
        .expect("detection succeeds");
    assert!(detections.is_empty());
}

#[tokio::test]
async fn malformed_reply_is_a_schema_violation() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(reply_with_text(r#"{"piiElements": [{"type": "Name"}]}"#))
        .create_async()
        .await;

    let err = detector(&server.url())
        .detect(&sample_image(), &prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::SchemaViolation(_)));
}

#[tokio::test]
async fn rate_limit_is_transient() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(429)
        .with_body(r#"{"error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let err = detector(&server.url())
        .detect(&sample_image(), &prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited(ref m) if m.contains("Resource exhausted")));
    assert!(err.is_transient());
}

#[tokio::test]
async fn bad_key_is_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(403)
        .with_body(r#"{"error": {"code": 403, "message": "API key not valid"}}"#)
        .create_async()
        .await;

    let err = detector(&server.url())
        .detect(&sample_image(), &prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn blocked_prompt_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
        .create_async()
        .await;

    let err = detector(&server.url())
        .detect(&sample_image(), &prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Rejected(ref m) if m.contains("SAFETY")));
}

#[test]
fn empty_api_key_is_refused() {
    assert!(GeminiClient::new("  ", "http://localhost", Duration::from_secs(1)).is_err());
}
