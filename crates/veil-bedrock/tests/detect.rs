use aws_sdk_bedrockruntime::types::ImageFormat;
use veil_bedrock::detect::image_format;
use veil_bedrock::error::BedrockError;
use veil_bedrock::tokens::{TokenCount, get_pricing};
use veil_core::capability::ProviderError;
use veil_core::models::image::ImageMime;

#[test]
fn image_formats_map_to_converse_formats() {
    assert_eq!(image_format(ImageMime::Png), ImageFormat::Png);
    assert_eq!(image_format(ImageMime::Jpeg), ImageFormat::Jpeg);
    assert_eq!(image_format(ImageMime::Webp), ImageFormat::Webp);
}

#[test]
fn throttling_and_outages_are_transient() {
    let throttled: ProviderError = BedrockError::Throttled("slow down".to_string()).into();
    let unavailable: ProviderError = BedrockError::Unavailable("model timeout".to_string()).into();
    assert!(throttled.is_transient());
    assert!(unavailable.is_transient());
}

#[test]
fn bad_replies_and_auth_failures_are_permanent() {
    let schema: ProviderError = BedrockError::SchemaViolation("missing piiElements".to_string()).into();
    let denied: ProviderError = BedrockError::AccessDenied("no model access".to_string()).into();
    assert!(matches!(schema, ProviderError::SchemaViolation(_)));
    assert!(matches!(denied, ProviderError::Unauthorized(_)));
    assert!(!schema.is_transient());
    assert!(!denied.is_transient());
}

#[test]
fn sonnet_pricing_is_known() {
    let pricing = get_pricing("us.anthropic.claude-sonnet-4-20250514-v1:0").expect("priced");
    let cost = pricing.estimate_cost(TokenCount {
        input: 1_000_000,
        output: 100_000,
    });
    assert!((cost - 4.5).abs() < 1e-9);
    assert!(get_pricing("mistral.pixtral-large").is_none());
}
