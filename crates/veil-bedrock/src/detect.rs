//! PII detection via the Bedrock Converse API.
//!
//! Sends the document image as an `ImageBlock` next to the detection
//! prompt and parses the model's JSON reply. Any Converse model that accepts
//! image input works; Claude models are the default.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::config::http::HttpResponse;
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ImageBlock, ImageFormat, ImageSource, InferenceConfiguration,
    Message, SystemContentBlock,
};
use tracing::info;
use uuid::Uuid;

use veil_core::capability::{PiiDetector, ProviderError};
use veil_core::models::detection::{DetectionPayload, PiiDetection};
use veil_core::models::image::{ImageData, ImageMime};
use veil_core::prompts::DetectionPrompt;

use crate::error::BedrockError;
use crate::tokens::{self, TokenCount};

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

const MAX_OUTPUT_TOKENS: i32 = 4096;

/// Detection reply plus what it cost.
pub struct DetectionOutput {
    pub detections: Vec<PiiDetection>,
    pub tokens: TokenCount,
}

/// Run PII detection on a document image.
pub async fn detect_pii(
    client: &aws_sdk_bedrockruntime::Client,
    model_id: &str,
    image: &ImageData,
    prompt: &DetectionPrompt,
) -> Result<DetectionOutput, BedrockError> {
    let invocation_id = Uuid::new_v4();

    let image_block = ImageBlock::builder()
        .format(image_format(image.mime))
        .source(ImageSource::Bytes(aws_smithy_types::Blob::new(
            image.bytes.clone(),
        )))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    let message = Message::builder()
        .role(ConversationRole::User)
        .content(ContentBlock::Image(image_block))
        .content(ContentBlock::Text(prompt.user.clone()))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    info!(%invocation_id, model_id, image_bytes = image.bytes.len(), "starting bedrock pii detection");

    let response = client
        .converse()
        .model_id(model_id)
        .system(SystemContentBlock::Text(prompt.system.clone()))
        .messages(message)
        .inference_config(
            InferenceConfiguration::builder()
                .max_tokens(MAX_OUTPUT_TOKENS)
                .temperature(0.0)
                .build(),
        )
        .send()
        .await
        .map_err(converse_error)?;

    let output_message = response
        .output()
        .and_then(|o| o.as_message().ok())
        .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

    let response_text = output_message
        .content()
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(text) = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    let payload = DetectionPayload::from_model_text(&response_text)
        .map_err(|e| BedrockError::SchemaViolation(e.to_string()))?;

    let tokens = response
        .usage()
        .map(tokens::extract_token_usage)
        .unwrap_or_default();
    let cost_usd = tokens::get_pricing(model_id)
        .map(|p| p.estimate_cost(tokens))
        .unwrap_or(0.0);

    info!(
        %invocation_id,
        model_id,
        detections = payload.pii_elements.len(),
        input_tokens = tokens.input,
        output_tokens = tokens.output,
        cost_usd,
        "bedrock pii detection complete"
    );

    Ok(DetectionOutput {
        detections: payload.pii_elements,
        tokens,
    })
}

pub fn image_format(mime: ImageMime) -> ImageFormat {
    match mime {
        ImageMime::Png => ImageFormat::Png,
        ImageMime::Jpeg => ImageFormat::Jpeg,
        ImageMime::Webp => ImageFormat::Webp,
    }
}

fn converse_error(e: SdkError<ConverseError, HttpResponse>) -> BedrockError {
    match e {
        SdkError::TimeoutError(_) => BedrockError::Timeout("converse request timed out".to_string()),
        SdkError::DispatchFailure(f) => BedrockError::Transport(format!("{f:?}")),
        other => {
            let err = other.into_service_error();
            let message = err.to_string();
            if err.is_throttling_exception() {
                BedrockError::Throttled(message)
            } else if err.is_access_denied_exception() {
                BedrockError::AccessDenied(message)
            } else if err.is_model_timeout_exception() || err.is_internal_server_exception() {
                BedrockError::Unavailable(message)
            } else {
                BedrockError::Invocation(message)
            }
        }
    }
}

/// [`PiiDetector`] backed by a Bedrock Converse model.
#[derive(Clone)]
pub struct BedrockDetector {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockDetector {
    pub fn new(client: aws_sdk_bedrockruntime::Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl PiiDetector for BedrockDetector {
    async fn detect(
        &self,
        image: &ImageData,
        prompt: &DetectionPrompt,
    ) -> Result<Vec<PiiDetection>, ProviderError> {
        let output = detect_pii(&self.client, &self.model_id, image, prompt).await?;
        Ok(output.detections)
    }

    fn provider_name(&self) -> &str {
        "bedrock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
