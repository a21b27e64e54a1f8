use async_trait::async_trait;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use veil_core::capability::{PiiDetector, ProviderError};
use veil_core::models::detection::{DetectionPayload, PiiDetection};
use veil_core::models::image::ImageData;
use veil_core::prompts::DetectionPrompt;

use crate::client::GeminiClient;
use crate::error::GeminiError;
use crate::wire::{Content, GenerateContentRequest, GenerationConfig, Part};

pub const DEFAULT_DETECT_MODEL: &str = "gemini-2.0-flash";

/// Constrains the model's JSON output to the detection payload.
pub fn detection_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "piiElements": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING" },
                        "value": { "type": "STRING" },
                        "bounding_box": {
                            "type": "OBJECT",
                            "properties": {
                                "x1": { "type": "NUMBER" },
                                "y1": { "type": "NUMBER" },
                                "x2": { "type": "NUMBER" },
                                "y2": { "type": "NUMBER" }
                            },
                            "required": ["x1", "y1", "x2", "y2"]
                        }
                    },
                    "required": ["type", "value"]
                }
            }
        },
        "required": ["piiElements"]
    })
}

pub fn detection_request(image: &ImageData, prompt: &DetectionPrompt) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![
            Part::image(image),
            Part::text(prompt.user.clone()),
        ])],
        system_instruction: Some(Content::system(prompt.system.clone())),
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(detection_response_schema()),
            temperature: Some(0.0),
            ..Default::default()
        }),
    }
}

/// [`PiiDetector`] backed by a Gemini model with structured output.
#[derive(Clone)]
pub struct GeminiDetector {
    client: GeminiClient,
    model: String,
}

impl GeminiDetector {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn detect_pii(
        &self,
        image: &ImageData,
        prompt: &DetectionPrompt,
    ) -> Result<Vec<PiiDetection>, GeminiError> {
        let invocation_id = Uuid::new_v4();
        info!(%invocation_id, model = %self.model, image_bytes = image.bytes.len(), "starting gemini pii detection");

        let response = self
            .client
            .generate_content(&self.model, &detection_request(image, prompt))
            .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GeminiError::SchemaViolation(format!(
                "empty reply (finish reason: {})",
                response.finish_reason().unwrap_or("unknown")
            )));
        }

        let payload = DetectionPayload::from_model_text(&text)
            .map_err(|e| GeminiError::SchemaViolation(e.to_string()))?;

        let usage = response.usage_metadata.unwrap_or_default();
        info!(
            %invocation_id,
            model = %self.model,
            detections = payload.pii_elements.len(),
            input_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "gemini pii detection complete"
        );

        Ok(payload.pii_elements)
    }
}

#[async_trait]
impl PiiDetector for GeminiDetector {
    async fn detect(
        &self,
        image: &ImageData,
        prompt: &DetectionPrompt,
    ) -> Result<Vec<PiiDetection>, ProviderError> {
        Ok(self.detect_pii(image, prompt).await?)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
