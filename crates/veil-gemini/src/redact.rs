use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use veil_core::capability::{ImageRedactor, ProviderError};
use veil_core::models::image::{ImageData, ImageMime};
use veil_core::prompts::RedactionPrompt;

use crate::client::GeminiClient;
use crate::error::GeminiError;
use crate::wire::{Content, GenerateContentRequest, GenerationConfig, Part};

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

pub fn redaction_request(image: &ImageData, prompt: &RedactionPrompt) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![
            Part::image(image),
            Part::text(prompt.text.clone()),
        ])],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            ..Default::default()
        }),
    }
}

/// [`ImageRedactor`] backed by a Gemini image-generation model.
#[derive(Clone)]
pub struct GeminiRedactor {
    client: GeminiClient,
    model: String,
}

impl GeminiRedactor {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn regenerate(
        &self,
        image: &ImageData,
        prompt: &RedactionPrompt,
    ) -> Result<ImageData, GeminiError> {
        let invocation_id = Uuid::new_v4();
        info!(%invocation_id, model = %self.model, "starting gemini image redaction");

        let response = self
            .client
            .generate_content(&self.model, &redaction_request(image, prompt))
            .await?;

        let Some(inline) = response.first_image() else {
            let text = response.text();
            warn!(
                %invocation_id,
                finish_reason = response.finish_reason().unwrap_or("unknown"),
                "image generation returned no image"
            );
            return Err(GeminiError::NoImage(if text.is_empty() {
                "response contained no image part".to_string()
            } else {
                text
            }));
        };

        let mime = ImageMime::from_mime_type(&inline.mime_type)
            .map_err(|e| GeminiError::NoImage(e.to_string()))?;
        let redacted = ImageData::from_base64(mime, &inline.data)
            .map_err(|e| GeminiError::NoImage(e.to_string()))?;

        info!(
            %invocation_id,
            model = %self.model,
            output_bytes = redacted.bytes.len(),
            "gemini image redaction complete"
        );

        Ok(redacted)
    }
}

#[async_trait]
impl ImageRedactor for GeminiRedactor {
    async fn redact(
        &self,
        image: &ImageData,
        prompt: &RedactionPrompt,
    ) -> Result<ImageData, ProviderError> {
        Ok(self.regenerate(image, prompt).await?)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
