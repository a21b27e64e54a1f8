use std::sync::Arc;

use eyre::WrapErr;
use tracing::info;

use veil_bedrock::detect::BedrockDetector;
use veil_core::capability::{ImageRedactor, PiiDetector};
use veil_gemini::client::GeminiClient;
use veil_gemini::detect::GeminiDetector;
use veil_gemini::redact::GeminiRedactor;

use crate::config::{DetectorBackend, VeilConfig};
use crate::pipeline::{Pipeline, PipelineSettings};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<VeilConfig>,
    /// Present only when detection runs on Bedrock.
    pub aws: Option<aws_config::SdkConfig>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: VeilConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
            aws: None,
        }
    }

    /// Build the configured providers.
    pub async fn from_config(config: VeilConfig) -> eyre::Result<Self> {
        let api_key = config.gemini_api_key.clone().unwrap_or_default();
        let gemini = GeminiClient::new(api_key, &config.gemini_base_url, config.call_timeout)
            .wrap_err("GEMINI_API_KEY or GOOGLE_API_KEY must be set")?;

        let redactor: Arc<dyn ImageRedactor> = Arc::new(GeminiRedactor::new(
            gemini.clone(),
            &config.gemini_image_model,
        ));

        let mut aws = None;
        let detector: Arc<dyn PiiDetector> = match config.detector {
            DetectorBackend::Gemini => {
                Arc::new(GeminiDetector::new(gemini, &config.gemini_detect_model))
            }
            DetectorBackend::Bedrock => {
                let sdk_config = veil_bedrock::client::build_config(&config.aws_region).await;
                let client = veil_bedrock::client::runtime_client(&sdk_config);
                aws = Some(sdk_config);
                Arc::new(BedrockDetector::new(client, &config.bedrock_model))
            }
        };

        info!(
            detector = detector.provider_name(),
            detector_model = detector.model_id(),
            redactor = redactor.provider_name(),
            redactor_model = redactor.model_id(),
            composition = ?config.composition,
            style = ?config.style,
            "providers configured"
        );

        let settings = PipelineSettings {
            id_policy: config.id_policy,
            retry: config.retry,
            call_timeout: config.call_timeout,
            max_upload_bytes: config.max_upload_bytes,
        };

        Ok(Self {
            pipeline: Arc::new(Pipeline::new(detector, redactor, settings)),
            config: Arc::new(config),
            aws,
        })
    }
}
