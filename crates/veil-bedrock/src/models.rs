//! Discovery of Bedrock models that can read document images.
//!
//! # Foundation models vs. inference profiles
//!
//! `ListFoundationModels` is the canonical registry: each entry carries its
//! input modalities and lifecycle status (`ACTIVE` or `LEGACY`).
//! `ListInferenceProfiles` returns cross-region routing wrappers such as
//! `us.anthropic.claude-sonnet-4-...`. Models that do not support on-demand
//! throughput can only be invoked through such a profile, so:
//!
//! 1. Take every `ACTIVE` foundation model whose input modalities include
//!    `IMAGE` and whose output includes `TEXT`, skipping context-window
//!    variants (`:48k`, `:200k`).
//! 2. Prefer a `us.` inference profile from the API for it.
//! 3. Otherwise use the bare ID when on-demand invocation is supported, and
//!    construct `us.{model_id}` when it is not.

use std::collections::HashMap;

use aws_sdk_bedrock::types::{
    FoundationModelLifecycleStatus, InferenceProfileStatus, InferenceProfileType, InferenceType,
    ModelModality,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BedrockError;

/// A model usable for PII detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionModel {
    /// ID to pass to Converse: an inference profile or a bare model ID.
    pub model_id: String,
    pub name: String,
    pub provider: String,
}

struct FoundationVisionModel {
    model_id: String,
    name: String,
    provider: String,
    on_demand: bool,
}

/// List vision-capable chat models, sorted by name.
pub async fn list_vision_models(
    config: &aws_config::SdkConfig,
) -> Result<Vec<VisionModel>, BedrockError> {
    let client = aws_sdk_bedrock::Client::new(config);

    let foundation = fetch_active_vision_models(&client).await?;
    let us_profiles = fetch_us_inference_profiles(&client).await?;

    let mut models: Vec<VisionModel> = foundation
        .into_iter()
        .map(|m| {
            let model_id = if let Some(profile_id) = us_profiles.get(&m.model_id) {
                profile_id.clone()
            } else if m.on_demand {
                m.model_id
            } else {
                format!("us.{}", m.model_id)
            };
            VisionModel {
                model_id,
                name: m.name,
                provider: m.provider,
            }
        })
        .collect();

    models.sort_by(|a, b| a.name.cmp(&b.name));

    info!(count = models.len(), "discovered vision models");

    Ok(models)
}

/// True for context-window variants such as `anthropic.claude-v2:1:18k`.
/// A trailing `:0` is the ordinary version suffix, not a variant.
pub fn is_context_variant(model_id: &str) -> bool {
    model_id.rsplit_once(':').is_some_and(|(_, suffix)| {
        suffix.chars().next().is_some_and(|c| c.is_ascii_digit()) && suffix != "0"
    })
}

async fn fetch_active_vision_models(
    client: &aws_sdk_bedrock::Client,
) -> Result<Vec<FoundationVisionModel>, BedrockError> {
    let response = client
        .list_foundation_models()
        .by_output_modality(ModelModality::Text)
        .send()
        .await
        .map_err(|e| BedrockError::Discovery(e.into_service_error().to_string()))?;

    let models = response
        .model_summaries()
        .iter()
        .filter(|m| {
            let reads_images = m.input_modalities().contains(&ModelModality::Image);
            let is_active = m
                .model_lifecycle()
                .map(|lc| *lc.status() == FoundationModelLifecycleStatus::Active)
                .unwrap_or(false);
            reads_images && is_active && !is_context_variant(m.model_id())
        })
        .map(|m| FoundationVisionModel {
            model_id: m.model_id().to_string(),
            name: m.model_name().unwrap_or(m.model_id()).to_string(),
            provider: m.provider_name().unwrap_or_default().to_string(),
            on_demand: m
                .inference_types_supported()
                .contains(&InferenceType::OnDemand),
        })
        .collect();

    Ok(models)
}

/// Map from bare foundation model ID to its active `us.` profile ID.
async fn fetch_us_inference_profiles(
    client: &aws_sdk_bedrock::Client,
) -> Result<HashMap<String, String>, BedrockError> {
    let response = client
        .list_inference_profiles()
        .type_equals(InferenceProfileType::SystemDefined)
        .max_results(100)
        .send()
        .await
        .map_err(|e| BedrockError::Discovery(e.into_service_error().to_string()))?;

    let map = response
        .inference_profile_summaries()
        .iter()
        .filter(|p| *p.status() == InferenceProfileStatus::Active)
        .filter_map(|p| {
            let id = p.inference_profile_id();
            let bare = id.strip_prefix("us.")?;
            Some((bare.to_string(), id.to_string()))
        })
        .collect();

    Ok(map)
}
