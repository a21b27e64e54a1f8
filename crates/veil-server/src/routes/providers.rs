use axum::Json;
use axum::extract::State;
use serde::Serialize;

use veil_bedrock::models::VisionModel;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub provider: String,
    pub model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersResponse {
    pub detector: ProviderInfo,
    pub redactor: ProviderInfo,
}

pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let detector = state.pipeline.detector();
    let redactor = state.pipeline.redactor();
    Json(ProvidersResponse {
        detector: ProviderInfo {
            provider: detector.provider_name().to_string(),
            model: detector.model_id().to_string(),
        },
        redactor: ProviderInfo {
            provider: redactor.provider_name().to_string(),
            model: redactor.model_id().to_string(),
        },
    })
}

/// Vision models the Bedrock detector could be pointed at.
pub async fn list_bedrock_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<VisionModel>>, ApiError> {
    let aws = state
        .aws
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("bedrock detector is not configured".to_string()))?;
    let models = veil_bedrock::models::list_vision_models(aws).await?;
    Ok(Json(models))
}
