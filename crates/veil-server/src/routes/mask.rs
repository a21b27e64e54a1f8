use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veil_core::models::detection::PiiDetection;
use veil_core::models::redaction::RedactionStyle;
use veil_core::policy::PolicyFinding;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskRequest {
    pub image: String,
    /// Detections to redact. When absent, detection runs first.
    pub pii_elements: Option<Vec<PiiDetection>>,
    pub style: Option<RedactionStyle>,
    pub request_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskResponse {
    pub request_id: Uuid,
    pub masked_image: String,
    /// True when the image came back from the generation model, so regions
    /// outside the redactions are not guaranteed to match the original.
    pub regenerated: bool,
    /// Corrections made to the supplied detections before redacting.
    pub findings: Vec<PolicyFinding>,
}

/// Produce a redacted copy of an uploaded document image.
pub async fn mask(
    State(state): State<AppState>,
    payload: Result<Json<MaskRequest>, JsonRejection>,
) -> Result<Json<MaskResponse>, ApiError> {
    let Json(req) = payload?;
    let request_id = req.request_id.unwrap_or_else(Uuid::new_v4);
    let style = req.style.unwrap_or(state.config.style);

    let input = state.pipeline.inspect(&req.image)?;
    let detections = match req.pii_elements {
        Some(elements) => elements,
        None => state.pipeline.detect(request_id, &input).await?.pii_elements,
    };

    let output = state
        .pipeline
        .mask(request_id, &input, &detections, style)
        .await?;

    Ok(Json(MaskResponse {
        request_id,
        masked_image: output.masked.image().to_data_uri(),
        regenerated: output.masked.is_regenerated(),
        findings: output.findings,
    }))
}
