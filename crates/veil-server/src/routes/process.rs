use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veil_core::models::redaction::RedactionStyle;
use veil_core::models::report::{DetectionReport, MaskStatus};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub image: String,
    pub style: Option<RedactionStyle>,
    pub request_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    #[serde(flatten)]
    pub report: DetectionReport,
    pub mask: MaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Detect and mask in one call, as the UI does on upload.
pub async fn process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(req) = payload?;
    let request_id = req.request_id.unwrap_or_else(Uuid::new_v4);
    let style = req.style.unwrap_or(state.config.style);

    let input = state.pipeline.inspect(&req.image)?;
    let outcome = state
        .pipeline
        .process(request_id, &input, style, state.config.composition)
        .await?;
    let message = outcome.report.message();

    Ok(Json(ProcessResponse {
        report: outcome.report,
        mask: outcome.mask,
        message,
    }))
}
