use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veil_core::models::report::DetectionReport;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    /// Data URI of the uploaded document.
    pub image: String,
    /// Echoed back so the client can discard stale responses.
    pub request_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    #[serde(flatten)]
    pub report: DetectionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Locate PII in an uploaded document image.
pub async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let Json(req) = payload?;
    let request_id = req.request_id.unwrap_or_else(Uuid::new_v4);

    let input = state.pipeline.inspect(&req.image)?;
    let report = state.pipeline.detect(request_id, &input).await?;
    let message = report.message();

    Ok(Json(DetectResponse { report, message }))
}
