use axum::{Extension, Json};
use fakebuster_engine::ScanReport;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{validate_url, ApiError, ApiJson, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct TextAnalysisRequest {
    pub text: String,
    pub url: String,
}

pub(super) async fn analyze_text(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<TextAnalysisRequest>,
) -> Result<Json<ApiResponse<ScanReport>>, ApiError> {
    validate_url(&req_id.0, "url", &body.url)?;
    let report = fakebuster_engine::scan_text(&body.text);
    if report.is_suspicious {
        tracing::info!(
            url = %body.url,
            risk_level = %report.risk_level,
            matches = report.scam_indicators.len(),
            "suspicious text reported"
        );
    }
    Ok(Json(ApiResponse::new(req_id.0, report)))
}
