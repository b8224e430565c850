use axum::{extract::State, Extension, Json};
use fakebuster_engine::{ReviewBatchAnalysis, ReviewInput, SingleReviewAnalysis};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_engine_error, validate_url, ApiError, ApiJson, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ReviewAnalysisRequest {
    pub reviews: Vec<ReviewInput>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SingleReviewRequest {
    pub review_text: String,
    pub url: String,
}

pub(super) async fn analyze_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<ReviewAnalysisRequest>,
) -> Result<Json<ApiResponse<ReviewBatchAnalysis>>, ApiError> {
    validate_url(&req_id.0, "url", &body.url)?;

    let analysis =
        fakebuster_engine::analyze_reviews(&state.classifier, &body.reviews, state.max_batch_size)
            .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let record = analysis.audit_record(&body.url);
    tracing::info!(
        target: "fakebuster::audit",
        url = %record.url,
        total_reviews = record.total_reviews,
        fake_reviews = record.fake_reviews,
        analyzed_at = %record.analyzed_at,
        method = %state.classifier.method(),
        "review analysis recorded"
    );

    Ok(Json(ApiResponse::new(req_id.0, analysis)))
}

pub(super) async fn analyze_single_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<SingleReviewRequest>,
) -> Result<Json<ApiResponse<SingleReviewAnalysis>>, ApiError> {
    validate_url(&req_id.0, "url", &body.url)?;

    let analysis = fakebuster_engine::analyze_single_review(&state.classifier, &body.review_text)
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, analysis)))
}
