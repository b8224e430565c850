//! Website trust, page and form handlers.

use axum::{Extension, Json};
use fakebuster_engine::{
    FormField, FormSecurityReport, PageAnalysis, PageInput, TrustVerdict, WebsiteSignals,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{validate_url, ApiError, ApiJson, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct WebsiteAnalysisRequest {
    pub url: String,
    pub domain: String,
    #[serde(default)]
    pub local_analysis: Option<WebsiteSignals>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FormSecurityRequest {
    pub url: String,
    pub has_ssl: bool,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
}

fn score_website(req_id: &str, body: &WebsiteAnalysisRequest) -> Result<TrustVerdict, ApiError> {
    validate_url(req_id, "url", &body.url)?;
    let signals = body.local_analysis.clone().unwrap_or_default();
    let verdict = fakebuster_engine::score_trust(&signals);
    tracing::debug!(
        domain = %body.domain,
        trust_score = verdict.trust_score,
        status = ?verdict.status,
        "website scored"
    );
    Ok(verdict)
}

pub(super) async fn analyze_website(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<WebsiteAnalysisRequest>,
) -> Result<Json<ApiResponse<TrustVerdict>>, ApiError> {
    let verdict = score_website(&req_id.0, &body)?;
    Ok(Json(ApiResponse::new(req_id.0, verdict)))
}

/// Same scoring as `analyze_website`, kept as its own route for clients that
/// only ask for the legitimacy verdict.
pub(super) async fn check_legitimacy(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<WebsiteAnalysisRequest>,
) -> Result<Json<ApiResponse<TrustVerdict>>, ApiError> {
    let verdict = score_website(&req_id.0, &body)?;
    Ok(Json(ApiResponse::new(req_id.0, verdict)))
}

pub(super) async fn analyze_page(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<PageInput>,
) -> Result<Json<ApiResponse<PageAnalysis>>, ApiError> {
    validate_url(&req_id.0, "url", &body.url)?;
    let analysis = fakebuster_engine::analyze_page(&body);
    Ok(Json(ApiResponse::new(req_id.0, analysis)))
}

pub(super) async fn check_form_security(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<FormSecurityRequest>,
) -> Result<Json<ApiResponse<FormSecurityReport>>, ApiError> {
    validate_url(&req_id.0, "url", &body.url)?;
    let report = fakebuster_engine::check_form_security(body.has_ssl, &body.form_fields);
    Ok(Json(ApiResponse::new(req_id.0, report)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::api::tests::{json_body, post_json, test_app};

    #[tokio::test]
    async fn website_without_local_analysis_is_danger() {
        let body = json!({ "url": "https://unknown.example", "domain": "unknown.example" });
        let response = test_app()
            .oneshot(post_json("/api/v1/analyze/website", &body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        // 50 - 20 (no ssl) - 10 (unknown age)
        assert_eq!(json["data"]["trust_score"], 20);
        assert_eq!(json["data"]["status"], "danger");
        assert_eq!(json["data"]["risk_level"], "high");
        assert_eq!(json["data"]["is_legitimate"], false);
    }

    #[tokio::test]
    async fn legitimacy_matches_website_scoring() {
        let body = json!({
            "url": "https://shop.example",
            "domain": "shop.example",
            "local_analysis": {
                "has_ssl": true,
                "has_contact_info": true,
                "has_privacy_policy": true,
                "has_terms_of_service": true,
                "domain_age_days": 800
            }
        });
        let response = test_app()
            .oneshot(post_json("/api/v1/analyze/legitimacy", &body))
            .await
            .expect("response");

        let json = json_body(response).await;
        assert_eq!(json["data"]["trust_score"], 100);
        assert_eq!(json["data"]["status"], "safe");
        assert_eq!(json["data"]["warnings"], json!([]));
    }

    #[tokio::test]
    async fn page_analysis_flattens_verdict_and_alerts() {
        let body = json!({
            "url": "https://deals.example",
            "domain": "deals.example",
            "title": "Deals",
            "has_ssl": true,
            "has_contact_info": false,
            "has_privacy_policy": false,
            "has_terms_of_service": false,
            "suspicious_elements": [],
            "page_text": "Guaranteed income! Act now."
        });
        let response = test_app()
            .oneshot(post_json("/api/v1/analyze/page", &body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let data = &json["data"];
        assert!(data["trust_score"].is_number());
        assert_eq!(data["alerts"].as_array().expect("alerts").len(), 2);
        assert_eq!(data["page_analysis"]["title"], "Deals");
    }

    #[tokio::test]
    async fn form_security_flags_plain_http_and_ssn() {
        let body = json!({
            "url": "http://forms.example",
            "has_ssl": false,
            "form_fields": [{ "name": "ssn", "type": "text" }]
        });
        let response = test_app()
            .oneshot(post_json("/api/v1/analyze/form-security", &body))
            .await
            .expect("response");

        let json = json_body(response).await;
        assert_eq!(json["data"]["is_secure"], false);
        assert_eq!(
            json["data"]["warnings"],
            json!([
                "Form is not using HTTPS encryption",
                "Form requests Social Security Number"
            ])
        );
        assert_eq!(json["data"]["recommendations"].as_array().expect("recs").len(), 3);
    }
}
