mod reviews;
mod text;
mod website;

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use fakebuster_engine::{Classifier, EngineError, ModelStatus};
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

const SERVICE_NAME: &str = "FakeBuster API";

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub max_batch_size: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    service: &'static str,
    version: &'static str,
    status: &'static str,
    model: ModelStatus,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// `Json` extractor whose rejections use the error envelope.
pub(super) struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map_or_else(String::new, |id| id.0.clone());

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(
                    request_id = %request_id,
                    error = %rejection,
                    "malformed request body"
                );
                Err(ApiError::new(request_id, "bad_request", rejection.body_text()))
            }
        }
    }
}

pub(super) fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error {
        EngineError::NoInput(_) => ApiError::new(request_id, "bad_request", error.to_string()),
        EngineError::BatchTooLarge { .. } => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        EngineError::PredictionFailed(_) => {
            tracing::error!(error = %error, "review prediction failed");
            ApiError::new(request_id, "prediction_failed", error.to_string())
        }
    }
}

/// Rejects anything that is not an absolute http(s) URL with a host.
pub(super) fn validate_url(req_id: &str, field: &str, value: &str) -> Result<(), ApiError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    let has_host = rest.is_some_and(|rest| {
        !rest.is_empty() && !rest.starts_with('/') && !rest.contains(char::is_whitespace)
    });
    if has_host {
        Ok(())
    } else {
        Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'{field}' must be a valid http(s) URL, got '{value}'"),
        ))
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analyze/reviews", post(reviews::analyze_reviews))
        .route(
            "/api/v1/analyze/single-review",
            post(reviews::analyze_single_review),
        )
        .route("/api/v1/analyze/website", post(website::analyze_website))
        .route(
            "/api/v1/analyze/legitimacy",
            post(website::check_legitimacy),
        )
        .route("/api/v1/analyze/page", post(website::analyze_page))
        .route(
            "/api/v1/analyze/form-security",
            post(website::check_form_security),
        )
        .route("/api/v1/analyze/text", post(text::analyze_text))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health))
        .route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::new(
        req_id.0,
        HealthData {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            status: "running",
            model: state.classifier.status(),
        },
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use fakebuster_engine::FeatureExtractor;
    use tower::ServiceExt;

    pub(crate) fn test_app() -> Router {
        test_app_with(AuthState::disabled(), RateLimitState::per_minute(1_000), 10)
    }

    pub(crate) fn test_app_with(
        auth: AuthState,
        rate_limit: RateLimitState,
        max_batch_size: usize,
    ) -> Router {
        let state = AppState {
            classifier: Arc::new(Classifier::fallback(FeatureExtractor::new())),
            max_batch_size,
        };
        build_app(state, auth, rate_limit)
    }

    pub(crate) fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    pub(crate) async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn prediction_failure_maps_to_internal_error_status() {
        let err = EngineError::PredictionFailed(fakebuster_engine::ModelError::Output(
            "nan".to_string(),
        ));
        let api = map_engine_error("req-1".to_string(), &err);
        assert_eq!(api.error.code, "prediction_failed");
        assert_eq!(
            api.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validate_url_accepts_http_and_https_only() {
        assert!(validate_url("r", "url", "https://shop.example/p/1").is_ok());
        assert!(validate_url("r", "url", "http://shop.example").is_ok());
        assert!(validate_url("r", "url", "ftp://shop.example").is_err());
        assert!(validate_url("r", "url", "https://").is_err());
        assert!(validate_url("r", "url", "shop.example").is_err());
    }

    #[tokio::test]
    async fn health_reports_fallback_model() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "running");
        assert_eq!(json["data"]["model"]["method"], "fallback");
        assert_eq!(json["data"]["model"]["feature_version"], 1);
    }

    #[tokio::test]
    async fn root_echoes_supplied_request_id() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let json = json_body(response).await;
        assert_eq!(json["meta"]["request_id"], "abc-123");
        assert_eq!(json["data"]["service"], SERVICE_NAME);
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token_when_enabled() {
        let auth = AuthState::new(vec!["secret".to_string()], false).expect("auth");
        let app = test_app_with(auth, RateLimitState::per_minute(1_000), 10);
        let body = serde_json::json!({ "text": "hello", "url": "https://a.example" });

        let denied = app
            .clone()
            .oneshot(post_json("/api/v1/analyze/text", &body))
            .await
            .expect("response");
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        let denied_id = denied
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let denied_json = json_body(denied).await;
        assert_eq!(denied_json["error"]["code"], "unauthorized");
        assert_eq!(denied_json["meta"]["request_id"].as_str(), denied_id.as_deref());

        let mut request = post_json("/api/v1/analyze/text", &body);
        request.headers_mut().insert(
            header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer secret"),
        );
        let allowed = app.oneshot(request).await.expect("response");
        assert_eq!(allowed.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_stays_public_when_auth_enabled() {
        let auth = AuthState::new(vec!["secret".to_string()], false).expect("auth");
        let response = test_app_with(auth, RateLimitState::per_minute(1_000), 10)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_body_field_is_bad_request_envelope() {
        let body = serde_json::json!({ "url": "https://a.example" });
        let response = test_app()
            .oneshot(post_json("/api/v1/analyze/text", &body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("missing field `text`")));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn unparseable_body_is_bad_request_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyze/reviews")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let response = test_app().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn rate_limit_rejects_after_window_is_spent() {
        let app = test_app_with(AuthState::disabled(), RateLimitState::per_minute(1), 10);
        let body = serde_json::json!({ "text": "hello", "url": "https://a.example" });

        let first = app
            .clone()
            .oneshot(post_json("/api/v1/analyze/text", &body))
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(post_json("/api/v1/analyze/text", &body))
            .await
            .expect("response");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
        let json = json_body(second).await;
        assert_eq!(json["error"]["code"], "rate_limited");
    }

    #[tokio::test]
    async fn rate_limit_windows_are_per_api_key() {
        let auth = AuthState::new(vec!["k1".to_string(), "k2".to_string()], false).expect("auth");
        let app = test_app_with(auth, RateLimitState::per_minute(1), 10);
        let body = serde_json::json!({ "text": "hello", "url": "https://a.example" });

        let send = |key: &'static str| {
            let mut request = post_json("/api/v1/analyze/text", &body);
            request.headers_mut().insert(
                header::AUTHORIZATION,
                axum::http::HeaderValue::from_str(&format!("Bearer {key}")).expect("header"),
            );
            app.clone().oneshot(request)
        };

        assert_eq!(send("k1").await.expect("response").status(), StatusCode::OK);
        assert_eq!(send("k2").await.expect("response").status(), StatusCode::OK);
        assert_eq!(
            send("k1").await.expect("response").status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
