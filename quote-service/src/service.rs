use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use quote_flow::{PricingEngine, PricingError, ProductData, ProductType, QuoteResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, ServiceConfig};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const MISSING_FIELDS_MESSAGE: &str = "identity and data are required";
const INTERNAL_ERROR_MESSAGE: &str = "Failed to generate quotes";

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    reference_year: Option<i32>,
}

impl AppState {
    pub fn new(reference_year: Option<i32>) -> Self {
        Self { reference_year }
    }

    fn engine(&self) -> PricingEngine {
        self.reference_year
            .map(PricingEngine::for_year)
            .unwrap_or_else(PricingEngine::current)
    }
}

/// Incoming quote body. Both fields are optional here so that absence is
/// reported as a 400 with a message rather than a bare deserialization error.
#[derive(Debug, Deserialize)]
struct QuoteRequestBody {
    #[serde(default, alias = "cpf")]
    identity: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

pub fn create_app(config: &ServiceConfig) -> Result<Router, ConfigError> {
    let state = AppState::new(config.reference_year);
    Ok(build_router(state).layer(cors_layer(&config.cors_origins)?))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/quotes/{product_type}", post(create_quote))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}

pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                return Err(ConfigError::InvalidValue {
                    key: "CORS_ORIGINS".to_string(),
                    message: "wildcard origin cannot be combined with credentials".to_string(),
                });
            }
            HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                key: "CORS_ORIGINS".to_string(),
                message: format!("{origin:?}: {e}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Turns a panic inside a handler into the generic 500 body.
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_response as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Quote computation panicked");
    internal_error().into_response()
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(mut request: Request<axum::body::Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header_name = HeaderName::from_static(CORRELATION_ID_HEADER);

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert(header_name.clone(), value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(header_name, value);
    }
    response
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn create_quote(
    State(state): State<AppState>,
    Path(product_type): Path<String>,
    payload: Result<Json<QuoteRequestBody>, JsonRejection>,
) -> ApiResult<QuoteResponse> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected malformed quote request");
        bad_request_error(&rejection.body_text())
    })?;

    let (identity, data) = match (body.identity, body.data) {
        (Some(identity), Some(data)) if !identity.is_empty() && !data.is_null() => {
            (identity, data)
        }
        _ => {
            warn!(product_type = %product_type, "Quote request missing identity or data");
            return Err(bad_request_error(MISSING_FIELDS_MESSAGE));
        }
    };

    let product_type: ProductType = product_type.parse().map_err(|e: PricingError| {
        warn!(error = %e, "Quote request for unsupported product");
        bad_request_error("Invalid product type")
    })?;

    let data = ProductData::from_value(product_type, data).map_err(|e| {
        warn!(error = %e, "Quote request with invalid data");
        bad_request_error(&e.to_string())
    })?;

    info!(
        product_type = %product_type,
        identity_length = identity.len(),
        "Processing quote request"
    );

    let offers = state
        .engine()
        .compute_offers(product_type, &data)
        .map_err(|e| {
            error!(error = %e, "Failed to compute offers");
            internal_error()
        })?;

    info!(
        product_type = %product_type,
        offers = offers.len(),
        "Quote request completed successfully"
    );

    Ok(Json(QuoteResponse { offers }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_router() -> Router {
        build_router(AppState::new(Some(2024)))
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_quote(product_type: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/quotes/{product_type}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = make_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(CORRELATION_ID_HEADER));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_auto_quote() {
        let (status, body) = call(
            make_router(),
            post_quote(
                "auto",
                json!({
                    "identity": "12345678901",
                    "data": { "year": "2024", "brand": "Toyota", "birthDate": "01/01/2000", "hasTracker": "sim" }
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let offers = body["offers"].as_array().unwrap();
        assert_eq!(offers.len(), 3);
        assert_eq!(offers[0]["insurerName"], "Porto Seguro Auto");
        assert!((offers[0]["premium"].as_f64().unwrap() - 3315.0).abs() < 1e-9);
        assert_eq!(offers[0]["discounts"][0]["name"], "Rastreador");
    }

    #[tokio::test]
    async fn test_residential_quote_accepts_cpf_alias() {
        let (status, body) = call(
            make_router(),
            post_quote(
                "residencial",
                json!({
                    "cpf": "123.456.789-01",
                    "data": { "totalArea": "250", "propertyType": "casa", "postalCode": "01310-100", "hasAlarm": "nao" }
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let offers = body["offers"].as_array().unwrap();
        assert!((offers[1]["premium"].as_f64().unwrap() - 2300.0).abs() < 1e-9);
        assert!(offers[1].get("discounts").is_none());
    }

    #[tokio::test]
    async fn test_missing_identity_is_bad_request() {
        let (status, body) = call(
            make_router(),
            post_quote("auto", json!({ "data": { "year": "2020" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MISSING_FIELDS_MESSAGE);

        let (status, _) = call(
            make_router(),
            post_quote("auto", json!({ "identity": "12345678901" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_fields_checked_before_product_type() {
        let (status, body) = call(make_router(), post_quote("vida", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MISSING_FIELDS_MESSAGE);
    }

    #[tokio::test]
    async fn test_unknown_product_type_is_bad_request() {
        let (status, body) = call(
            make_router(),
            post_quote("vida", json!({ "identity": "12345678901", "data": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid product type");
    }

    #[tokio::test]
    async fn test_non_object_data_is_bad_request() {
        let (status, _) = call(
            make_router(),
            post_quote("auto", json!({ "identity": "12345678901", "data": [1, 2] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/quotes/auto")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = call(make_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_panic_becomes_generic_server_error() {
        async fn explode() -> Json<Value> {
            panic!("boom")
        }
        let router = Router::new()
            .route("/explode", get(explode))
            .layer(catch_panic_layer());

        let request = Request::builder()
            .uri("/explode")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(router, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_wildcard_origin_is_config_error() {
        let err = cors_layer(&["*".to_string()]).unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));

        let config = ServiceConfig {
            cors_origins: vec!["http://localhost:3000".to_string(), "*".to_string()],
            ..ServiceConfig::default()
        };
        assert!(create_app(&config).is_err());
    }
}
