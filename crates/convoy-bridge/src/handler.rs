//! Conversion bridge handler

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::converter::ConverterService;
use crate::model::{ConvertRequest, ConvertResponse};

/// Fixed message returned for any conversion failure
pub const CONVERT_FAILED: &str = "Failed to convert the slide deck";

/// Shared handler state
#[derive(Clone)]
pub struct BridgeState {
    pub converter: Arc<dyn ConverterService>,
}

impl BridgeState {
    pub fn new(converter: Arc<dyn ConverterService>) -> Self {
        Self { converter }
    }
}

/// Create the bridge router
pub fn router(state: BridgeState) -> Router {
    Router::new()
        .route("/api/convert", post(convert))
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

/// POST /api/convert
///
/// Validates the request, invokes the converter once, and passes its
/// reply through untouched. Every response carries JSON and permissive
/// cross-origin headers, whatever the outcome.
#[instrument(skip_all)]
pub async fn convert(State(state): State<BridgeState>, body: Bytes) -> Response {
    let request = match ConvertRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected conversion request");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None);
        }
    };

    info!(
        bucket = %request.bucket_name,
        key = %request.file_key,
        file = %request.file_name,
        converter = state.converter.name(),
        "Invoking converter"
    );

    let payload = match state.converter.invoke(&request).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            warn!("Converter returned no payload");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                CONVERT_FAILED,
                Some("No response from converter"),
            );
        }
        Err(e) => {
            warn!(error = %e, "Converter invocation failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                CONVERT_FAILED,
                Some(&e.to_string()),
            );
        }
    };

    let reply: ConvertResponse = match serde_json::from_slice(&payload) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Converter payload was malformed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                CONVERT_FAILED,
                Some(&e.to_string()),
            );
        }
    };

    match StatusCode::from_u16(reply.status_code) {
        Ok(status) => bridge_response(status, reply.body),
        Err(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            CONVERT_FAILED,
            Some(&format!(
                "Converter returned invalid status {}",
                reply.status_code
            )),
        ),
    }
}

fn error_response(status: StatusCode, error: &str, details: Option<&str>) -> Response {
    let body = serde_json::to_string(&ErrorBody { error, details })
        .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error));
    bridge_response(status, body)
}

/// JSON content type and permissive CORS headers on every response
fn bridge_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConverterError, ConverterResult};
    use axum::body::Body;
    use axum::http::{HeaderMap, Request};
    use tower::ServiceExt;

    /// Replies with a canned payload, or none at all
    struct StaticConverter {
        payload: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl ConverterService for StaticConverter {
        async fn invoke(&self, _request: &ConvertRequest) -> ConverterResult<Option<Bytes>> {
            Ok(self.payload.map(Bytes::from))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    /// Fails at the transport layer
    struct BrokenConverter;

    #[async_trait::async_trait]
    impl ConverterService for BrokenConverter {
        async fn invoke(&self, _request: &ConvertRequest) -> ConverterResult<Option<Bytes>> {
            Err(ConverterError::Unavailable("connection refused".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn app(converter: impl ConverterService + 'static) -> Router {
        router(BridgeState::new(Arc::new(converter)))
    }

    async fn send(app: Router, body: &str) -> (StatusCode, HeaderMap, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/convert")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn assert_bridge_headers(headers: &HeaderMap) {
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["access-control-allow-origin"], "*");
    }

    const VALID: &str = r#"{"bucketName":"b","fileKey":"k","fileName":"deck.pptx"}"#;

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let (status, headers, body) = send(app(StaticConverter { payload: None }), "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_bridge_headers(&headers);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Request body is required");
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let (status, _headers, body) = send(app(StaticConverter { payload: None }), "{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "bucketName, fileKey, and fileName are required");
    }

    #[tokio::test]
    async fn test_unparsable_body_is_rejected() {
        let (status, headers, body) =
            send(app(StaticConverter { payload: None }), "not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_bridge_headers(&headers);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Request body is not valid JSON");
    }

    #[tokio::test]
    async fn test_converter_reply_passes_through_verbatim() {
        let converter = StaticConverter {
            payload: Some(r#"{"statusCode":200,"body":"{\"pages\":3}"}"#),
        };
        let (status, headers, body) = send(app(converter), VALID).await;

        assert_eq!(status, StatusCode::OK);
        assert_bridge_headers(&headers);
        assert_eq!(body, r#"{"pages":3}"#);
    }

    #[tokio::test]
    async fn test_converter_failure_status_passes_through_unchanged() {
        let converter = StaticConverter {
            payload: Some(r#"{"statusCode":422,"body":"{\"error\":\"unreadable deck\"}"}"#),
        };
        let (status, _headers, body) = send(app(converter), VALID).await;

        // the bridge does not reinterpret the converter's status semantics
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, r#"{"error":"unreadable deck"}"#);
    }

    #[tokio::test]
    async fn test_missing_payload_maps_to_upstream_error() {
        let (status, headers, body) = send(app(StaticConverter { payload: None }), VALID).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_bridge_headers(&headers);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], CONVERT_FAILED);
        assert_eq!(json["details"], "No response from converter");
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_500_with_details() {
        let (status, headers, body) = send(app(BrokenConverter), VALID).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_bridge_headers(&headers);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], CONVERT_FAILED);
        assert!(json["details"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_payload_maps_to_500() {
        let converter = StaticConverter {
            payload: Some("garbage"),
        };
        let (status, _headers, body) = send(app(converter), VALID).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], CONVERT_FAILED);
        assert!(json["details"].is_string());
    }
}
