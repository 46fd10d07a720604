//! Request extractors that reject with [`ApiError`]
//!
//! axum's own `Json` and `Query` reject with plain-text bodies and a mix of
//! 400/415/422 statuses. These wrappers run the same extraction and turn
//! any rejection into a JSON `400 bad_request`.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Paged {
        limit: Option<i64>,
    }

    fn router() -> Router {
        Router::new()
            .route("/json", post(|ApiJson(body): ApiJson<Named>| async move { body.name }))
            .route(
                "/query",
                get(|ApiQuery(query): ApiQuery<Paged>| async move {
                    query.limit.unwrap_or_default().to_string()
                }),
            )
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::post("/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_json_bad_request() {
        let (status, body) = send(json_request("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_wrongly_typed_field_is_a_json_bad_request() {
        let (status, body) = send(json_request(r#"{"name": 1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_a_json_bad_request() {
        let request = Request::post("/json")
            .body(Body::from(r#"{"name": "a"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_bad_query_is_a_json_bad_request() {
        let request = Request::get("/query?limit=ten").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_valid_input_passes_through() {
        let response = router().oneshot(json_request(r#"{"name": "bakery"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"bakery");
    }
}
