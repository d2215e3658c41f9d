//! Body and query extractors whose rejections use the API error shape.
//!
//! axum's own `Json`/`Query` reject with 4xx plain-text bodies; every client
//! error here is a 400 `VALIDATION_ERROR` instead.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::app::errors::ApiError;

/// `Json<T>` with malformed bodies reported as validation errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "rejected request body");
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    enum Color {
        Red,
    }

    #[derive(Debug, Deserialize)]
    struct Paint {
        color: Color,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/paint")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_enum_variant_is_a_validation_error() {
        let err = ApiJson::<Paint>::from_request(json_request(r#"{"color":"PLAID"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn syntax_errors_and_missing_content_type_are_bad_requests() {
        let err = ApiJson::<Paint>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method("POST")
            .uri("/paint")
            .body(Body::from(r#"{"color":"RED"}"#))
            .unwrap();
        let err = ApiJson::<Paint>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_bodies_pass_through() {
        let ApiJson(paint) = ApiJson::<Paint>::from_request(json_request(r#"{"color":"RED"}"#), &())
            .await
            .unwrap();
        assert!(matches!(paint.color, Color::Red));
    }

    #[tokio::test]
    async fn malformed_queries_are_validation_errors() {
        #[derive(Debug, Deserialize)]
        struct Page {
            #[allow(dead_code)]
            limit: u32,
        }

        let req = Request::builder().uri("/logs?limit=lots").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();
        let err = ApiQuery::<Page>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
