use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use learnhub_auth::AccessError;
use learnhub_core::DomainError;
use learnhub_infra::{RepoError, StoreError};

pub type ApiResult<T> = Result<T, ApiError>;

/// The one error type handlers and middleware return.
///
/// Serialized as `{error, message, code}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error: &'static str,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error,
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.name(), err.code(), err.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let (status, error, code) = match &err {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError", "VALIDATION_ERROR"),
            DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "ValidationError", "INVALID_ID"),
            DomainError::InvariantViolation(_) => {
                (StatusCode::BAD_REQUEST, "ValidationError", "INVARIANT_VIOLATION")
            }
            DomainError::Conflict(_) => (StatusCode::CONFLICT, "ConflictError", "CONFLICT"),
        };
        Self::new(status, error, code, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "ConflictError", "CONFLICT", msg),
            StoreError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "ResourceNotFoundError",
                "RESOURCE_NOT_FOUND",
                "not found",
            ),
            other => {
                tracing::error!(error = %other, "storage failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "INTERNAL_ERROR",
                    "internal error",
                )
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Access(e) => e.into(),
            RepoError::Domain(e) => e.into(),
            RepoError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_error(self.status, self.error, self.code, self.message)
    }
}

pub fn json_error(
    status: StatusCode,
    error: &'static str,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": error,
            "message": message.into(),
            "code": code,
        })),
    )
        .into_response()
}

/// Parse a path identifier; malformed ids are a 400, not a 404.
pub fn parse_id<T>(raw: &str) -> ApiResult<T>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ApiError::from)
}
