use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use xuav_core::XuavError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    ServiceUnavailable(String),
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
    pub status: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Map a store error, prefixing store failures with `context`.
    pub fn from_store(context: &str, err: XuavError) -> Self {
        match err {
            XuavError::NotFound(msg) => ApiError::NotFound(msg),
            XuavError::InvalidInput(msg) => ApiError::Validation(msg),
            XuavError::Conflict(msg) => ApiError::Conflict(format!("Already exists: {}", msg)),
            other => {
                error!("{}: {}", context, other);
                ApiError::Internal(format!("{}: {}", context, other))
            }
        }
    }
}

impl From<XuavError> for ApiError {
    fn from(err: XuavError) -> Self {
        ApiError::from_store("Internal server error", err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            detail: self.to_string(),
            status: status.as_u16(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Closure adapter for `map_err` on store calls.
pub(crate) fn store_err(context: &'static str) -> impl Fn(XuavError) -> ApiError {
    move |err| ApiError::from_store(context, err)
}
