use super::errors::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;

pub type HttpResult = Result<Response, ApiError>;

const INTERNAL_SERVER_ERROR: &str = "internal server error";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorReport {
    #[schema(example = "internal server error")]
    pub error: String,

    /// Field-level validation detail, keyed by field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }
}

#[derive(Debug, Clone)]
pub enum HttpError {
    BadRequest { error: ErrorReport },
    NotFound { message: Cow<'static, str> },
    Internal { error: ErrorReport },
}

impl From<ApiError> for HttpError {
    fn from(error: ApiError) -> Self {
        match &error {
            ApiError::Validation(errors) => {
                tracing::warn!(%error, "rejected invalid request");
                Self::BadRequest {
                    error: ErrorReport {
                        error: error.to_string(),
                        details: serde_json::to_value(errors).ok(),
                    },
                }
            },

            ApiError::Query(_) => {
                tracing::warn!(%error, "rejected invalid request");
                Self::BadRequest { error: ErrorReport::new(error.to_string()) }
            },

            // upstream detail is logged but never returned to the caller
            ApiError::Temperature(_)
            | ApiError::IO(_)
            | ApiError::HttpEngine(_)
            | ApiError::Join(_) => {
                tracing::error!(?error, "HTTP handler error: {error}");
                Self::Internal { error: ErrorReport::new(INTERNAL_SERVER_ERROR) }
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound { message } => (StatusCode::NOT_FOUND, Json(message)).into_response(),
            Self::BadRequest { error } => (StatusCode::BAD_REQUEST, Json(error)).into_response(),
            Self::Internal { error } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
