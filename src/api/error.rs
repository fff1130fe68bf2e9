use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use super::observability::RequestOutcome;
use crate::domain::CriteriaError;
use crate::services::SearchError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ExternalApiError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// How the request ended, as seen by metrics and request logs.
    #[must_use]
    pub const fn outcome(&self) -> RequestOutcome {
        match self {
            ApiError::NotFound(_) => RequestOutcome::LocationNotFound,
            ApiError::ExternalApiError { .. } => RequestOutcome::UpstreamFailure,
            ApiError::ValidationError(_) => RequestOutcome::InvalidQuery,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let outcome = self.outcome();
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!("{} upstream error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} error: {}", service, message),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(outcome);
        response
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::LocationNotFound(_) => {
                ApiError::NotFound("Invalid postcode or location not found".to_string())
            }
            SearchError::Geocoding(e) => ApiError::geocoding_error(e.to_string()),
            SearchError::Listings(e) => ApiError::listings_error(e.to_string()),
        }
    }
}

impl From<CriteriaError> for ApiError {
    fn from(err: CriteriaError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl ApiError {
    pub fn geocoding_error(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Geocoding".to_string(),
            message: msg.into(),
        }
    }

    pub fn listings_error(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Listings".to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }
}
