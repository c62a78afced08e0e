//! Request failure taxonomy and its HTTP mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Body of every non-200 response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{path} does not accept {method} requests")]
    MethodNotAllowed { method: String, path: String },

    #[error("Authorization token required.")]
    MissingAuth,

    #[error("Malformed authorization header: {0}")]
    MalformedAuth(&'static str),

    #[error("Authorization credentials invalid. Try again")]
    InvalidCredentials,

    #[error("Credential store unavailable")]
    SecretUnavailable,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Note queue unavailable")]
    QueueUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingAuth | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MalformedAuth(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SecretUnavailable => StatusCode::BAD_GATEWAY,
            ApiError::QueueUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Basic realm=\"notebox\"")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
