//! Note gateway endpoints.
//!
//! Each sub-module owns one area; shared request helpers live here.

mod auth;
pub mod doc;
mod health;
mod notes;

#[cfg(test)]
mod tests;

use axum::http::{header, HeaderMap, Method, Uri};

use crate::error::ApiError;

/// Read the `Authorization` header, if any.
///
/// A header that is present but not visible ASCII is malformed, not missing.
pub(crate) fn authorization(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|v| {
            v.to_str()
                .map_err(|_| ApiError::MalformedAuth("header is not valid ASCII"))
        })
        .transpose()
}

/// Fallback for routes hit with a method they do not serve.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

pub use auth::issue_token;
pub use health::health;
pub use notes::{list_notes, submit_note};
