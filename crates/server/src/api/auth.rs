//! Token issuance endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct IssueTokenResponse {
    pub message: String,
    /// `Basic <base64(username:token)>`, ready for the `Authorization` header.
    pub token: String,
}

/// Issue the Basic-style token derived from the stored credential record.
#[utoipa::path(
    get,
    path = "/auth-token",
    tag = "Auth",
    responses(
        (status = 200, description = "Token issued", body = IssueTokenResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 502, description = "Credential store unavailable", body = ErrorResponse)
    )
)]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    info!("IssueToken request received");

    let token = state.credentials.issue_token().await?;

    info!("IssueToken succeeded");
    Ok(Json(IssueTokenResponse {
        message: "Successfully authenticated. Use the token below to access other endpoints.".to_string(),
        token,
    }))
}
