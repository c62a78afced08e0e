//! SubmitNote and ListNotes endpoints.
//!
//! Both authorize before touching the queue. Queue failures surface as
//! `QueueUnavailable`; no partial body is ever returned with a 200.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use notebox_queue::{QueueMessage, MAX_RECEIVE_BATCH};

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

use super::authorization;

/// SQS rejects bodies above 256 KiB.
const MAX_NOTE_BYTES: usize = 256 * 1024;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitNoteRequest {
    pub note: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubmitNoteResponse {
    pub message: String,
    pub note: NoteReceipt,
}

/// The accepted note together with the queue's acknowledgment.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NoteReceipt {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "MessageId")]
    pub message_id: String,
    #[serde(rename = "MD5OfMessageBody")]
    pub md5_of_message_body: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListNotesResponse {
    #[serde(rename = "Messages")]
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<QueueMessage>,
}

/// Characters SQS accepts in a message body.
fn is_queue_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn parse_note(body: &[u8]) -> Result<String, ApiError> {
    let request: SubmitNoteRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if request.note.is_empty() {
        return Err(ApiError::BadRequest("note must not be empty".into()));
    }
    if request.note.len() > MAX_NOTE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "note exceeds {MAX_NOTE_BYTES} bytes"
        )));
    }
    if let Some(c) = request.note.chars().find(|c| !is_queue_char(*c)) {
        return Err(ApiError::BadRequest(format!(
            "note contains unsupported character U+{:04X}",
            c as u32
        )));
    }
    Ok(request.note)
}

// ── Handlers ─────────────────────────────────────────────────────

/// Enqueue a note.
#[utoipa::path(
    post,
    path = "/notes",
    tag = "Notes",
    request_body = SubmitNoteRequest,
    security(("basic" = [])),
    responses(
        (status = 200, description = "Note accepted by the queue", body = SubmitNoteResponse),
        (status = 400, description = "Malformed header or body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 502, description = "Credential store unavailable", body = ErrorResponse),
        (status = 503, description = "Queue unavailable", body = ErrorResponse)
    )
)]
pub async fn submit_note(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitNoteResponse>, ApiError> {
    info!(bytes = body.len(), "SubmitNote request received");

    state.credentials.authorize(authorization(&headers)?).await?;
    let note = parse_note(&body)?;

    let receipt = state.queue.send(&note).await.map_err(|e| {
        error!(provider = state.queue.provider(), error = %e, "Failed to send note");
        ApiError::QueueUnavailable
    })?;

    info!(message_id = %receipt.message_id, "Note sent to the queue");
    Ok(Json(SubmitNoteResponse {
        message: "Note sent to the Queue successfully".to_string(),
        note: NoteReceipt {
            message: note,
            message_id: receipt.message_id,
            md5_of_message_body: receipt.md5_of_body,
        },
    }))
}

/// Receive up to ten queued notes.
#[utoipa::path(
    get,
    path = "/notes",
    tag = "Notes",
    security(("basic" = [])),
    responses(
        (status = 200, description = "Received messages (possibly none)", body = ListNotesResponse),
        (status = 400, description = "Malformed header", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 502, description = "Credential store unavailable", body = ErrorResponse),
        (status = 503, description = "Queue unavailable", body = ErrorResponse)
    )
)]
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ListNotesResponse>, ApiError> {
    info!("ListNotes request received");

    state.credentials.authorize(authorization(&headers)?).await?;

    let messages = state.queue.receive(MAX_RECEIVE_BATCH).await.map_err(|e| {
        error!(provider = state.queue.provider(), error = %e, "Failed to receive notes");
        ApiError::QueueUnavailable
    })?;

    info!(count = messages.len(), "ListNotes succeeded");
    Ok(Json(ListNotesResponse { messages }))
}
