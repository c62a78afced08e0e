//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "notebox API",
        description = "Issue a Basic-style token, then submit and receive notes through a durable queue.",
    ),
    tags(
        (name = "Health", description = "Server and queue readiness"),
        (name = "Auth", description = "Token issuance from the stored credential record"),
        (name = "Notes", description = "Enqueue and receive notes"),
    ),
    paths(
        crate::api::health::health,
        crate::api::auth::issue_token,
        crate::api::notes::submit_note,
        crate::api::notes::list_notes,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::api::auth::IssueTokenResponse,
        crate::api::notes::SubmitNoteRequest,
        crate::api::notes::SubmitNoteResponse,
        crate::api::notes::NoteReceipt,
        crate::api::notes::ListNotesResponse,
        crate::api::health::HealthResponse,
    )),
    modifiers(&BasicAuth)
)]
pub struct ApiDoc;

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}
