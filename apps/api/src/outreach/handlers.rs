//! Axum route handlers for the three generation features and the mail-link
//! composer.
//!
//! All three features follow the same protocol: validate required fields,
//! make exactly one proxy call, return the trimmed text. Only the HR email
//! feature recovers from a proxy failure with the deterministic local
//! fallback; the other two surface the failure to the user.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::session::CurrentSession;
use crate::errors::AppError;
use crate::outreach::compose::{self, MailParts};
use crate::outreach::fallback::fallback_hr_email;
use crate::outreach::proxy::ProxyError;
use crate::outreach::request::{ColdEmailRequest, HrEmailRequest, LinkedInNoteRequest};
use crate::state::AppState;

/// Everything the UI needs to hand a generated email to a mail client.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeLinks {
    pub subject: String,
    pub body: String,
    pub mailto_url: String,
    pub gmail_url: String,
}

fn compose_links(text: &str, to: &str) -> ComposeLinks {
    let MailParts { subject, body } = compose::split_subject(text);
    ComposeLinks {
        mailto_url: compose::mailto_link(to, &subject, &body),
        gmail_url: compose::gmail_compose_link(to, &subject, &body),
        subject,
        body,
    }
}

/// Logs the proxy failure and wraps it in the feature's user-facing message.
fn generation_error(feature: &str, fallback_message: &str, error: ProxyError) -> AppError {
    warn!("{feature} generation failed: {error}");
    match error {
        ProxyError::Api { message, .. } if !message.trim().is_empty() => {
            AppError::Generation(message)
        }
        _ => AppError::Generation(fallback_message.to_string()),
    }
}

#[derive(Debug, Serialize)]
pub struct LinkedInNoteResponse {
    pub note: String,
    pub char_count: usize,
    pub search_url: String,
}

/// POST /api/v1/generate/linkedin-note
pub async fn handle_linkedin_note(
    State(state): State<AppState>,
    _session: CurrentSession,
    Json(request): Json<LinkedInNoteRequest>,
) -> Result<Json<LinkedInNoteResponse>, AppError> {
    request.validate()?;

    let note = state
        .generation
        .linkedin_note(&request)
        .await
        .map_err(|e| generation_error("LinkedIn note", "Failed to generate note", e))?;

    Ok(Json(LinkedInNoteResponse {
        char_count: note.chars().count(),
        search_url: compose::linkedin_search_url(&request),
        note,
    }))
}

#[derive(Debug, Serialize)]
pub struct ColdEmailResponse {
    pub email: String,
    pub compose: ComposeLinks,
}

/// POST /api/v1/generate/cold-email
pub async fn handle_cold_email(
    State(state): State<AppState>,
    _session: CurrentSession,
    Json(request): Json<ColdEmailRequest>,
) -> Result<Json<ColdEmailResponse>, AppError> {
    request.validate()?;

    let email = state
        .generation
        .cold_email(&request)
        .await
        .map_err(|e| generation_error("Cold email", "Failed to generate email", e))?;

    // Cold emails have no preselected recipient.
    let compose = compose_links(&email, "");
    Ok(Json(ColdEmailResponse { email, compose }))
}

#[derive(Debug, Serialize)]
pub struct HrEmailResponse {
    pub email: String,
    pub fallback_used: bool,
    pub compose: ComposeLinks,
}

/// POST /api/v1/generate/hr-email
///
/// The one feature with a local fallback: any proxy failure (transport
/// error, non-2xx, malformed or empty payload) yields the deterministic
/// composed email instead of an error.
pub async fn handle_hr_email(
    State(state): State<AppState>,
    _session: CurrentSession,
    Json(request): Json<HrEmailRequest>,
) -> Result<Json<HrEmailResponse>, AppError> {
    request.validate()?;

    let (email, fallback_used) = match state.generation.hr_email(&request).await {
        Ok(email) => (email, false),
        Err(e) => {
            warn!("HR email generation failed, using local fallback: {e}");
            let email =
                fallback_hr_email(&request.contact.name, &request.company, &request.key_points);
            (email, true)
        }
    };

    let compose = compose_links(&email, &request.contact.email);
    Ok(Json(HrEmailResponse {
        email,
        fallback_used,
        compose,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MailLinkRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub to: String,
}

/// POST /api/v1/compose/mail-link
///
/// Splits a generated text into subject and body and builds the mail-client
/// links. Used when the UI re-composes after the user edits the text.
pub async fn handle_mail_link(
    _session: CurrentSession,
    Json(request): Json<MailLinkRequest>,
) -> Result<Json<ComposeLinks>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text is required".to_string()));
    }
    Ok(Json(compose_links(&request.text, &request.to)))
}
