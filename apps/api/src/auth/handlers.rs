//! Axum route handlers for authentication and session state.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::client::AuthError;
use crate::auth::role::{self, ConsoleView, Role};
use crate::auth::session::{SessionMode, SessionRecord};
use crate::errors::AppError;
use crate::state::AppState;

// Hard-coded demo override credentials. Checked before any validation or
// collaborator call; an override session never touches the auth service.
const ADMIN_OVERRIDE_EMAIL: &str = "admin@example.com";
const ADMIN_OVERRIDE_PASSWORD: &str = "AdminPass123!";
const MANAGER_OVERRIDE_EMAIL: &str = "manager@example.com";
const MANAGER_OVERRIDE_PASSWORD: &str = "ManagerPass123!";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionMintedResponse {
    pub token: String,
    pub role: Role,
    pub view: ConsoleView,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoverySessionRequest {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub role: Role,
    pub view: ConsoleView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub demo: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetViewRequest {
    pub view: ConsoleView,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: ConsoleView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/auth/login
///
/// Override credentials are checked first and mint an override session
/// without consulting the auth collaborator. Everything else is validated,
/// exchanged for an access token, and stored as a real session.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SessionMintedResponse>, AppError> {
    if request.email == ADMIN_OVERRIDE_EMAIL && request.password == ADMIN_OVERRIDE_PASSWORD {
        let token = state
            .sessions
            .create(&SessionRecord::new(SessionMode::AdminOverride))
            .await?;
        info!("Admin override session granted");
        return Ok(Json(SessionMintedResponse {
            token,
            role: Role::Admin,
            view: ConsoleView::Admin,
        }));
    }

    if request.email == MANAGER_OVERRIDE_EMAIL && request.password == MANAGER_OVERRIDE_PASSWORD {
        let token = state
            .sessions
            .create(&SessionRecord::new(SessionMode::ManagerOverride))
            .await?;
        info!("Manager override session granted");
        return Ok(Json(SessionMintedResponse {
            token,
            role: Role::Manager,
            view: ConsoleView::Admin,
        }));
    }

    validate_credentials(&request.email, &request.password)?;

    let auth_session = state
        .auth
        .sign_in(&request.email, &request.password)
        .await
        .map_err(auth_error)?;

    let email = auth_session.user.email.clone().unwrap_or_default();
    let claim = role::metadata_role(&auth_session.user.user_metadata, &auth_session.user.app_metadata);
    let resolved = role::resolve_role(&email, claim.as_deref(), &state.config.admin_emails);

    let record = SessionRecord::new(SessionMode::Real {
        access_token: auth_session.access_token,
    });
    let token = state.sessions.create(&record).await?;

    Ok(Json(SessionMintedResponse {
        token,
        role: resolved,
        view: role::effective_view(resolved, None),
    }))
}

/// POST /api/v1/auth/signup
///
/// Registers the identity with the auth collaborator, which sends its own
/// confirmation email. No session is minted until the user confirms and
/// logs in.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    validate_credentials(&request.email, &request.password)?;

    state
        .auth
        .sign_up(&request.email, &request.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(StatusResponse {
        status: "confirmation_sent",
    }))
}

/// POST /api/v1/auth/logout
///
/// Deletes the session record. For real sessions the collaborator token is
/// revoked best-effort first; a revocation failure never blocks the local
/// logout.
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    if let Ok(Some(record)) = state.sessions.load(&token).await {
        if let SessionMode::Real { access_token } = &record.mode {
            if let Err(e) = state.auth.sign_out(access_token).await {
                warn!("Collaborator sign-out failed: {e}");
            }
        }
    }

    state.sessions.delete(&token).await?;
    Ok(Json(StatusResponse {
        status: "signed_out",
    }))
}

/// POST /api/v1/auth/recover
///
/// Triggers a password-recovery email.
pub async fn handle_recover(
    State(state): State<AppState>,
    Json(request): Json<RecoverRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    state.auth.recover(&request.email).await.map_err(auth_error)?;

    Ok(Json(StatusResponse {
        status: "recovery_sent",
    }))
}

/// POST /api/v1/auth/recovery-session
///
/// Mints a session from the access token carried by a recovery link, after
/// verifying the token against the auth collaborator. The session is a
/// normal real session; the UI uses it to set a new password.
pub async fn handle_recovery_session(
    State(state): State<AppState>,
    Json(request): Json<RecoverySessionRequest>,
) -> Result<Json<SessionMintedResponse>, AppError> {
    if request.access_token.trim().is_empty() {
        return Err(AppError::Validation("access_token is required".to_string()));
    }

    let user = state
        .auth
        .get_user(&request.access_token)
        .await
        .map_err(|e| {
            warn!("Recovery token rejected: {e}");
            AppError::Auth("Failed to initialize reset session".to_string())
        })?;

    let email = user.email.clone().unwrap_or_default();
    let claim = role::metadata_role(&user.user_metadata, &user.app_metadata);
    let resolved = role::resolve_role(&email, claim.as_deref(), &state.config.admin_emails);

    let record = SessionRecord::new(SessionMode::Real {
        access_token: request.access_token,
    });
    let token = state.sessions.create(&record).await?;

    Ok(Json(SessionMintedResponse {
        token,
        role: resolved,
        view: role::effective_view(resolved, None),
    }))
}

/// PUT /api/v1/auth/password
///
/// Sets a new password for the identity behind a real session. Override
/// sessions have no identity to update.
pub async fn handle_update_password(
    State(state): State<AppState>,
    session: crate::auth::session::CurrentSession,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    validate_password(&request.password)?;

    let SessionMode::Real { access_token } = &session.record.mode else {
        return Err(AppError::Forbidden);
    };

    state
        .auth
        .update_password(access_token, &request.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(StatusResponse {
        status: "password_updated",
    }))
}

/// GET /api/v1/session
///
/// The resolver output: current role, the view to mount, and whether the
/// roster is running on demo data.
pub async fn handle_get_session(
    State(state): State<AppState>,
    session: crate::auth::session::CurrentSession,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(SessionResponse {
        role: session.role,
        view: session.view(),
        email: session.email.clone(),
        demo: state.roster.is_demo(),
    }))
}

/// PUT /api/v1/session/view
///
/// Stores the last-selected regular tab. The admin console is never a
/// stored preference; it is forced by role at resolution time.
pub async fn handle_set_view(
    State(state): State<AppState>,
    session: crate::auth::session::CurrentSession,
    Json(request): Json<SetViewRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    if request.view == ConsoleView::Admin {
        return Err(AppError::Validation(
            "view must be one of linkedin, cold-email, hr-mail".to_string(),
        ));
    }

    let mut record = session.record.clone();
    record.view = request.view;
    state.sessions.save(&session.token, &record).await?;

    Ok(Json(ViewResponse {
        view: role::effective_view(session.role, Some(request.view)),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if !is_valid_email(email) || email.len() > 255 {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    validate_password(password)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if password.len() > 100 {
        return Err(AppError::Validation(
            "Password must be at most 100 characters".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Collaborator errors surface their own message; transport failures get a
/// generic one so wire details never reach the UI.
fn auth_error(error: AuthError) -> AppError {
    match error {
        AuthError::Api { message, .. } => AppError::Auth(message),
        AuthError::Http(e) => {
            warn!("Auth service unreachable: {e}");
            AppError::Auth("Authentication service unavailable".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_normal_addresses() {
        assert!(is_valid_email("you@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_validation_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("you@"));
        assert!(!is_valid_email("you@nodot"));
        assert!(!is_valid_email("you@domain."));
        assert!(!is_valid_email("spaced out@example.com"));
    }

    #[test]
    fn password_bounds_are_enforced() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password(&"x".repeat(101)).is_err());
        assert!(validate_password(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn credential_validation_checks_email_first() {
        let err = validate_credentials("bad", "validpassword").unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Invalid email address"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
