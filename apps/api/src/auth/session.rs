//! Server-side sessions backed by Redis.
//!
//! The UI holds only an opaque bearer token; everything the dashboard keeps
//! per session (auth mode, active tab, selection set) lives here as one JSON
//! blob with a sliding TTL. Role is derived from the mode on every request,
//! never stored, so an auth-state change is observed immediately.

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::auth::role::{self, ConsoleView, Role};
use crate::errors::AppError;
use crate::selection::SelectionSet;
use crate::state::AppState;

const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const SESSION_KEY_PREFIX: &str = "session:";

/// How a session authenticates. Override modes bypass the auth collaborator
/// entirely; a real session carries the collaborator's access token. One
/// record holds exactly one mode, so at most one override is ever in effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionMode {
    Real { access_token: String },
    AdminOverride,
    ManagerOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub mode: SessionMode,
    #[serde(default)]
    pub view: ConsoleView,
    #[serde(default)]
    pub selection: SelectionSet,
}

impl SessionRecord {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            view: ConsoleView::default(),
            selection: SelectionSet::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SessionStore {
    client: redis::Client,
}

impl SessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(token: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{token}")
    }

    /// Mints a fresh token and stores the record under it.
    pub async fn create(&self, record: &SessionRecord) -> Result<String, AppError> {
        let token = Uuid::new_v4().to_string();
        self.save(&token, record).await?;
        Ok(token)
    }

    pub async fn save(&self, token: &str, record: &SessionRecord) -> Result<(), AppError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(anyhow::Error::from)?;
        let json = serde_json::to_string(record).map_err(anyhow::Error::from)?;
        let _: () = conn
            .set_ex(Self::key(token), json, SESSION_TTL_SECS)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    pub async fn load(&self, token: &str) -> Result<Option<SessionRecord>, AppError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(anyhow::Error::from)?;
        let json: Option<String> = conn
            .get(Self::key(token))
            .await
            .map_err(anyhow::Error::from)?;

        match json {
            None => Ok(None),
            Some(json) => match serde_json::from_str(&json) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    // An unreadable record is a dead session, not a crash.
                    warn!("Discarding unreadable session record: {e}");
                    Ok(None)
                }
            },
        }
    }

    pub async fn delete(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(anyhow::Error::from)?;
        let _: () = conn
            .del(Self::key(token))
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

/// A resolved session: the stored record plus the role and identity derived
/// from its auth mode. Resolving a real session consults the auth
/// collaborator, so sign-out or token expiry upstream is observed here.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub record: SessionRecord,
    pub role: Role,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl CurrentSession {
    /// The view to mount right now, after role gating.
    pub fn view(&self) -> ConsoleView {
        role::effective_view(self.role, Some(self.record.view))
    }
}

/// Resolves a bearer token into a session. Any failure along the way (no
/// record, unreadable record, auth collaborator error) is "no session";
/// callers get a 401 with the login boundary, never an indeterminate state.
pub async fn resolve(state: &AppState, token: &str) -> Result<CurrentSession, AppError> {
    let record = match state.sessions.load(token).await {
        Ok(Some(record)) => record,
        Ok(None) => return Err(AppError::Unauthorized),
        Err(e) => {
            warn!("Session lookup failed, treating as no session: {e}");
            return Err(AppError::Unauthorized);
        }
    };

    let (role, email, full_name) = match override_identity(&record.mode) {
        Some((role, email)) => (role, Some(email.to_string()), None),
        None => {
            let SessionMode::Real { access_token } = &record.mode else {
                return Err(AppError::Unauthorized);
            };
            let user = match state.auth.get_user(access_token).await {
                Ok(user) => user,
                Err(e) => {
                    warn!("Auth lookup failed, treating as no session: {e}");
                    let _ = state.sessions.delete(token).await;
                    return Err(AppError::Unauthorized);
                }
            };

            let email = user.email.clone().unwrap_or_default();
            let claim = role::metadata_role(&user.user_metadata, &user.app_metadata);
            let resolved = role::resolve_role(&email, claim.as_deref(), &state.config.admin_emails);
            let full_name = user
                .user_metadata
                .get("full_name")
                .and_then(Value::as_str)
                .map(str::to_string);
            (resolved, user.email, full_name)
        }
    };

    Ok(CurrentSession {
        token: token.to_string(),
        record,
        role,
        email,
        full_name,
    })
}

/// Role and identity of an override session. Overrides never consult the
/// auth collaborator, so the mapping is fixed by the mode alone; a real
/// session has no fixed identity and yields `None`.
fn override_identity(mode: &SessionMode) -> Option<(Role, &'static str)> {
    match mode {
        SessionMode::AdminOverride => Some((Role::Admin, "admin@example.com")),
        SessionMode::ManagerOverride => Some((Role::Manager, role::MANAGER_SENTINEL_EMAIL)),
        SessionMode::Real { .. } => None,
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        resolve(state, &token).await
    }
}

/// Extractor for routes open to admin and manager sessions.
pub struct RequireStaff(pub CurrentSession);

#[async_trait]
impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let session = CurrentSession::from_request_parts(parts, state).await?;
        if !matches!(session.role, Role::Admin | Role::Manager) {
            return Err(AppError::Forbidden);
        }
        Ok(Self(session))
    }
}

/// Extractor for admin-only routes.
pub struct RequireAdmin(pub CurrentSession);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let session = CurrentSession::from_request_parts(parts, state).await?;
        if session.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        Ok(Self(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/session");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_is_extracted() {
        let parts = parts_with_auth(Some("Bearer abc-123"));
        assert_eq!(bearer_token(&parts), Some("abc-123".to_string()));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer "))), None);
    }

    #[test]
    fn session_mode_serializes_with_a_mode_tag() {
        let json = serde_json::to_value(SessionMode::AdminOverride).unwrap();
        assert_eq!(json["mode"], "admin_override");

        let json = serde_json::to_value(SessionMode::Real {
            access_token: "tok".to_string(),
        })
        .unwrap();
        assert_eq!(json["mode"], "real");
        assert_eq!(json["access_token"], "tok");
    }

    #[test]
    fn record_defaults_fill_missing_fields() {
        let record: SessionRecord = serde_json::from_str(r#"{"mode":"manager_override"}"#).unwrap();
        assert!(matches!(record.mode, SessionMode::ManagerOverride));
        assert_eq!(record.view, ConsoleView::LinkedIn);
        assert_eq!(record.selection.count(), 0);
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record = SessionRecord::new(SessionMode::Real {
            access_token: "tok".to_string(),
        });
        record.view = ConsoleView::HrMail;
        record.selection.toggle("u1");

        let json = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.mode, SessionMode::Real { ref access_token } if access_token == "tok"));
        assert_eq!(back.view, ConsoleView::HrMail);
        assert!(back.selection.is_selected("u1"));
    }

    #[test]
    fn override_modes_carry_their_role_without_external_data() {
        assert_eq!(
            override_identity(&SessionMode::AdminOverride),
            Some((Role::Admin, "admin@example.com"))
        );
        assert_eq!(
            override_identity(&SessionMode::ManagerOverride),
            Some((Role::Manager, role::MANAGER_SENTINEL_EMAIL))
        );
        assert_eq!(
            override_identity(&SessionMode::Real {
                access_token: "tok".to_string(),
            }),
            None
        );
    }

    #[test]
    fn new_record_starts_on_the_default_tab() {
        let record = SessionRecord::new(SessionMode::AdminOverride);
        assert_eq!(record.view, ConsoleView::LinkedIn);
        assert!(record.selection.is_empty());
    }
}
