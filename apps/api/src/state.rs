use std::sync::Arc;

use sqlx::PgPool;

use crate::accounts::roster::Roster;
use crate::auth::client::AuthClient;
use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::outreach::proxy::GenerationClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis-backed session store; the UI only ever holds a bearer token.
    pub sessions: SessionStore,
    pub auth: AuthClient,
    pub generation: GenerationClient,
    /// Versioned in-memory roster behind the admin console, kept fresh by
    /// the change-feed task.
    pub roster: Arc<Roster>,
    pub config: Config,
}
