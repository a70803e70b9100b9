pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::auth::handlers as auth;
use crate::directory::handlers as directory;
use crate::outreach::handlers as outreach;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth and session state
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/recover", post(auth::handle_recover))
        .route(
            "/api/v1/auth/recovery-session",
            post(auth::handle_recovery_session),
        )
        .route("/api/v1/auth/password", put(auth::handle_update_password))
        .route("/api/v1/session", get(auth::handle_get_session))
        .route("/api/v1/session/view", put(auth::handle_set_view))
        // Outreach generation
        .route(
            "/api/v1/generate/linkedin-note",
            post(outreach::handle_linkedin_note),
        )
        .route(
            "/api/v1/generate/cold-email",
            post(outreach::handle_cold_email),
        )
        .route("/api/v1/generate/hr-email", post(outreach::handle_hr_email))
        .route("/api/v1/compose/mail-link", post(outreach::handle_mail_link))
        // Company browser
        .route("/api/v1/companies", get(directory::handle_list_companies))
        .route(
            "/api/v1/companies/:company/contacts",
            get(directory::handle_company_contacts),
        )
        // Admin console
        .route(
            "/api/v1/admin/users",
            get(accounts::handle_list_users).post(accounts::handle_create_user),
        )
        .route(
            "/api/v1/admin/users/:id/status",
            patch(accounts::handle_update_status),
        )
        .route(
            "/api/v1/admin/users/:id/owner",
            patch(accounts::handle_update_owner),
        )
        .route("/api/v1/admin/owners", get(accounts::handle_list_owners))
        .route(
            "/api/v1/admin/selection/toggle",
            post(accounts::handle_selection_toggle),
        )
        .route(
            "/api/v1/admin/selection/toggle-all",
            post(accounts::handle_selection_toggle_all),
        )
        .route(
            "/api/v1/admin/selection/clear",
            post(accounts::handle_selection_clear),
        )
        .route("/api/v1/admin/leads/assign", post(accounts::handle_assign_leads))
        .route("/api/v1/admin/events", get(accounts::handle_events))
        .with_state(state)
}
