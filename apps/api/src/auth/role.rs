//! Pure role resolution.
//!
//! Role is derived, never stored: given what the auth collaborator says about
//! an identity (email plus metadata) and the configured admin allow-list, the
//! same inputs always resolve to the same role. Override sessions bypass this
//! entirely and carry their role directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hard-coded manager sentinel address. An identity with this email resolves
/// to manager even without a metadata role.
pub const MANAGER_SENTINEL_EMAIL: &str = "manager@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
}

/// Top-level view of the dashboard. The regular-user tabs persist across
/// sessions; `Admin` is never a stored preference, it is forced by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleView {
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "cold-email")]
    ColdEmail,
    #[serde(rename = "hr-mail")]
    HrMail,
    #[serde(rename = "admin")]
    Admin,
}

impl Default for ConsoleView {
    fn default() -> Self {
        ConsoleView::LinkedIn
    }
}

/// Extracts the role claim from auth metadata. User metadata wins over app
/// metadata, and both `role` and `Role` spellings are honored.
pub fn metadata_role(user_metadata: &Value, app_metadata: &Value) -> Option<String> {
    for metadata in [user_metadata, app_metadata] {
        for key in ["role", "Role"] {
            if let Some(role) = metadata.get(key).and_then(Value::as_str) {
                return Some(role.to_string());
            }
        }
    }
    None
}

/// Resolves the role for a real authenticated identity.
///
/// Admin checks run before manager checks, so an identity matching both (e.g.
/// the manager sentinel email present in the admin allow-list) is admin.
pub fn resolve_role(email: &str, metadata_role: Option<&str>, admin_emails: &[String]) -> Role {
    let email = email.to_lowercase();
    let claims_role = |wanted: &str| {
        metadata_role
            .map(|r| r.eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    };

    if claims_role("admin") || admin_emails.iter().any(|allowed| allowed == &email) {
        Role::Admin
    } else if claims_role("manager") || email == MANAGER_SENTINEL_EMAIL {
        Role::Manager
    } else {
        Role::User
    }
}

/// Picks the view to mount for a resolved role.
///
/// Admin and manager land on the admin console regardless of any stored tab.
/// A regular user gets their last-selected tab, except that a stored `Admin`
/// view is reset to the default tab so a role downgrade can never leave the
/// privileged view mounted.
pub fn effective_view(role: Role, stored: Option<ConsoleView>) -> ConsoleView {
    match role {
        Role::Admin | Role::Manager => ConsoleView::Admin,
        Role::User => match stored {
            Some(ConsoleView::Admin) | None => ConsoleView::default(),
            Some(view) => view,
        },
    }
}
