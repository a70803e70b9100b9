//! Roster records for the admin console and the commit outcome every
//! mutation reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner sentinel for records nobody manages yet.
pub const UNASSIGNED_OWNER: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingStatus {
    Paid,
    Unpaid,
}

impl BillingStatus {
    /// Anything that is not "paid" (case-insensitively) is unpaid.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("paid") => BillingStatus::Paid,
            _ => BillingStatus::Unpaid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Paid => "paid",
            BillingStatus::Unpaid => "unpaid",
        }
    }
}

/// One admin-console row, already shaped for display: missing names become
/// "N/A", a missing owner becomes the `Unassigned` sentinel, timestamps are
/// pre-formatted strings.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub manager: String,
    pub status: BillingStatus,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl UserRecord {
    /// Case-insensitive substring search over the fields the admin table
    /// shows.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.name, &self.email, &self.role, &self.manager]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Raw `user_accounts` row as the store returns it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAccountRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub manager: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<UserAccountRow> for UserRecord {
    fn from(row: UserAccountRow) -> Self {
        UserRecord {
            id: row.id.to_string(),
            name: row.full_name.filter(|n| !n.is_empty()).unwrap_or_else(|| "N/A".to_string()),
            email: row.email.filter(|e| !e.is_empty()).unwrap_or_else(|| "N/A".to_string()),
            role: row.role.filter(|r| !r.is_empty()).unwrap_or_else(|| "user".to_string()),
            manager: row
                .manager
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNASSIGNED_OWNER.to_string()),
            status: BillingStatus::parse(row.status.as_deref()),
            created_at: row
                .created_at
                .unwrap_or_else(Utc::now)
                .format("%Y-%m-%d")
                .to_string(),
            last_login: row
                .last_sign_in_at
                .map(|t| t.format("%b %-d, %Y, %H:%M").to_string()),
        }
    }
}

/// Explicit result of a roster mutation. The roster is only updated after a
/// `Committed`; persistence failures come back as `Rejected`, never as a
/// silent local edit. `durable: false` marks a demo-mode commit that exists
/// only in memory.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed { durable: bool },
    Rejected { reason: String },
}
