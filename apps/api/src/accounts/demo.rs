//! Clearly-fictional roster served when the store is unreachable. While this
//! data is live every mutation is local-only (`durable: false`).

use crate::accounts::models::{BillingStatus, UserRecord};

/// Fixed assign-to-owner choices for the bulk action.
pub const OWNERS: [&str; 4] = [
    "Sarah Johnson",
    "Michael Chen",
    "Robert Wilson",
    "Jennifer Lee",
];

pub fn demo_users() -> Vec<UserRecord> {
    let rows = [
        ("demo-1", "Alice Carter", "alice.c@demo.example", "user", "Sarah Johnson", BillingStatus::Paid, "2025-02-11"),
        ("demo-2", "Ben Osei", "ben.o@demo.example", "user", "Unassigned", BillingStatus::Unpaid, "2025-02-08"),
        ("demo-3", "Chitra Rao", "chitra.r@demo.example", "manager", "Sarah Johnson", BillingStatus::Paid, "2025-01-27"),
        ("demo-4", "Daniel Kim", "daniel.k@demo.example", "user", "Robert Wilson", BillingStatus::Unpaid, "2025-01-15"),
        ("demo-5", "Elena Petrova", "elena.p@demo.example", "user", "Unassigned", BillingStatus::Unpaid, "2024-12-30"),
    ];

    rows.into_iter()
        .map(
            |(id, name, email, role, manager, status, created_at)| UserRecord {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role: role.to_string(),
                manager: manager.to_string(),
                status,
                created_at: created_at.to_string(),
                last_login: None,
            },
        )
        .collect()
}
