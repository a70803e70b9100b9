//! Clearly-fictional demo dataset served when the store is unreachable.
//! Every response built from this data is flagged `demo: true`.

use crate::directory::models::HrContact;

pub const DEMO_COMPANIES: [&str; 18] = [
    "Google",
    "Meta",
    "Amazon",
    "Apple",
    "Microsoft",
    "Netflix",
    "Tesla",
    "Adobe",
    "Salesforce",
    "Oracle",
    "IBM",
    "Intel",
    "Nvidia",
    "PayPal",
    "Uber",
    "Airbnb",
    "Spotify",
    "Twitter",
];

/// Fictional HR contacts, reused for every company in demo mode.
pub fn demo_contacts() -> Vec<HrContact> {
    let rows = [
        ("1", "Sarah Johnson", "sarah.j@company.com", "HR Manager"),
        ("2", "Michael Chen", "m.chen@company.com", "Talent Acquisition Lead"),
        ("3", "Emma Williams", "e.williams@company.com", "Senior Recruiter"),
        ("4", "David Brown", "d.brown@company.com", "HR Business Partner"),
        ("5", "Lisa Anderson", "l.anderson@company.com", "Recruitment Specialist"),
    ];

    rows.into_iter()
        .map(|(id, name, email, position)| HrContact {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            position: position.to_string(),
        })
        .collect()
}
