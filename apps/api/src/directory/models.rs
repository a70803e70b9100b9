use serde::Serialize;

/// One HR contact row. `position` is stored as `designation` by the
/// collaborator; the rename happens at fetch time.
#[derive(Debug, Clone, Serialize)]
pub struct HrContact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub position: String,
}

/// One entry in the company browser grid.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyEntry {
    pub name: String,
    pub logo_url: String,
}

impl CompanyEntry {
    pub fn new(name: String) -> Self {
        let logo_url = company_logo_url(&name);
        Self { name, logo_url }
    }
}

/// Logo lookup URL: company name lowercased with whitespace stripped, under
/// the `.com` domain guess.
pub fn company_logo_url(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("https://logo.clearbit.com/{slug}.com")
}
