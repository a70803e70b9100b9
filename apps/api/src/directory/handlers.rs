//! Axum route handlers for the company browser.
//!
//! Letter bucketing fetches from the store; the free-text search only
//! narrows what is already fetched and never triggers a fetch by itself.
//! Store failures fall back to the fictional demo dataset instead of an
//! error page.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::session::CurrentSession;
use crate::directory::demo::{demo_contacts, DEMO_COMPANIES};
use crate::directory::models::{CompanyEntry, HrContact};
use crate::directory::repo;
use crate::errors::AppError;
use crate::listing::{self, Paged};
use crate::state::AppState;

const CONTACTS_PER_PAGE: usize = 20;

#[derive(Debug, Deserialize)]
pub struct CompaniesQuery {
    pub letter: Option<String>,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub letter: char,
    pub companies: Vec<CompanyEntry>,
    pub shown: usize,
    pub total_companies: i64,
    pub demo: bool,
}

/// GET /api/v1/companies?letter=A&search=
pub async fn handle_list_companies(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<CompaniesQuery>,
) -> Result<Json<CompaniesResponse>, AppError> {
    let letter = match &query.letter {
        None => 'A',
        Some(raw) => listing::normalize_letter(raw).ok_or_else(|| {
            AppError::Validation("letter must be a single letter A-Z".to_string())
        })?,
    };

    let (names, total, demo) = match fetch_bucket(&state, letter).await {
        Ok((names, total)) => (names, total, false),
        Err(e) => {
            warn!("Company fetch failed, serving demo data: {e}");
            let names: Vec<String> = DEMO_COMPANIES
                .iter()
                .filter(|name| listing::starts_with_letter(name, letter))
                .map(|name| name.to_string())
                .collect();
            (names, DEMO_COMPANIES.len() as i64, true)
        }
    };

    let companies: Vec<CompanyEntry> = names
        .into_iter()
        .filter(|name| listing::matches_search(name, &query.search))
        .map(CompanyEntry::new)
        .collect();

    Ok(Json(CompaniesResponse {
        letter,
        shown: companies.len(),
        companies,
        total_companies: total,
        demo,
    }))
}

async fn fetch_bucket(state: &AppState, letter: char) -> Result<(Vec<String>, i64), sqlx::Error> {
    let total = repo::count_companies(&state.db).await?;
    let names = repo::companies_with_prefix(&state.db, letter).await?;
    Ok((names, total))
}

#[derive(Debug, Deserialize)]
pub struct ContactsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    #[serde(flatten)]
    pub page: Paged<HrContact>,
    pub demo: bool,
}

/// GET /api/v1/companies/:company/contacts?page=1
pub async fn handle_company_contacts(
    State(state): State<AppState>,
    _session: CurrentSession,
    Path(company): Path<String>,
    Query(query): Query<ContactsQuery>,
) -> Result<Json<ContactsResponse>, AppError> {
    if company.trim().is_empty() {
        return Err(AppError::Validation("company is required".to_string()));
    }

    let (contacts, demo) = match repo::contacts_for_company(&state.db, &company).await {
        Ok(contacts) => (contacts, false),
        Err(e) => {
            warn!("HR contact fetch failed for {company}, serving demo data: {e}");
            (demo_contacts(), true)
        }
    };

    let page = listing::paginate(&contacts, query.page, CONTACTS_PER_PAGE);
    Ok(Json(ContactsResponse { page, demo }))
}
