//! Queries against the collaborator-owned `hr_contacts` table.
//!
//! The table holds one row per HR contact with a plain-string company
//! foreign key. Company browsing is a distinct-prefix query; contact lookup
//! is an equality query on the company name.

use sqlx::PgPool;
use uuid::Uuid;

use crate::directory::models::HrContact;

/// Count of distinct companies across the whole table, independent of the
/// active letter bucket.
pub async fn count_companies(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(DISTINCT company) FROM hr_contacts")
        .fetch_one(pool)
        .await
}

/// Distinct company names starting with the given letter, ordered. The
/// letter is a single ASCII alphabetic character, so the ILIKE pattern needs
/// no escaping.
pub async fn companies_with_prefix(pool: &PgPool, letter: char) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT DISTINCT company FROM hr_contacts WHERE company ILIKE $1 ORDER BY company",
    )
    .bind(format!("{letter}%"))
    .fetch_all(pool)
    .await
}

/// All HR contacts for one company.
pub async fn contacts_for_company(
    pool: &PgPool,
    company: &str,
) -> Result<Vec<HrContact>, sqlx::Error> {
    let rows: Vec<(Uuid, String, String, String)> = sqlx::query_as(
        "SELECT id, name, email, designation FROM hr_contacts WHERE company = $1 ORDER BY name",
    )
    .bind(company)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, email, designation)| HrContact {
            id: id.to_string(),
            name,
            email,
            position: designation,
        })
        .collect())
}
