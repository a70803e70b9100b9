//! Queries against the collaborator-owned `user_accounts` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::accounts::models::{UserAccountRow, UserRecord};

/// Full roster, newest first.
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<UserRecord>, sqlx::Error> {
    let rows: Vec<UserAccountRow> = sqlx::query_as(
        r#"
        SELECT id, full_name, email, role, manager, status, created_at, last_sign_in_at
        FROM user_accounts
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserRecord::from).collect())
}

pub async fn insert(
    pool: &PgPool,
    id: Uuid,
    full_name: &str,
    email: &str,
    role: &str,
    manager: &str,
    status: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_accounts (id, full_name, email, role, manager, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        "#,
    )
    .bind(id)
    .bind(full_name)
    .bind(email)
    .bind(role)
    .bind(manager)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns the number of rows updated; zero means the record is gone.
pub async fn update_status(pool: &PgPool, id: Uuid, status: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE user_accounts SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_owner(pool: &PgPool, id: Uuid, owner: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE user_accounts SET manager = $1 WHERE id = $2")
        .bind(owner)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Assigns every listed record to `owner` in one statement, so a bulk
/// assignment is all-or-nothing at the store.
pub async fn assign_owner_bulk(
    pool: &PgPool,
    ids: &[Uuid],
    owner: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE user_accounts SET manager = $1 WHERE id = ANY($2)")
        .bind(owner)
        .bind(ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
