//! Database operations for the `departments` table.

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Stored name → url mapping for one institute's departments.
pub async fn url_by_name(pool: &SqlitePool, institute_id: i64) -> Result<HashMap<String, String>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT name, url FROM departments WHERE institute_id = ?",
    )
    .bind(institute_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Inserts new departments or refreshes changed URLs under one institute.
pub async fn upsert_many(
    pool: &SqlitePool,
    institute_id: i64,
    entries: &[(String, String)],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (name, url) in entries {
        sqlx::query(
            r#"
            INSERT INTO departments (name, url, institute_id) VALUES (?, ?, ?)
            ON CONFLICT (name, institute_id) DO UPDATE SET url = excluded.url
            "#,
        )
        .bind(name)
        .bind(url)
        .bind(institute_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Departments with `id >= from_id`, in id order.
pub async fn from_id(pool: &SqlitePool, from_id: i64) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, url FROM departments WHERE id >= ? ORDER BY id",
    )
    .bind(from_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The institute the most recently inserted department belongs to, or 0
/// when the table is empty. Resume boundary for the department stage.
pub async fn last_institute_id(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT institute_id FROM departments ORDER BY id DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id).unwrap_or(0))
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
