//! Database operations for the `programs` table.

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Stored name → url mapping for one department's programs.
pub async fn url_by_name(pool: &SqlitePool, department_id: i64) -> Result<HashMap<String, String>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT name, url FROM programs WHERE department_id = ?",
    )
    .bind(department_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Inserts new programs or refreshes changed URLs under one department.
pub async fn upsert_many(
    pool: &SqlitePool,
    department_id: i64,
    entries: &[(String, String)],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (name, url) in entries {
        sqlx::query(
            r#"
            INSERT INTO programs (name, url, department_id) VALUES (?, ?, ?)
            ON CONFLICT (name, department_id) DO UPDATE SET url = excluded.url
            "#,
        )
        .bind(name)
        .bind(url)
        .bind(department_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Programs with `id >= from_id`, in id order. Input slice for the
/// parallel subject stage.
pub async fn from_id(pool: &SqlitePool, from_id: i64) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, url FROM programs WHERE id >= ? ORDER BY id",
    )
    .bind(from_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The department the most recently inserted program belongs to, or 0
/// when the table is empty.
pub async fn last_department_id(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT department_id FROM programs ORDER BY id DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id).unwrap_or(0))
}

pub async fn name(pool: &SqlitePool, id: i64) -> Result<String> {
    let (name,): (String,) = sqlx::query_as("SELECT name FROM programs WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(name)
}

/// Ids of all programs, in id order.
pub async fn all_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM programs ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM programs")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
