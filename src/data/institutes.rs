//! Database operations for the `institutes` table (crawl hierarchy root).

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Returns the stored name → url mapping, used to diff a fresh crawl
/// against what is already persisted.
pub async fn url_by_name(pool: &SqlitePool) -> Result<HashMap<String, String>> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT name, url FROM institutes")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Inserts new institutes or refreshes the URL of ones whose name is
/// already present, keeping their ids stable.
pub async fn upsert_many(pool: &SqlitePool, entries: &[(String, String)]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (name, url) in entries {
        sqlx::query(
            r#"
            INSERT INTO institutes (name, url) VALUES (?, ?)
            ON CONFLICT (name) DO UPDATE SET url = excluded.url
            "#,
        )
        .bind(name)
        .bind(url)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Institutes with `id >= from_id`, in id order. Used by the department
/// stage to resume from the last parent it touched.
pub async fn from_id(pool: &SqlitePool, from_id: i64) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, url FROM institutes WHERE id >= ? ORDER BY id",
    )
    .bind(from_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM institutes")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
