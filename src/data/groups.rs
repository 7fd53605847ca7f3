//! Database operations for the `groups` table (synthetic study groups).

use anyhow::Result;
use sqlx::SqlitePool;

use crate::data::models::Group;

pub async fn count_for_program(pool: &SqlitePool, program_id: i64) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups WHERE program_id = ?")
        .bind(program_id)
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    course_year: i64,
    program_id: i64,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO groups (name, course_year, program_id) VALUES (?, ?, ?)")
        .bind(name)
        .bind(course_year)
        .bind(program_id)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// All groups in id order.
pub async fn all(pool: &SqlitePool) -> Result<Vec<Group>> {
    let rows = sqlx::query_as::<_, Group>(
        "SELECT id, name, course_year, program_id FROM groups ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
