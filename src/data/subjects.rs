//! Database operations for the `subjects` table.

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// A subject scraped (or partially scraped) from the portal, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub name: String,
    pub semester: i64,
    pub eval_method: String,
    pub url: String,
    pub program_id: i64,
}

/// A stored subject whose semester or eval method is still the sentinel,
/// awaiting the correction stage.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnresolvedSubject {
    pub id: i64,
    pub name: String,
    pub semester: i64,
    pub eval_method: String,
    pub program_id: i64,
}

/// (name, semester) pairs already stored for a program. Subject identity
/// for dedup is this pair, not the URL: a subject whose formerly-unknown
/// semester becomes known counts as a new fact.
pub async fn existing_pairs(pool: &SqlitePool, program_id: i64) -> Result<HashSet<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT name, semester FROM subjects WHERE program_id = ?",
    )
    .bind(program_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Inserts one program's batch of new subjects in a single transaction.
pub async fn insert_batch(pool: &SqlitePool, batch: &[NewSubject]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for s in batch {
        sqlx::query(
            "INSERT INTO subjects (name, semester, eval_method, url, program_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&s.name)
        .bind(s.semester)
        .bind(&s.eval_method)
        .bind(&s.url)
        .bind(s.program_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// The program the most recently inserted subject belongs to, or 0 when
/// the table is empty. Resume boundary for the subject stage.
pub async fn last_program_id(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT program_id FROM subjects ORDER BY id DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id).unwrap_or(0))
}

/// Subjects whose semester or eval method is still unset.
pub async fn unresolved(pool: &SqlitePool) -> Result<Vec<UnresolvedSubject>> {
    let rows = sqlx::query_as::<_, UnresolvedSubject>(
        r#"
        SELECT id, name, semester, eval_method, program_id
        FROM subjects
        WHERE semester = 0 OR eval_method = ''
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Writes an inferred semester and eval method back onto a sentinel row.
pub async fn set_inferred(
    pool: &SqlitePool,
    id: i64,
    semester: i64,
    eval_method: &str,
) -> Result<()> {
    sqlx::query("UPDATE subjects SET semester = ?, eval_method = ? WHERE id = ?")
        .bind(semester)
        .bind(eval_method)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_for_program(pool: &SqlitePool, program_id: i64) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subjects WHERE program_id = ?")
        .bind(program_id)
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Highest stored semester for a program; 0 when it has no subjects.
pub async fn max_semester(pool: &SqlitePool, program_id: i64) -> Result<i64> {
    let (n,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(semester) FROM subjects WHERE program_id = ?")
            .bind(program_id)
            .fetch_one(pool)
            .await?;
    Ok(n.unwrap_or(0))
}

/// All subjects of a program as (id, semester, eval_method).
pub async fn for_program(pool: &SqlitePool, program_id: i64) -> Result<Vec<(i64, i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, i64, String)>(
        "SELECT id, semester, eval_method FROM subjects WHERE program_id = ? ORDER BY id",
    )
    .bind(program_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subjects")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
