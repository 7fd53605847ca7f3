//! Database operations for the `students` table (synthetic).

use anyhow::Result;
use sqlx::SqlitePool;

/// A student joined with the group fields the grade and scholarship passes
/// need: the group's year ordinal and its program.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentPosition {
    pub id: i64,
    pub course_year: i64,
    pub program_id: i64,
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Inserts a student with an explicit id (ids run from a configured offset).
pub async fn insert_with_id(pool: &SqlitePool, id: i64, name: &str, group_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO students (id, name, group_id, scholarship) VALUES (?, ?, ?, 0)")
        .bind(id)
        .bind(name)
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// All students with their academic position, ascending id order. The
/// scholarship pass depends on this ordering (first come, first served).
pub async fn positions(pool: &SqlitePool) -> Result<Vec<StudentPosition>> {
    let rows = sqlx::query_as::<_, StudentPosition>(
        r#"
        SELECT s.id, g.course_year, g.program_id
        FROM students s
        JOIN groups g ON g.id = s.group_id
        ORDER BY s.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn set_scholarship(pool: &SqlitePool, id: i64, amount: i64) -> Result<()> {
    sqlx::query("UPDATE students SET scholarship = ? WHERE id = ?")
        .bind(amount)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn scholarship(pool: &SqlitePool, id: i64) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT scholarship FROM students WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(n)
}
