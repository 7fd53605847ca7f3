//! Database operations for the `grades` table (synthetic).

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM grades")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Inserts a grade; `None` marks a subject the student has not reached yet.
pub async fn insert(
    pool: &SqlitePool,
    student_id: i64,
    subject_id: i64,
    grade: Option<i64>,
) -> Result<()> {
    sqlx::query("INSERT INTO grades (student_id, subject_id, grade) VALUES (?, ?, ?)")
        .bind(student_id)
        .bind(subject_id)
        .bind(grade)
        .execute(pool)
        .await?;
    Ok(())
}

/// A student's grades restricted to subjects of one semester.
pub async fn for_student_semester(
    pool: &SqlitePool,
    student_id: i64,
    semester: i64,
) -> Result<Vec<Option<i64>>> {
    let rows = sqlx::query_as::<_, (Option<i64>,)>(
        r#"
        SELECT g.grade
        FROM grades g
        JOIN subjects sub ON sub.id = g.subject_id
        WHERE g.student_id = ? AND sub.semester = ?
        "#,
    )
    .bind(student_id)
    .bind(semester)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(g,)| g).collect())
}

/// All grades of one student as (subject_id, grade).
pub async fn for_student(pool: &SqlitePool, student_id: i64) -> Result<Vec<(i64, Option<i64>)>> {
    let rows = sqlx::query_as::<_, (i64, Option<i64>)>(
        "SELECT subject_id, grade FROM grades WHERE student_id = ? ORDER BY subject_id",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
