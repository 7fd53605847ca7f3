//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use portal::data::subjects::{self, NewSubject};
use portal::data::{departments, institutes, programs};
use sqlx::SqlitePool;

/// Seeds one institute and one department, returning the department id.
pub async fn seed_department(pool: &SqlitePool) -> i64 {
    institutes::upsert_many(
        pool,
        &[(
            "Институт прикладных информационных технологий".to_owned(),
            "https://portal/Facult/INPIT/default.aspx".to_owned(),
        )],
    )
    .await
    .unwrap();
    let (institute_id, _) = institutes::from_id(pool, 0).await.unwrap()[0].clone();

    departments::upsert_many(
        pool,
        institute_id,
        &[(
            "Информационные системы и технологии".to_owned(),
            "https://portal/Facult/INPIT/IST/default.aspx".to_owned(),
        )],
    )
    .await
    .unwrap();
    departments::from_id(pool, 0).await.unwrap()[0].0
}

/// Seeds the full hierarchy down to one program and returns its id.
pub async fn seed_program(pool: &SqlitePool, name: &str) -> i64 {
    let department_id = seed_department(pool).await;
    seed_program_under(pool, department_id, name).await
}

/// Adds a program under an existing department and returns its id.
pub async fn seed_program_under(pool: &SqlitePool, department_id: i64, name: &str) -> i64 {
    let url = format!("https://portal/Facult/INPIT/IST/{name}/default.aspx");
    programs::upsert_many(pool, department_id, &[(name.to_owned(), url)])
        .await
        .unwrap();
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM programs WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

/// Inserts one subject row with explicit semester and eval method.
pub async fn seed_subject(
    pool: &SqlitePool,
    program_id: i64,
    name: &str,
    semester: i64,
    eval_method: &str,
) -> i64 {
    subjects::insert_batch(
        pool,
        &[NewSubject {
            name: name.to_owned(),
            semester,
            eval_method: eval_method.to_owned(),
            url: format!("https://portal/subject/{name}"),
            program_id,
        }],
    )
    .await
    .unwrap();
    let (id,): (i64,) = sqlx::query_as(
        "SELECT id FROM subjects WHERE name = ? AND program_id = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(name)
    .bind(program_id)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}
