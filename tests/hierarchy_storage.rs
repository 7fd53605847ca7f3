//! Tests for hierarchy storage: upsert identity and resume boundaries.

mod helpers;

use portal::data::{departments, institutes, programs, subjects};
use sqlx::SqlitePool;

#[sqlx::test]
async fn institute_upsert_is_idempotent(pool: SqlitePool) {
    let entries = vec![(
        "Физико-технический институт".to_owned(),
        "https://portal/Facult/FTI/default.aspx".to_owned(),
    )];
    institutes::upsert_many(&pool, &entries).await.unwrap();
    institutes::upsert_many(&pool, &entries).await.unwrap();

    assert_eq!(institutes::count(&pool).await.unwrap(), 1);
}

#[sqlx::test]
async fn institute_upsert_refreshes_url_and_keeps_id(pool: SqlitePool) {
    let name = "Физико-технический институт".to_owned();
    institutes::upsert_many(&pool, &[(name.clone(), "https://portal/old".to_owned())])
        .await
        .unwrap();
    let before = institutes::from_id(&pool, 0).await.unwrap();

    institutes::upsert_many(&pool, &[(name.clone(), "https://portal/new".to_owned())])
        .await
        .unwrap();
    let after = institutes::from_id(&pool, 0).await.unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert_eq!(before[0].0, after[0].0, "id must survive a URL refresh");
    assert_eq!(after[0].1, "https://portal/new");

    let urls = institutes::url_by_name(&pool).await.unwrap();
    assert_eq!(urls[&name], "https://portal/new");
}

#[sqlx::test]
async fn department_upsert_scopes_by_institute(pool: SqlitePool) {
    institutes::upsert_many(
        &pool,
        &[
            ("Первый".to_owned(), "https://portal/a".to_owned()),
            ("Второй".to_owned(), "https://portal/b".to_owned()),
        ],
    )
    .await
    .unwrap();
    let parents = institutes::from_id(&pool, 0).await.unwrap();

    // The same department name under two institutes is two rows.
    let entry = vec![("Кафедра математики".to_owned(), "https://portal/m".to_owned())];
    departments::upsert_many(&pool, parents[0].0, &entry).await.unwrap();
    departments::upsert_many(&pool, parents[1].0, &entry).await.unwrap();

    assert_eq!(departments::count(&pool).await.unwrap(), 2);
    assert_eq!(
        departments::url_by_name(&pool, parents[0].0)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[sqlx::test]
async fn resume_boundaries_default_to_zero(pool: SqlitePool) {
    assert_eq!(departments::last_institute_id(&pool).await.unwrap(), 0);
    assert_eq!(programs::last_department_id(&pool).await.unwrap(), 0);
    assert_eq!(subjects::last_program_id(&pool).await.unwrap(), 0);
}

#[sqlx::test]
async fn subject_resume_reincludes_boundary_program(pool: SqlitePool) {
    let department_id = helpers::seed_department(&pool).await;
    let mut program_ids = Vec::new();
    for n in 1..=5 {
        let name = format!("09.03.0{n} Программа {n}");
        program_ids.push(helpers::seed_program_under(&pool, department_id, &name).await);
    }

    // Subjects stored for the first three programs only.
    for &id in &program_ids[..3] {
        helpers::seed_subject(&pool, id, "Математика", 1, "Экзамен").await;
    }

    let boundary = subjects::last_program_id(&pool).await.unwrap();
    assert_eq!(boundary, program_ids[2]);

    // The boundary program is crawled again: its last run may have been
    // interrupted halfway through its subject list.
    let remaining: Vec<i64> = programs::from_id(&pool, boundary)
        .await
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(remaining, &program_ids[2..]);
}
