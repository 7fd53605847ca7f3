//! Tests for subject dedup identity and the correction stage.

mod helpers;

use portal::correct;
use portal::data::subjects;
use portal::fuzzy::TokenSortRatio;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sqlx::SqlitePool;

#[sqlx::test]
async fn subject_identity_is_name_and_semester(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "09.03.01 Прикладная информатика").await;
    helpers::seed_subject(&pool, program_id, "Философия", 1, "Зачет").await;
    helpers::seed_subject(&pool, program_id, "Философия", 0, "").await;

    let pairs = subjects::existing_pairs(&pool, program_id).await.unwrap();
    assert!(pairs.contains(&("Философия".to_owned(), 1)));
    assert!(pairs.contains(&("Философия".to_owned(), 0)));
    // The same name in a different semester is a distinct subject.
    assert!(!pairs.contains(&("Философия".to_owned(), 2)));
}

#[sqlx::test]
async fn correction_fills_every_gap(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "09.03.01 Прикладная информатика").await;
    // Fully resolved row: must not be touched.
    let resolved = helpers::seed_subject(&pool, program_id, "Математика", 2, "Экзамен").await;
    // Semester embedded in the name.
    helpers::seed_subject(&pool, program_id, "Физика (3 семестр)", 0, "").await;
    // Practice template, detectable only by fuzzy match.
    helpers::seed_subject(&pool, program_id, "Практика преддипломная", 0, "").await;
    // Nothing to go on: random fallback.
    helpers::seed_subject(&pool, program_id, "Культурология", 0, "Зачет").await;

    let mut rng = StdRng::seed_from_u64(17);
    let updated = correct::run(&pool, &TokenSortRatio, &mut rng).await.unwrap();
    assert_eq!(updated, 3);
    assert!(subjects::unresolved(&pool).await.unwrap().is_empty());

    let rows = subjects::for_program(&pool, program_id).await.unwrap();
    let by_id: std::collections::HashMap<i64, (i64, String)> = rows
        .into_iter()
        .map(|(id, semester, eval)| (id, (semester, eval)))
        .collect();

    assert_eq!(by_id[&resolved], (2, "Экзамен".to_owned()));
    // Few subjects means the program reads as a master's program, whose
    // span is four semesters. Every inferred semester must fit it.
    for (semester, eval) in by_id.values() {
        assert!((1..=4).contains(semester));
        assert!(!eval.is_empty());
    }
}

#[sqlx::test]
async fn correction_is_a_noop_without_gaps(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "09.03.01 Прикладная информатика").await;
    helpers::seed_subject(&pool, program_id, "Математика", 1, "Экзамен").await;

    let mut rng = StdRng::seed_from_u64(17);
    let updated = correct::run(&pool, &TokenSortRatio, &mut rng).await.unwrap();
    assert_eq!(updated, 0);
}
