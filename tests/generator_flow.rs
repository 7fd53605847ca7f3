//! End-to-end tests for the synthetic population pipeline.

mod helpers;

use chrono::NaiveDate;
use portal::data::{grades, groups, students};
use portal::generator::{self, GeneratorConfig, names::RussianNames};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sqlx::SqlitePool;

fn test_config() -> GeneratorConfig {
    GeneratorConfig {
        student_id_offset: 1000,
        scholarship_fund: 101_000,
        social_amount: 2913,
        academic_amount: 2500,
        social_probability: 0.4,
        academic_probability: 0.15,
    }
}

#[sqlx::test]
async fn groups_follow_the_program_span(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "Прикладная информатика").await;
    helpers::seed_subject(&pool, program_id, "Преддипломная практика", 8, "Оценка").await;

    let created = generator::generate_groups(&pool).await.unwrap();
    assert_eq!(created, 4, "an eight-semester program gets four groups");

    let all = groups::all(&pool).await.unwrap();
    let names: Vec<&str> = all.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["бПИ-1", "бПИ-2", "бПИ-3", "бПИ-4"]);
    for (ordinal, group) in all.iter().enumerate() {
        assert_eq!(group.course_year, ordinal as i64 + 1);
        assert_eq!(group.program_id, program_id);
    }

    // A second pass must not duplicate anything.
    assert_eq!(generator::generate_groups(&pool).await.unwrap(), 0);
    assert_eq!(groups::count(&pool).await.unwrap(), 4);
}

#[sqlx::test]
async fn programs_without_subjects_get_master_groups(pool: SqlitePool) {
    helpers::seed_program(&pool, "Прикладная математика").await;

    generator::generate_groups(&pool).await.unwrap();
    let all = groups::all(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|g| g.name.starts_with("мПМ-")));
}

#[sqlx::test]
async fn students_fill_groups_from_the_id_offset(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "Прикладная информатика").await;
    helpers::seed_subject(&pool, program_id, "Математика", 8, "Экзамен").await;
    generator::generate_groups(&pool).await.unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let mut names = RussianNames::new(StdRng::seed_from_u64(7));
    let created = generator::generate_students(&pool, &mut names, &mut rng, 1000)
        .await
        .unwrap();

    assert!((4 * 15..=4 * 25).contains(&(created as i64)));
    let positions = students::positions(&pool).await.unwrap();
    assert_eq!(positions.len() as u64, created);
    assert_eq!(positions[0].id, 1000);
    // Sequential ids, no holes.
    for (offset, student) in positions.iter().enumerate() {
        assert_eq!(student.id, 1000 + offset as i64);
    }

    // Run-once guard.
    let again = generator::generate_students(&pool, &mut names, &mut rng, 1000)
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[sqlx::test]
async fn future_and_unknown_semesters_stay_ungraded(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "Прикладная информатика").await;
    let past = helpers::seed_subject(&pool, program_id, "Математика", 1, "Экзамен").await;
    let current = helpers::seed_subject(&pool, program_id, "Физика", 2, "Зачет").await;
    let future = helpers::seed_subject(&pool, program_id, "Философия", 3, "Зачет").await;
    let unknown = helpers::seed_subject(&pool, program_id, "Практика", 0, "").await;

    let (group_id,): (i64,) = sqlx::query_as(
        "INSERT INTO groups (name, course_year, program_id) VALUES ('бПИ-1', 1, ?) RETURNING id",
    )
    .bind(program_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    students::insert_with_id(&pool, 1000, "Иванов Иван Иванович", group_id)
        .await
        .unwrap();

    // April of the first year: current semester is 2.
    let today = NaiveDate::from_ymd_opt(2026, 4, 15).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let created = generator::generate_grades(&pool, &mut rng, today).await.unwrap();
    assert_eq!(created, 4);

    let by_subject: std::collections::HashMap<i64, Option<i64>> =
        grades::for_student(&pool, 1000).await.unwrap().into_iter().collect();
    assert!(by_subject[&past].is_some());
    assert!(by_subject[&current].is_some());
    assert_eq!(by_subject[&future], None);
    assert_eq!(by_subject[&unknown], None);
    assert!(matches!(by_subject[&past], Some(2..=5)));
    assert!(matches!(by_subject[&current], Some(0..=1)));
}

#[sqlx::test]
async fn scholarship_fund_is_first_come_first_served(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "Прикладная информатика").await;
    let subject = helpers::seed_subject(&pool, program_id, "Математика", 1, "Экзамен").await;

    let (group_id,): (i64,) = sqlx::query_as(
        "INSERT INTO groups (name, course_year, program_id) VALUES ('бПИ-1', 1, ?) RETURNING id",
    )
    .bind(program_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    for id in 1000..1010 {
        students::insert_with_id(&pool, id, "Петров Пётр Петрович", group_id)
            .await
            .unwrap();
        grades::insert(&pool, id, subject, Some(5)).await.unwrap();
    }

    // Everyone qualifies and everyone rolls a social award, but the fund
    // only covers two of them.
    let cfg = GeneratorConfig {
        scholarship_fund: 5000,
        social_amount: 2000,
        social_probability: 1.0,
        academic_probability: 0.0,
        ..test_config()
    };
    let today = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let summary = generator::allocate_scholarships(&pool, &cfg, &mut rng, today)
        .await
        .unwrap();

    assert_eq!(summary.social_awards, 2);
    assert_eq!(summary.academic_awards, 0);
    assert_eq!(summary.fund_remaining, 1000);
    assert_eq!(students::scholarship(&pool, 1000).await.unwrap(), 2000);
    assert_eq!(students::scholarship(&pool, 1001).await.unwrap(), 2000);
    for id in 1002..1010 {
        assert_eq!(students::scholarship(&pool, id).await.unwrap(), 0);
    }
}

#[sqlx::test]
async fn ungraded_subject_blocks_a_scholarship(pool: SqlitePool) {
    let program_id = helpers::seed_program(&pool, "Прикладная информатика").await;
    let graded = helpers::seed_subject(&pool, program_id, "Математика", 1, "Экзамен").await;
    let ungraded = helpers::seed_subject(&pool, program_id, "Физика", 1, "Зачет").await;

    let (group_id,): (i64,) = sqlx::query_as(
        "INSERT INTO groups (name, course_year, program_id) VALUES ('бПИ-1', 1, ?) RETURNING id",
    )
    .bind(program_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    students::insert_with_id(&pool, 1000, "Сидорова Анна Петровна", group_id)
        .await
        .unwrap();
    grades::insert(&pool, 1000, graded, Some(5)).await.unwrap();
    grades::insert(&pool, 1000, ungraded, None).await.unwrap();

    let cfg = GeneratorConfig {
        social_probability: 1.0,
        ..test_config()
    };
    let today = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let summary = generator::allocate_scholarships(&pool, &cfg, &mut rng, today)
        .await
        .unwrap();

    assert_eq!(summary.social_awards, 0);
    assert_eq!(students::scholarship(&pool, 1000).await.unwrap(), 0);
}
