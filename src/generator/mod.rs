//! Synthetic population: groups, students, grades, scholarships.
//!
//! Runs downstream of the crawl. Groups, students, and grades are
//! generated exactly once (guarded by emptiness checks); the scholarship
//! allocation is recomputed on every run against a fixed fund.

pub mod abbrev;
pub mod names;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::data::models::EvalMethod;
use crate::data::{grades, groups, programs, students, subjects};
use names::NameSource;

/// Tuning constants for the generator, all configuration inputs.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub student_id_offset: i64,
    pub scholarship_fund: i64,
    pub social_amount: i64,
    pub academic_amount: i64,
    pub social_probability: f64,
    pub academic_probability: f64,
}

/// Grade values and weights: exams and graded subjects score 5/4/3/2,
/// pass/fail subjects 1/0.
const GRADED_VALUES: [i64; 4] = [5, 4, 3, 2];
const GRADED_WEIGHTS: [f64; 4] = [0.25, 0.4, 0.25, 0.1];
const PASS_FAIL_VALUES: [i64; 2] = [1, 0];
const PASS_FAIL_WEIGHTS: [f64; 2] = [0.75, 0.25];

const STUDENTS_PER_GROUP: std::ops::RangeInclusive<i64> = 15..=25;

/// Group count and name prefix by the program's highest semester.
fn group_plan(max_semester: i64) -> (&'static str, i64) {
    if max_semester <= 4 {
        ("м", 2)
    } else if max_semester <= 8 {
        ("б", 4)
    } else {
        ("с", 6)
    }
}

/// A student's current semester: the group's year ordinal counts two
/// semesters, September–January being the odd one and February–August
/// the even one.
pub fn current_semester(course_year: i64, month: u32) -> i64 {
    if month >= 9 || month == 1 {
        course_year * 2 - 1
    } else {
        course_year * 2
    }
}

/// Creates groups for every program that has none yet.
pub async fn generate_groups(pool: &SqlitePool) -> Result<u64> {
    let mut created = 0u64;
    for program_id in programs::all_ids(pool).await? {
        if groups::count_for_program(pool, program_id).await? > 0 {
            continue;
        }
        let max_semester = subjects::max_semester(pool, program_id).await?;
        let (prefix, count) = group_plan(max_semester);
        let abbreviation = abbrev::derive(&programs::name(pool, program_id).await?);
        for sequence in 1..=count {
            let name = format!("{prefix}{abbreviation}-{sequence}");
            // course_year doubles as the group's sequence index; the
            // grade pass reads it back as the academic-year ordinal.
            groups::insert(pool, &name, sequence, program_id).await?;
            created += 1;
        }
        debug!(program_id, groups = count, "groups created");
    }
    info!(created, "group generation finished");
    Ok(created)
}

/// Populates every group with students. Runs once; a non-empty students
/// table makes it a no-op.
pub async fn generate_students<N, R>(
    pool: &SqlitePool,
    names: &mut N,
    rng: &mut R,
    id_offset: i64,
) -> Result<u64>
where
    N: NameSource + ?Sized,
    R: Rng,
{
    if students::count(pool).await? > 0 {
        info!("students already generated, skipping");
        return Ok(0);
    }
    let mut next_id = id_offset;
    let mut created = 0u64;
    for group in groups::all(pool).await? {
        let count = rng.random_range(STUDENTS_PER_GROUP);
        for _ in 0..count {
            students::insert_with_id(pool, next_id, &names.full_name(), group.id).await?;
            next_id += 1;
            created += 1;
        }
    }
    info!(created, "student generation finished");
    Ok(created)
}

fn sample_grade<R: Rng>(rng: &mut R, eval: EvalMethod) -> i64 {
    if eval.is_pass_fail() {
        let dist = WeightedIndex::new(PASS_FAIL_WEIGHTS).expect("static weights");
        PASS_FAIL_VALUES[dist.sample(rng)]
    } else {
        let dist = WeightedIndex::new(GRADED_WEIGHTS).expect("static weights");
        GRADED_VALUES[dist.sample(rng)]
    }
}

/// Generates one grade row per (student, subject of their program). A
/// subject in the future relative to the student's current semester (or
/// with an unresolved semester) gets a NULL grade. Runs once.
pub async fn generate_grades<R: Rng>(pool: &SqlitePool, rng: &mut R, today: NaiveDate) -> Result<u64> {
    if grades::count(pool).await? > 0 {
        info!("grades already generated, skipping");
        return Ok(0);
    }
    let month = today.month();
    let mut created = 0u64;
    for student in students::positions(pool).await? {
        let semester_now = current_semester(student.course_year, month);
        for (subject_id, semester, eval_method) in
            subjects::for_program(pool, student.program_id).await?
        {
            let grade = if semester == 0 || semester > semester_now {
                None
            } else {
                Some(sample_grade(rng, EvalMethod::from_portal(&eval_method)))
            };
            grades::insert(pool, student.id, subject_id, grade).await?;
            created += 1;
        }
    }
    info!(created, "grade generation finished");
    Ok(created)
}

/// Outcome of one scholarship allocation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScholarshipSummary {
    pub social_awards: u64,
    pub academic_awards: u64,
    pub fund_remaining: i64,
}

/// Why a student ended up without an award; logged per student.
fn ineligibility(semester_grades: &[Option<i64>]) -> Option<&'static str> {
    if semester_grades.is_empty() {
        return Some("no grades for the current semester");
    }
    if semester_grades.iter().any(Option::is_none) {
        return Some("ungraded subject in the current semester");
    }
    if semester_grades
        .iter()
        .flatten()
        .any(|g| matches!(g, 0 | 2 | 3))
    {
        return Some("failing or satisfactory grade");
    }
    None
}

/// Allocates social and academic scholarships against one shared fund.
///
/// Students are visited in ascending id order and awards are first come,
/// first served: once the fund runs dry, later eligible students get
/// nothing. The academic award stacks only on top of a social one.
pub async fn allocate_scholarships<R: Rng>(
    pool: &SqlitePool,
    cfg: &GeneratorConfig,
    rng: &mut R,
    today: NaiveDate,
) -> Result<ScholarshipSummary> {
    let month = today.month();
    let mut fund = cfg.scholarship_fund;
    let mut summary = ScholarshipSummary::default();

    for student in students::positions(pool).await? {
        let semester_now = current_semester(student.course_year, month);
        let semester_grades = grades::for_student_semester(pool, student.id, semester_now).await?;

        let mut amount = 0i64;
        if let Some(reason) = ineligibility(&semester_grades) {
            debug!(student_id = student.id, reason, "no scholarship");
        } else {
            if rng.random_bool(cfg.social_probability) {
                if fund >= cfg.social_amount {
                    amount += cfg.social_amount;
                    fund -= cfg.social_amount;
                    summary.social_awards += 1;
                } else {
                    info!(student_id = student.id, "insufficient funds for social scholarship");
                }
            }
            // Academic stacks only on an awarded social scholarship.
            if amount > 0 {
                let fours = semester_grades.iter().flatten().filter(|g| **g == 4).count();
                if fours <= 2 && rng.random_bool(cfg.academic_probability) {
                    if fund >= cfg.academic_amount {
                        amount += cfg.academic_amount;
                        fund -= cfg.academic_amount;
                        summary.academic_awards += 1;
                    } else {
                        info!(
                            student_id = student.id,
                            "insufficient funds for academic scholarship"
                        );
                    }
                }
            }
        }
        students::set_scholarship(pool, student.id, amount).await?;
    }

    summary.fund_remaining = fund;
    info!(
        social = summary.social_awards,
        academic = summary.academic_awards,
        remaining = summary.fund_remaining,
        "scholarship allocation finished"
    );
    Ok(summary)
}

/// Runs the whole generator pipeline in order.
pub async fn run<N, R>(
    pool: &SqlitePool,
    cfg: &GeneratorConfig,
    names: &mut N,
    rng: &mut R,
    today: NaiveDate,
) -> Result<()>
where
    N: NameSource + ?Sized,
    R: Rng,
{
    generate_groups(pool).await?;
    generate_students(pool, names, rng, cfg.student_id_offset).await?;
    generate_grades(pool, rng, today).await?;
    allocate_scholarships(pool, cfg, rng, today).await?;
    Ok(())
}
