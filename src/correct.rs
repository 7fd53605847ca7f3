//! Inference of missing semester and evaluation-method values.
//!
//! Subjects come out of the crawl with semester 0 or an empty eval method
//! whenever their pages exposed no usable table. This stage fills the
//! gaps: a semester number embedded in the name wins, then a fuzzy match
//! against the known practice/attestation templates for the program's
//! education level, and as a last resort a uniform random semester. The
//! random fallback is deliberately lossy and documented as approximate.

use anyhow::Result;
use rand::Rng;
use regex::Regex;
use sqlx::SqlitePool;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::data::models::{EvalMethod, ProgramKind};
use crate::data::{programs, subjects};
use crate::fuzzy::{Similarity, best_match};

const MASTER_KEYWORDS: &[&str] = &["магистр", "магистратура"];
const BACHELOR_KEYWORDS: &[&str] = &["бакалавр", "бакалавриат"];
const SPECIALIST_KEYWORDS: &[&str] = &["специалитет", "специалист"];

/// Practice/attestation template names with their fixed semesters, per
/// education level. Matched fuzzily against subject names.
const BACHELOR_PRACTICES: &[(&str, i64)] = &[
    ("1 учебная практика", 2),
    ("2 учебная практика", 4),
    ("производственная (технологическая) практика", 6),
    ("производственная практика (нир)", 7),
    ("преддипломная практика", 8),
    ("государственная итоговая аттестация", 8),
];

const MASTER_PRACTICES: &[(&str, i64)] = &[
    ("учебная практика", 1),
    ("производственная практика (технологическая)", 2),
    ("производственная практика (педагогическая)", 3),
    ("научно-исследовательская работа", 3),
    ("преддипломная практика", 4),
    ("государственная итоговая аттестация", 4),
];

const SPECIALIST_PRACTICES: &[(&str, i64)] = &[
    ("1-ая учебная практика (ознакомительная)", 2),
    ("2-ая учебная практика (обмерная)", 4),
    ("3-ая учебная практика (геодезическая)", 6),
    ("1-ая производственная практика (технологическая)", 6),
    ("2-ая производственная практика (исследовательская)", 7),
    ("3-я производственная практика (проектно-исследовательская)", 10),
    ("преддипломная практика", 11),
    ("государственная итоговая аттестация", 11),
];

/// Minimum token-sort-ratio score for a template match to be accepted.
const PRACTICE_MATCH_THRESHOLD: u8 = 80;

/// Semester numbers embedded in names, tolerant of Russian ordinal
/// suffixes: "3 семестр", "3-й семестр", "10-го семестра".
static NAME_SEMESTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:-й|-ой|-го|-му|-м)?\s*семестр").unwrap()
});

/// Classifies a program by name keywords, master first; when no keyword
/// hits, falls back to how many subjects the program carries.
pub fn program_kind(program_name: &str, subject_count: i64) -> ProgramKind {
    let name = program_name.to_lowercase();
    if MASTER_KEYWORDS.iter().any(|k| name.contains(k)) {
        return ProgramKind::Master;
    }
    if BACHELOR_KEYWORDS.iter().any(|k| name.contains(k)) {
        return ProgramKind::Bachelor;
    }
    if SPECIALIST_KEYWORDS.iter().any(|k| name.contains(k)) {
        return ProgramKind::Specialist;
    }
    if subject_count > 80 {
        ProgramKind::Specialist
    } else if subject_count > 40 {
        ProgramKind::Bachelor
    } else {
        ProgramKind::Master
    }
}

/// Extracts a semester number from a subject name, if one is present.
pub fn semester_from_name(subject_name: &str) -> Option<i64> {
    NAME_SEMESTER
        .captures(subject_name)
        .and_then(|caps| caps[1].parse().ok())
}

fn practice_templates(kind: ProgramKind) -> &'static [(&'static str, i64)] {
    match kind {
        ProgramKind::Bachelor => BACHELOR_PRACTICES,
        ProgramKind::Master => MASTER_PRACTICES,
        ProgramKind::Specialist => SPECIALIST_PRACTICES,
    }
}

/// Fuzzy-matches a subject name against the practice templates of its
/// program kind. Returns the template's semester when the score clears
/// the threshold.
pub fn match_practice<S: Similarity + ?Sized>(
    scorer: &S,
    subject_name: &str,
    kind: ProgramKind,
) -> Option<i64> {
    let name = subject_name.trim().to_lowercase();
    let templates = practice_templates(kind);
    let (template, score) = best_match(scorer, &name, templates.iter().map(|(t, _)| *t))?;
    if score <= PRACTICE_MATCH_THRESHOLD {
        return None;
    }
    templates
        .iter()
        .find(|(t, _)| *t == template)
        .map(|(_, semester)| *semester)
}

/// Rule-based evaluation method: practices and attestations are graded,
/// final and penultimate semesters take an exam, everything else is
/// pass/fail.
pub fn infer_eval_method(semester: i64, kind: ProgramKind, is_practice: bool) -> EvalMethod {
    if is_practice {
        EvalMethod::Graded
    } else if semester >= kind.max_semesters() - 1 {
        EvalMethod::Exam
    } else {
        EvalMethod::Credit
    }
}

/// Outcome of inferring one subject's missing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inferred {
    pub semester: i64,
    pub eval_method: EvalMethod,
}

/// Resolves one subject's gaps. Randomness is consumed only on the final
/// fallback; subjects whose name carries a semester resolve
/// deterministically.
pub fn infer_subject<S, R>(
    scorer: &S,
    rng: &mut R,
    subject_name: &str,
    semester: i64,
    eval_method: &str,
    kind: ProgramKind,
) -> Inferred
where
    S: Similarity + ?Sized,
    R: Rng,
{
    let mut is_practice = false;
    let semester = if semester != 0 {
        semester
    } else if let Some(extracted) =
        semester_from_name(subject_name).filter(|s| *s <= kind.max_semesters())
    {
        extracted
    } else if let Some(matched) = match_practice(scorer, subject_name, kind) {
        is_practice = true;
        matched
    } else {
        rng.random_range(1..=kind.max_semesters())
    };

    // An unrecognized portal value would write the sentinel back and
    // leave the row unresolved on every run, so it falls to the rule too.
    let eval_method = match EvalMethod::from_portal(eval_method) {
        EvalMethod::Unknown => infer_eval_method(semester, kind, is_practice),
        known => known,
    };

    Inferred {
        semester,
        eval_method,
    }
}

/// Runs the correction stage over every sentinel subject row. Returns
/// the number of updated rows.
pub async fn run<S, R>(pool: &SqlitePool, scorer: &S, rng: &mut R) -> Result<u64>
where
    S: Similarity + ?Sized,
    R: Rng,
{
    let gaps = subjects::unresolved(pool).await?;
    if gaps.is_empty() {
        info!("no semester or eval-method gaps to correct");
        return Ok(0);
    }

    let mut updated = 0u64;
    for gap in gaps {
        let program_name = programs::name(pool, gap.program_id).await?;
        let subject_count = subjects::count_for_program(pool, gap.program_id).await?;
        let kind = program_kind(&program_name, subject_count);

        let inferred = infer_subject(
            scorer,
            rng,
            &gap.name,
            gap.semester,
            &gap.eval_method,
            kind,
        );
        subjects::set_inferred(
            pool,
            gap.id,
            inferred.semester,
            inferred.eval_method.as_portal(),
        )
        .await?;
        debug!(
            subject = %gap.name,
            semester = inferred.semester,
            eval_method = inferred.eval_method.as_portal(),
            program = %program_name,
            "subject corrected"
        );
        updated += 1;
    }

    info!(updated, "semesters and evaluation methods corrected");
    Ok(updated)
}
