//! Row structs and domain enums shared across the data layer.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Institute {
    pub id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub institute_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub department_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    /// 0 means the semester could not be scraped yet.
    pub semester: i64,
    /// Raw portal string; empty until scraped or inferred.
    pub eval_method: String,
    pub url: String,
    pub program_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    /// Creation-sequence index of the group, also read as its
    /// academic-year ordinal by the grade generator.
    pub course_year: i64,
    pub program_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub group_id: i64,
    /// Monthly award in currency units; 0 = no scholarship.
    pub scholarship: i64,
}

/// How a subject's outcome is scored, as encoded by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMethod {
    /// "Экзамен": graded exam at the end of the semester.
    Exam,
    /// "Зачет": pass/fail credit.
    Credit,
    /// "Оценка": graded without an exam (practices, attestations).
    Graded,
    /// Empty or unrecognized portal value.
    Unknown,
}

impl EvalMethod {
    pub fn from_portal(raw: &str) -> Self {
        match raw.trim() {
            "Экзамен" => Self::Exam,
            "Зачет" => Self::Credit,
            "Оценка" => Self::Graded,
            _ => Self::Unknown,
        }
    }

    pub fn as_portal(self) -> &'static str {
        match self {
            Self::Exam => "Экзамен",
            Self::Credit => "Зачет",
            Self::Graded => "Оценка",
            Self::Unknown => "",
        }
    }

    /// Pass/fail subjects score in {0, 1}; everything else in {2..=5}.
    pub fn is_pass_fail(self) -> bool {
        matches!(self, Self::Credit)
    }
}

/// Education level of a program, with its nominal semester count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Bachelor,
    Master,
    Specialist,
}

impl ProgramKind {
    pub fn max_semesters(self) -> i64 {
        match self {
            Self::Bachelor => 8,
            Self::Master => 4,
            Self::Specialist => 11,
        }
    }

    /// Single-letter group-name prefix ("б"/"м"/"с").
    pub fn group_prefix(self) -> &'static str {
        match self {
            Self::Bachelor => "б",
            Self::Master => "м",
            Self::Specialist => "с",
        }
    }
}
