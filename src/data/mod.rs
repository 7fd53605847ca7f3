//! Database models and per-table query modules.
//!
//! Each module holds free async functions over a [`sqlx::SqlitePool`]; the
//! pool is passed explicitly by every pipeline stage rather than held in
//! ambient process state.

pub mod departments;
pub mod grades;
pub mod groups;
pub mod institutes;
pub mod models;
pub mod programs;
pub mod students;
pub mod subjects;
