//! Application configuration, loaded from the environment.
//!
//! Everything tunable lives here: portal location and credentials, the
//! certificate bundle, the database, crawl politeness, and the generator
//! constants. Loaded via figment from `PORTAL_`-prefixed environment
//! variables (a `.env` file is merged first by `main`).

use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::ops::RangeInclusive;

use crate::generator::GeneratorConfig;
use crate::portal::Credentials;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::main_url")]
    pub main_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Second credential pair; workers alternate between the two so the
    /// parallel subject stage does not hammer one account.
    #[serde(default)]
    pub username_secondary: Option<String>,
    #[serde(default)]
    pub password_secondary: Option<String>,
    /// Path to the portal's PEM trust bundle. Unset means the system
    /// roots are used.
    #[serde(default)]
    pub ssl_certificate: Option<String>,
    #[serde(default = "defaults::database_url")]
    pub database_url: String,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    #[serde(default = "defaults::subject_workers")]
    pub subject_workers: usize,
    #[serde(default = "defaults::pause_min_ms")]
    pub pause_min_ms: u64,
    #[serde(default = "defaults::pause_max_ms")]
    pub pause_max_ms: u64,
    #[serde(default = "defaults::student_id_offset")]
    pub student_id_offset: i64,
    #[serde(default = "defaults::scholarship_fund")]
    pub scholarship_fund: i64,
    #[serde(default = "defaults::social_amount")]
    pub social_amount: i64,
    #[serde(default = "defaults::academic_amount")]
    pub academic_amount: i64,
    #[serde(default = "defaults::social_probability")]
    pub social_probability: f64,
    #[serde(default = "defaults::academic_probability")]
    pub academic_probability: f64,
}

mod defaults {
    pub fn main_url() -> String {
        "https://portal3.sstu.ru/Pages/Default.aspx".to_owned()
    }
    pub fn database_url() -> String {
        "sqlite://university.db?mode=rwc".to_owned()
    }
    pub fn log_level() -> String {
        "info".to_owned()
    }
    pub fn subject_workers() -> usize {
        2
    }
    pub fn pause_min_ms() -> u64 {
        500
    }
    pub fn pause_max_ms() -> u64 {
        2000
    }
    pub fn student_id_offset() -> i64 {
        1000
    }
    pub fn scholarship_fund() -> i64 {
        101_000
    }
    pub fn social_amount() -> i64 {
        2913
    }
    pub fn academic_amount() -> i64 {
        2500
    }
    pub fn social_probability() -> f64 {
        0.4
    }
    pub fn academic_probability() -> f64 {
        0.15
    }
}

impl Config {
    pub fn load() -> figment::error::Result<Self> {
        Figment::new().merge(Env::prefixed("PORTAL_")).extract()
    }

    pub fn pause_range(&self) -> RangeInclusive<u64> {
        self.pause_min_ms..=self.pause_max_ms
    }

    pub fn primary_credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    fn secondary_credentials(&self) -> Option<Credentials> {
        match (&self.username_secondary, &self.password_secondary) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// Credential pair for a subject worker: even-numbered workers take
    /// the secondary pair when one is configured.
    pub fn worker_credentials(&self, worker_id: usize) -> Credentials {
        if worker_id % 2 == 0
            && let Some(secondary) = self.secondary_credentials()
        {
            return secondary;
        }
        self.primary_credentials()
    }

    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            student_id_offset: self.student_id_offset,
            scholarship_fund: self.scholarship_fund,
            social_amount: self.social_amount,
            academic_amount: self.academic_amount,
            social_probability: self.social_probability,
            academic_probability: self.academic_probability,
        }
    }
}
