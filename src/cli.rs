use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    Pretty,
    Json,
}

/// Stage selection for the pipeline. Stages always run in hierarchy
/// order regardless of flag order on the command line.
#[derive(Debug, Parser)]
#[command(name = "portal", about = "University portal crawler and dataset generator")]
pub struct Args {
    /// Crawl the institute index page.
    #[arg(long)]
    pub institutes: bool,
    /// Crawl department pages under stored institutes.
    #[arg(long)]
    pub departments: bool,
    /// Crawl program pages under stored departments.
    #[arg(long)]
    pub programs: bool,
    /// Resolve curriculum subjects for stored programs.
    #[arg(long)]
    pub subjects: bool,
    /// Infer missing subject semesters and evaluation methods.
    #[arg(long)]
    pub correct: bool,
    /// Generate groups, students, grades and scholarships.
    #[arg(long)]
    pub generate: bool,
    /// Run every stage in order.
    #[arg(long)]
    pub all: bool,
    /// Log output format.
    #[arg(long, value_enum, default_value = "pretty")]
    pub tracing: TracingFormat,
}

impl Args {
    pub fn institutes_enabled(&self) -> bool {
        self.all || self.institutes
    }

    pub fn departments_enabled(&self) -> bool {
        self.all || self.departments
    }

    pub fn programs_enabled(&self) -> bool {
        self.all || self.programs
    }

    pub fn subjects_enabled(&self) -> bool {
        self.all || self.subjects
    }

    pub fn correct_enabled(&self) -> bool {
        self.all || self.correct
    }

    pub fn generate_enabled(&self) -> bool {
        self.all || self.generate
    }

    pub fn any_enabled(&self) -> bool {
        self.all
            || self.institutes
            || self.departments
            || self.programs
            || self.subjects
            || self.correct
            || self.generate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_implies_every_stage() {
        let args = Args::parse_from(["portal", "--all"]);
        assert!(args.institutes_enabled());
        assert!(args.generate_enabled());
        assert!(args.any_enabled());
    }

    #[test]
    fn single_stage_leaves_others_off() {
        let args = Args::parse_from(["portal", "--correct"]);
        assert!(args.correct_enabled());
        assert!(!args.subjects_enabled());
    }

    #[test]
    fn no_flags_selects_nothing() {
        let args = Args::parse_from(["portal"]);
        assert!(!args.any_enabled());
        assert_eq!(args.tracing, TracingFormat::Pretty);
    }
}
