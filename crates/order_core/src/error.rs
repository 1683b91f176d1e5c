use thiserror::Error;

use crate::rules::HardRule;

/// Malformed or under-specified configuration. Detected before any
/// scheduling starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("run_count must be at least 1")]
    NoRuns,

    #[error("expected exactly 2 characters (positions A and B), found {found}")]
    CharacterCount { found: usize },

    #[error("at least 2 objects are required, found {found}")]
    TooFewObjects { found: usize },

    #[error("object name must not be empty (entry {index})")]
    EmptyObjectName { index: usize },

    #[error("duplicate object: {name}")]
    DuplicateObject { name: String },

    #[error("duplicate performer: {name}")]
    DuplicatePerformer { name: String },

    #[error("object {object} references unknown performer {performer}")]
    UnknownPerformer { object: String, performer: String },

    #[error("object {object} has no eligible performer")]
    NoEligiblePerformers { object: String },

    #[error("invalid seed {value:?}: expected an integer or \"none\"")]
    InvalidSeed { value: String },
}

/// Terminal failure of a scheduling attempt. No partial schedule is
/// returned alongside any of these.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("pair sequencing infeasible at run {run}: {rule}")]
    PairSequencing { run: u32, rule: HardRule },

    #[error("assignment infeasible at run {run}: {rule}")]
    Assignment { run: u32, rule: HardRule },
}

impl ScheduleError {
    /// Run index the failure is attributed to, if any.
    pub fn run(&self) -> Option<u32> {
        match self {
            ScheduleError::Config(_) => None,
            ScheduleError::PairSequencing { run, .. } | ScheduleError::Assignment { run, .. } => {
                Some(*run)
            }
        }
    }

    /// Hard rule that could not be satisfied, if any.
    pub fn rule(&self) -> Option<HardRule> {
        match self {
            ScheduleError::Config(_) => None,
            ScheduleError::PairSequencing { rule, .. } | ScheduleError::Assignment { rule, .. } => {
                Some(*rule)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
