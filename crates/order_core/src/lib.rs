//! # order_core - Run-Order Scheduler
//!
//! Builds the run order for a repeating two-position performance: which
//! object sits in position A and B on every run, and which performer (or
//! nobody) embodies each.
//!
//! ## Features
//! - Deterministic output (same config and seed = same schedule)
//! - Hard rules I1–I5 enforced at every step, relaxations recorded per run
//! - Balanced pair types, positions and objects across the show
//! - Intermission-aware boundary handling
//! - Post-hoc validator for generated or hand-edited run lists
//!
//! ## Usage
//! ```no_run
//! use order_core::{generate_schedule, ShowConfig};
//!
//! let config = ShowConfig::from_path("show.yaml".as_ref())?;
//! let schedule = generate_schedule(&config)?;
//! println!("{} runs", schedule.runs.len());
//! # Ok::<(), order_core::ScheduleError>(())
//! ```

#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod intermission;
pub mod models;
pub mod rules;
pub mod scheduler;
pub mod sequencer;
pub mod tiebreak;
pub mod validate;

pub use config::{PairTypeMode, ShowConfig};
pub use error::{ConfigError, Result, ScheduleError};
pub use history::{HistorySnapshot, HistoryTracker};
pub use intermission::IntermissionPlan;
pub use models::{
    Assignment, BoundarySide, ObjectId, ObjectPair, PerformerId, Position, Relaxation, Roster,
    ScheduledRun,
};
pub use rules::HardRule;
pub use scheduler::{generate_schedule, Schedule, Scheduler, SchedulerOptions};
pub use validate::{validate_runs, ValidationReport, Violation};
