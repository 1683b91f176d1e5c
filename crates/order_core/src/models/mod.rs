//! Data model shared by the sequencer, the engine and the output adapter.

pub mod roster;
pub mod run;

pub use roster::{Eligibility, ObjectId, PerformerId, Roster, StageObject, NO_PERFORMER};
pub use run::{
    Assignment, BoundarySide, ObjectPair, Position, Relaxation, ScheduledRun,
};
