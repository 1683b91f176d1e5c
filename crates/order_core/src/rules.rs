//! Hard-rule catalogue.
//!
//! The five invariants every finished schedule must satisfy, in the order
//! they are checked. Each rule carries a stable code so errors and
//! validation reports can name the rule that broke.
//!
//! | Code | Rule |
//! |------|------|
//! | I1 | No performer in both positions of a run |
//! | I2 | No object in both positions of a run |
//! | I3 | No object in the same position on consecutive runs |
//! | I4 | An object that switches position keeps its performer |
//! | I5 | No full swap of the previous run's pair |
//!
//! Only I5 is relaxable, and only by the pair sequencer's last fallback.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Assignment, ObjectPair, ScheduledRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardRule {
    DistinctPerformers,
    DistinctObjects,
    NoPositionRepeat,
    SwitchKeepsPerformer,
    NoFullSwap,
}

impl HardRule {
    /// Check order.
    pub const ALL: [HardRule; 5] = [
        HardRule::DistinctPerformers,
        HardRule::DistinctObjects,
        HardRule::NoPositionRepeat,
        HardRule::SwitchKeepsPerformer,
        HardRule::NoFullSwap,
    ];

    pub fn code(self) -> &'static str {
        match self {
            HardRule::DistinctPerformers => "I1",
            HardRule::DistinctObjects => "I2",
            HardRule::NoPositionRepeat => "I3",
            HardRule::SwitchKeepsPerformer => "I4",
            HardRule::NoFullSwap => "I5",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HardRule::DistinctPerformers => "same performer in both positions",
            HardRule::DistinctObjects => "same object in both positions",
            HardRule::NoPositionRepeat => "object repeated in the same position on consecutive runs",
            HardRule::SwitchKeepsPerformer => {
                "object switched position with a different performer"
            }
            HardRule::NoFullSwap => "positions fully swapped from the previous run",
        }
    }

    /// Whether the pair sequencer may give the rule up as a last resort.
    pub fn is_relaxable(self) -> bool {
        matches!(self, HardRule::NoFullSwap)
    }
}

impl fmt::Display for HardRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// I1. Empty slots never clash.
pub fn distinct_performers(a: &Assignment, b: &Assignment) -> bool {
    match (a.performer, b.performer) {
        (Some(pa), Some(pb)) => pa != pb,
        _ => true,
    }
}

/// I2.
pub fn distinct_objects(pair: ObjectPair) -> bool {
    pair.a != pair.b
}

/// I3.
pub fn no_position_repeat(previous: ObjectPair, next: ObjectPair) -> bool {
    previous.a != next.a && previous.b != next.b
}

/// I5 (true when `next` is the exact reverse of `previous`).
pub fn is_full_swap(previous: ObjectPair, next: ObjectPair) -> bool {
    next == previous.reversed()
}

/// I4. An object now in A that was in B on the previous run (or vice versa)
/// must keep the performer it had there.
pub fn switch_keeps_performer(previous: &ScheduledRun, a: &Assignment, b: &Assignment) -> bool {
    if a.object == previous.b.object && a.performer != previous.b.performer {
        return false;
    }
    if b.object == previous.a.object && b.performer != previous.a.performer {
        return false;
    }
    true
}
