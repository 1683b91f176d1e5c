//! Intermission placement.
//!
//! A break follows run `k` when `every_n_runs > 0`, `length_minutes > 0`,
//! `k % every_n_runs == 0` and `k` is not the final run. Breaks carry no
//! assignment and do not count as runs.

use serde::{Deserialize, Serialize};

use crate::models::BoundarySide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermissionPlan {
    pub every_n_runs: u32,
    pub length_minutes: u32,
    pub run_count: u32,
}

impl IntermissionPlan {
    pub fn new(every_n_runs: u32, length_minutes: u32, run_count: u32) -> Self {
        Self {
            every_n_runs,
            length_minutes,
            run_count,
        }
    }

    /// A plan with no breaks.
    pub fn none(run_count: u32) -> Self {
        Self::new(0, 0, run_count)
    }

    pub fn is_enabled(&self) -> bool {
        self.every_n_runs > 0 && self.length_minutes > 0
    }

    pub fn has_break_after(&self, run: u32) -> bool {
        self.is_enabled() && run >= 1 && run < self.run_count && run % self.every_n_runs == 0
    }

    /// Runs followed by a break, ascending.
    pub fn breaks_after(&self) -> Vec<u32> {
        (1..self.run_count)
            .filter(|&run| self.has_break_after(run))
            .collect()
    }

    /// Which side of a break, if any, the run touches.
    pub fn boundary(&self, run: u32) -> Option<BoundarySide> {
        let before = self.has_break_after(run);
        let after = run > 1 && self.has_break_after(run - 1);
        match (before, after) {
            (true, true) => Some(BoundarySide::Between),
            (true, false) => Some(BoundarySide::Before),
            (false, true) => Some(BoundarySide::After),
            (false, false) => None,
        }
    }
}
