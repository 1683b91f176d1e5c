//! Scheduling entry point.
//!
//! Runs the two phases in order:
//!
//! 1. [`PairSequencer`] fixes the object pair of every run.
//! 2. [`AssignmentEngine`] picks performers run by run, recording each
//!    finished run into the [`HistoryTracker`].
//!
//! When every pair type is owed a run, a pair that no two distinct
//! performers can fill is reported at run 1 before sequencing starts.
//! Any failure aborts the whole attempt; no partial schedule is returned.

use tracing::{info, warn};

use crate::config::{PairTypeMode, ShowConfig, DEFAULT_SEARCH_BUDGET};
use crate::engine::{self, AssignmentEngine};
use crate::error::{Result, ScheduleError};
use crate::history::HistoryTracker;
use crate::intermission::IntermissionPlan;
use crate::models::{Position, Roster, ScheduledRun};
use crate::rules::HardRule;
use crate::sequencer::PairSequencer;
use crate::tiebreak::TieBreaker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Authoritative; `intermission.run_count` is overridden with it.
    pub run_count: u32,
    /// `None` means sequential tie-breaking with no shuffling.
    pub seed: Option<u64>,
    pub intermission: IntermissionPlan,
    pub force_none_at_intermission: bool,
    pub pair_types: PairTypeMode,
    pub search_budget: u32,
}

impl SchedulerOptions {
    /// No breaks, no seed, ordered pair types.
    pub fn new(run_count: u32) -> Self {
        Self {
            run_count,
            seed: None,
            intermission: IntermissionPlan::none(run_count),
            force_none_at_intermission: false,
            pair_types: PairTypeMode::Ordered,
            search_budget: DEFAULT_SEARCH_BUDGET,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_intermission(
        mut self,
        every_n_runs: u32,
        length_minutes: u32,
        force_none: bool,
    ) -> Self {
        self.intermission = IntermissionPlan::new(every_n_runs, length_minutes, self.run_count);
        self.force_none_at_intermission = force_none;
        self
    }

    pub fn with_pair_types(mut self, pair_types: PairTypeMode) -> Self {
        self.pair_types = pair_types;
        self
    }
}

/// A finished schedule.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub roster: Roster,
    pub runs: Vec<ScheduledRun>,
    /// Runs followed by an intermission.
    pub intermissions_after: Vec<u32>,
    pub history: HistoryTracker,
}

impl Schedule {
    pub fn run(&self, index: u32) -> Option<&ScheduledRun> {
        index
            .checked_sub(1)
            .and_then(|i| self.runs.get(i as usize))
    }

    pub fn relaxation_count(&self) -> usize {
        self.runs.iter().map(|run| run.relaxations.len()).sum()
    }
}

pub struct Scheduler {
    roster: Roster,
    options: SchedulerOptions,
}

impl Scheduler {
    pub fn new(roster: Roster, options: SchedulerOptions) -> Self {
        Self { roster, options }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn generate(&self) -> Result<Schedule> {
        let options = &self.options;
        let plan = IntermissionPlan {
            run_count: options.run_count,
            ..options.intermission
        };
        let mut tie = TieBreaker::from_seed(options.seed);

        let sequencer = PairSequencer::new(
            &self.roster,
            &plan,
            options.force_none_at_intermission,
            options.pair_types,
            options.search_budget,
            &mut tie,
        )?;
        if sequencer.covers_every_pair_type() {
            if let Some(pair) = sequencer
                .pairs()
                .find(|&pair| !engine::can_staff(&self.roster, pair))
            {
                warn!(
                    a = self.roster.object_name(pair.a),
                    b = self.roster.object_name(pair.b),
                    "pair can never be staffed by distinct performers"
                );
                return Err(ScheduleError::Assignment {
                    run: 1,
                    rule: HardRule::DistinctPerformers,
                });
            }
        }
        let pairs = sequencer.sequence()?;

        let mut engine =
            AssignmentEngine::new(&self.roster, &plan, options.force_none_at_intermission);
        let mut history = HistoryTracker::for_roster(&self.roster);
        let mut runs: Vec<ScheduledRun> = Vec::with_capacity(pairs.len());

        for (index, sequenced) in (1..).zip(pairs) {
            let (a, b) = engine.assign(index, sequenced.pair, runs.last(), &history, &mut tie)?;
            history.record(index, Position::A, a.object, a.performer);
            history.record(index, Position::B, b.object, b.performer);
            runs.push(ScheduledRun {
                index,
                a,
                b,
                boundary: plan.boundary(index),
                relaxations: sequenced.relaxations,
            });
        }

        let schedule = Schedule {
            roster: self.roster.clone(),
            runs,
            intermissions_after: plan.breaks_after(),
            history,
        };

        let relaxed = schedule.relaxation_count();
        if relaxed > 0 {
            warn!(relaxed, "schedule needed relaxations");
        }
        info!(
            runs = schedule.runs.len(),
            intermissions = schedule.intermissions_after.len(),
            seeded = tie.is_seeded(),
            "schedule generated"
        );
        Ok(schedule)
    }
}

/// Validate `config` and produce its schedule.
pub fn generate_schedule(config: &ShowConfig) -> Result<Schedule> {
    let roster = config.roster()?;
    let options = config.scheduler_options()?;
    Scheduler::new(roster, options).generate()
}
