//! Object-Pair Sequencer
//!
//! Builds the ordered (position A object, position B object) pair for every
//! run before any performer is chosen.
//!
//! ## Rules honoured per step
//! - I2: the pool never contains (x, x).
//! - I3: no object repeats its position from the previous pair.
//! - I5: no exact reverse of the previous pair.
//! - Quota: pair-type counts end within one of each other (`PairQuota`).
//! - Boundary: with `force_none_at_intermission`, boundary runs take a pair
//!   holding a none-capable object beside a performable one.
//!
//! ## Strategy
//! 1. Bounded depth-first search under all rules above, candidates tried in
//!    greedy rank order (fewest placements of the type, least recently used
//!    type, pool order). The first complete sequence wins. The search keeps
//!    its own stack, so its depth is not limited by the thread stack.
//! 2. If the search proves there is none, or spends its node budget, one
//!    greedy pass runs with a relaxation ladder: quota, then boundary, then
//!    I5. I5 is never relaxed on two runs in a row. I2 and I3 are never
//!    relaxed; when nothing survives the pass fails with the run index.

mod quota;

pub use quota::PairQuota;

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::PairTypeMode;
use crate::error::{ConfigError, Result, ScheduleError};
use crate::intermission::IntermissionPlan;
use crate::models::{ObjectId, ObjectPair, Relaxation, Roster};
use crate::rules::{self, HardRule};
use crate::tiebreak::TieBreaker;

/// A run's object pair plus whatever the sequencer had to give up for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedPair {
    pub pair: ObjectPair,
    pub relaxations: Vec<Relaxation>,
}

#[derive(Debug, Clone)]
struct PoolEntry {
    pair: ObjectPair,
    kind: usize,
    boundary_ready: bool,
}

/// Candidates for one run and the placement currently taken from them.
struct SearchFrame {
    candidates: Vec<usize>,
    next: usize,
    /// (kind, previous last-used run) to undo on backtrack.
    taken: Option<(usize, u32)>,
}

impl SearchFrame {
    fn new(candidates: Vec<usize>) -> Self {
        Self {
            candidates,
            next: 0,
            taken: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchOutcome {
    Found,
    Exhausted,
    BudgetSpent,
}

pub struct PairSequencer<'a> {
    plan: &'a IntermissionPlan,
    force_none: bool,
    run_count: u32,
    search_budget: u32,
    pool: Vec<PoolEntry>,
    kinds: usize,
}

impl<'a> PairSequencer<'a> {
    pub fn new(
        roster: &Roster,
        plan: &'a IntermissionPlan,
        force_none: bool,
        pair_types: PairTypeMode,
        search_budget: u32,
        tie: &mut TieBreaker,
    ) -> Result<Self> {
        if roster.object_count() < 2 {
            return Err(ConfigError::TooFewObjects {
                found: roster.object_count(),
            }
            .into());
        }

        let mut pairs: Vec<ObjectPair> = roster
            .object_ids()
            .flat_map(|a| roster.object_ids().map(move |b| ObjectPair::new(a, b)))
            .filter(|&pair| rules::distinct_objects(pair))
            .collect();
        tie.shuffle(&mut pairs);

        let mut kind_of: HashMap<(ObjectId, ObjectId), usize> = HashMap::new();
        let mut pool = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let key = match pair_types {
                PairTypeMode::Ordered => (pair.a, pair.b),
                PairTypeMode::Unordered => (pair.a.min(pair.b), pair.a.max(pair.b)),
            };
            let next = kind_of.len();
            let kind = *kind_of.entry(key).or_insert(next);
            let boundary_ready = (roster.permits_none(pair.a) || roster.permits_none(pair.b))
                && (roster.permits_performer(pair.a) || roster.permits_performer(pair.b));
            pool.push(PoolEntry {
                pair,
                kind,
                boundary_ready,
            });
        }

        Ok(Self {
            plan,
            force_none,
            run_count: plan.run_count,
            search_budget,
            pool,
            kinds: kind_of.len(),
        })
    }

    /// Number of distinct pair types the quota is spread over.
    pub fn pair_types(&self) -> usize {
        self.kinds
    }

    /// Whether the quota owes every pair type at least one run.
    pub fn covers_every_pair_type(&self) -> bool {
        self.run_count as usize >= self.kinds
    }

    /// The pool in tie-break order.
    pub fn pairs(&self) -> impl Iterator<Item = ObjectPair> + '_ {
        self.pool.iter().map(|entry| entry.pair)
    }

    fn wants_boundary(&self, run: u32) -> bool {
        self.force_none && self.plan.boundary(run).is_some()
    }

    pub fn sequence(&self) -> Result<Vec<SequencedPair>> {
        let mut quota = PairQuota::new(self.run_count, self.kinds);
        let mut picked = Vec::with_capacity(self.run_count as usize);
        let mut nodes = 0u32;

        match self.search(&mut quota, &mut picked, &mut nodes) {
            SearchOutcome::Found => {
                debug!(nodes, runs = self.run_count, "pair sequence found by search");
                return Ok(picked
                    .into_iter()
                    .map(|idx| SequencedPair {
                        pair: self.pool[idx].pair,
                        relaxations: Vec::new(),
                    })
                    .collect());
            }
            SearchOutcome::Exhausted => {
                warn!(
                    runs = self.run_count,
                    "no pair sequence satisfies every rule; falling back to relaxation"
                );
            }
            SearchOutcome::BudgetSpent => {
                warn!(
                    budget = self.search_budget,
                    "pair search budget spent; falling back to relaxation"
                );
            }
        }

        self.greedy()
    }

    /// Strictly valid pool indices for `run`, best first.
    fn strict_candidates(&self, run: u32, prev: Option<ObjectPair>, quota: &PairQuota) -> Vec<usize> {
        let remaining = self.run_count - run;
        let wants = self.wants_boundary(run);
        let mut out: Vec<usize> = self
            .pool
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                if let Some(prev) = prev {
                    if !rules::no_position_repeat(prev, entry.pair)
                        || rules::is_full_swap(prev, entry.pair)
                    {
                        return false;
                    }
                }
                quota.admits(entry.kind, remaining) && (!wants || entry.boundary_ready)
            })
            .map(|(idx, _)| idx)
            .collect();
        out.sort_by_key(|&idx| {
            let kind = self.pool[idx].kind;
            (quota.count(kind), quota.last_used(kind), idx)
        });
        out
    }

    /// One frame per placed run.
    fn search(
        &self,
        quota: &mut PairQuota,
        picked: &mut Vec<usize>,
        nodes: &mut u32,
    ) -> SearchOutcome {
        if self.run_count == 0 {
            return SearchOutcome::Found;
        }
        *nodes += 1;
        if *nodes > self.search_budget {
            return SearchOutcome::BudgetSpent;
        }

        let mut stack = vec![SearchFrame::new(self.strict_candidates(1, None, quota))];
        loop {
            let run = stack.len() as u32;
            let Some(frame) = stack.last_mut() else {
                return SearchOutcome::Exhausted;
            };
            if let Some((kind, previous)) = frame.taken.take() {
                picked.pop();
                quota.untake(kind, previous);
            }
            if frame.next == frame.candidates.len() {
                stack.pop();
                continue;
            }
            let idx = frame.candidates[frame.next];
            frame.next += 1;

            let entry = &self.pool[idx];
            frame.taken = Some((entry.kind, quota.take(entry.kind, run)));
            picked.push(idx);
            if run == self.run_count {
                return SearchOutcome::Found;
            }

            *nodes += 1;
            if *nodes > self.search_budget {
                return SearchOutcome::BudgetSpent;
            }
            let candidates = self.strict_candidates(run + 1, Some(entry.pair), quota);
            stack.push(SearchFrame::new(candidates));
        }
    }

    /// Single greedy pass with the relaxation ladder.
    fn greedy(&self) -> Result<Vec<SequencedPair>> {
        let mut quota = PairQuota::new(self.run_count, self.kinds);
        let mut out = Vec::with_capacity(self.run_count as usize);
        let mut prev: Option<ObjectPair> = None;
        let mut prev_swap = false;

        for run in 1..=self.run_count {
            let remaining = self.run_count - run;
            let wants = self.wants_boundary(run);

            // level 0: strict, 1: quota relaxed, 2: + boundary, 3: + I5
            let mut chosen = None;
            for level in 0..4 {
                let mut best: Option<((bool, u32, u32, usize), usize, bool)> = None;
                for (idx, entry) in self.pool.iter().enumerate() {
                    let mut swap = false;
                    if let Some(prev) = prev {
                        if !rules::no_position_repeat(prev, entry.pair) {
                            continue;
                        }
                        if rules::is_full_swap(prev, entry.pair) {
                            if level < 3 || prev_swap {
                                continue;
                            }
                            swap = true;
                        }
                    }
                    if level < 1 && !quota.admits(entry.kind, remaining) {
                        continue;
                    }
                    let boundary_miss = wants && !entry.boundary_ready;
                    if level < 2 && boundary_miss {
                        continue;
                    }
                    let rank = (
                        boundary_miss,
                        quota.count(entry.kind),
                        quota.last_used(entry.kind),
                        idx,
                    );
                    if best.map_or(true, |(current, _, _)| rank < current) {
                        best = Some((rank, idx, swap));
                    }
                }
                if best.is_some() {
                    chosen = best;
                    break;
                }
            }

            let Some(((boundary_miss, ..), idx, swap)) = chosen else {
                return Err(ScheduleError::PairSequencing {
                    run,
                    rule: HardRule::NoPositionRepeat,
                });
            };

            let entry = &self.pool[idx];
            let mut relaxations = Vec::new();
            if !quota.admits(entry.kind, remaining) {
                relaxations.push(Relaxation::Quota);
            }
            if boundary_miss {
                relaxations.push(Relaxation::Boundary);
            }
            if swap {
                relaxations.push(Relaxation::FullSwap);
            }
            for relaxation in &relaxations {
                warn!(run, relaxation = relaxation.label(), "pair rule relaxed");
            }

            quota.take(entry.kind, run);
            out.push(SequencedPair {
                pair: entry.pair,
                relaxations,
            });
            prev = Some(entry.pair);
            prev_swap = swap;
        }

        debug!(deviation = quota.deviation(), "greedy pair sequence complete");
        Ok(out)
    }
}
