//! Permutation Assignment Engine
//!
//! Chooses the performer for each position of a run whose object pair is
//! already fixed by the sequencer.
//!
//! Per run:
//! 1. Candidate performers per position come from the object's eligibility.
//! 2. The cross product is filtered by I1 and I4 (against the previous run).
//!    An empty result is an assignment infeasibility naming the rule.
//! 3. Survivors are ranked by [`CandidateScore`], compared field by field:
//!    boundary requirement, variety across the break, gap, balance, and
//!    a mild preference for two real performers on the first and last run.
//!    The first candidate with the best score wins.
//!
//! [`can_staff`] answers the I1 question for a pair up front, so a roster
//! that can never fill some pair is rejected before any run is built.

use std::cmp::Reverse;
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::history::HistoryTracker;
use crate::intermission::IntermissionPlan;
use crate::models::{
    Assignment, BoundarySide, ObjectPair, PerformerId, Position, Roster, ScheduledRun,
};
use crate::rules::{self, HardRule};
use crate::tiebreak::TieBreaker;

/// Points for one slot's distance since its (position, object, performer)
/// triple last appeared. I3 rules out distance 1, so the tiers separate
/// "two or more runs in between" from "exactly one in between".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GapTier {
    Adjacent = 0,
    Near = 1,
    Spaced = 2,
}

impl GapTier {
    pub fn from_gap(gap: u32) -> Self {
        match gap {
            0..=1 => GapTier::Adjacent,
            2 => GapTier::Near,
            _ => GapTier::Spaced,
        }
    }

    pub fn points(self) -> u32 {
        self as u32
    }
}

/// Ordered score; field order is priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateScore {
    pub boundary_met: bool,
    pub variety_kept: bool,
    pub gap_points: u32,
    pub balance: Reverse<u32>,
    pub edge_staffed: bool,
}

/// Whether any performer combination for `pair` satisfies I1.
pub fn can_staff(roster: &Roster, pair: ObjectPair) -> bool {
    let b_candidates = roster.candidates(pair.b);
    roster.candidates(pair.a).into_iter().any(|pa| {
        let a = Assignment::new(pair.a, pa);
        b_candidates
            .iter()
            .any(|&pb| rules::distinct_performers(&a, &Assignment::new(pair.b, pb)))
    })
}

pub struct AssignmentEngine<'a> {
    roster: &'a Roster,
    plan: &'a IntermissionPlan,
    force_none: bool,
    /// Real performer beside the empty slot on the last run before a break.
    break_partner: Option<PerformerId>,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(roster: &'a Roster, plan: &'a IntermissionPlan, force_none: bool) -> Self {
        Self {
            roster,
            plan,
            force_none,
            break_partner: None,
        }
    }

    /// Pick performers for `pair` at `run`. Does not touch `history`; the
    /// caller records the result once the run is final.
    pub fn assign(
        &mut self,
        run: u32,
        pair: ObjectPair,
        previous: Option<&ScheduledRun>,
        history: &HistoryTracker,
        tie: &mut TieBreaker,
    ) -> Result<(Assignment, Assignment)> {
        let mut combos: Vec<(Assignment, Assignment)> = Vec::new();
        for pa in self.roster.candidates(pair.a) {
            for pb in self.roster.candidates(pair.b) {
                combos.push((Assignment::new(pair.a, pa), Assignment::new(pair.b, pb)));
            }
        }
        tie.shuffle(&mut combos);

        combos.retain(|(a, b)| rules::distinct_performers(a, b));
        if combos.is_empty() {
            return Err(ScheduleError::Assignment {
                run,
                rule: HardRule::DistinctPerformers,
            });
        }

        // min_by_key keeps the first of equal scores
        let best = combos
            .into_iter()
            .filter(|(a, b)| {
                previous.map_or(true, |prev| rules::switch_keeps_performer(prev, a, b))
            })
            .map(|combo| (self.score(run, &combo, history), combo))
            .min_by_key(|(score, _)| Reverse(*score));
        let Some((score, (a, b))) = best else {
            return Err(ScheduleError::Assignment {
                run,
                rule: HardRule::SwitchKeepsPerformer,
            });
        };

        debug!(
            run,
            a = %self.roster.performer_label(a.performer),
            b = %self.roster.performer_label(b.performer),
            gap_points = score.gap_points,
            boundary_met = score.boundary_met,
            "run assigned"
        );

        if self.forced_boundary(run).is_some_and(|side| side.precedes_break()) {
            self.break_partner = match (a.performer, b.performer) {
                (Some(p), None) | (None, Some(p)) => Some(p),
                _ => None,
            };
        }

        Ok((a, b))
    }

    fn forced_boundary(&self, run: u32) -> Option<BoundarySide> {
        if self.force_none {
            self.plan.boundary(run)
        } else {
            None
        }
    }

    pub fn score(
        &self,
        run: u32,
        (a, b): &(Assignment, Assignment),
        history: &HistoryTracker,
    ) -> CandidateScore {
        let side = self.forced_boundary(run);

        let boundary_met = side.is_none() || (a.performer.is_none() != b.performer.is_none());

        let variety_kept = match (side, self.break_partner) {
            (Some(side), Some(partner)) if side.follows_break() => {
                a.performer != Some(partner) && b.performer != Some(partner)
            }
            _ => true,
        };

        let gap_points = [(Position::A, a), (Position::B, b)]
            .iter()
            .filter(|(_, slot)| slot.performer.is_some())
            .map(|(position, slot)| {
                GapTier::from_gap(history.gap(*position, slot.object, slot.performer, run))
                    .points()
            })
            .sum();

        let balance = Reverse(self.balance_penalty(a, b, history));

        let edge_run = run == 1 || run == self.plan.run_count;
        let edge_staffed = !(edge_run && (a.performer.is_none() || b.performer.is_none()));

        CandidateScore {
            boundary_met,
            variety_kept,
            gap_points,
            balance,
            edge_staffed,
        }
    }

    /// Imbalance after tentatively adding the candidate: 5 per unit of
    /// A/B difference, plus the spread of per-object counts, per performer.
    fn balance_penalty(&self, a: &Assignment, b: &Assignment, history: &HistoryTracker) -> u32 {
        self.roster
            .performer_ids()
            .map(|p| {
                let mut by_position = history.position_counts(p);
                let mut by_object = history.object_counts(p).to_vec();
                for (position, slot) in [(Position::A, a), (Position::B, b)] {
                    if slot.performer == Some(p) {
                        by_position[position.index()] += 1;
                        if let Some(count) = by_object.get_mut(slot.object.0) {
                            *count += 1;
                        }
                    }
                }
                let spread = match (by_object.iter().max(), by_object.iter().min()) {
                    (Some(max), Some(min)) => max - min,
                    _ => 0,
                };
                by_position[0].abs_diff(by_position[1]) * 5 + spread
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Eligibility, ObjectId, StageObject};

    fn roster(performers: &[&str]) -> Roster {
        Roster::new(
            vec![
                StageObject::new("Shirt", Eligibility::Any),
                StageObject::new("Muppet", Eligibility::Any),
                StageObject::new("Animatronic", Eligibility::Unperformed),
                StageObject::new("Robot", Eligibility::Any),
            ],
            performers.iter().map(|p| p.to_string()).collect(),
        )
    }

    fn pair(a: usize, b: usize) -> ObjectPair {
        ObjectPair::new(ObjectId(a), ObjectId(b))
    }

    fn finished(index: u32, a: Assignment, b: Assignment) -> ScheduledRun {
        ScheduledRun {
            index,
            a,
            b,
            boundary: None,
            relaxations: Vec::new(),
        }
    }

    #[test]
    fn test_gap_tiers() {
        assert_eq!(GapTier::from_gap(0), GapTier::Adjacent);
        assert_eq!(GapTier::from_gap(1), GapTier::Adjacent);
        assert_eq!(GapTier::from_gap(2), GapTier::Near);
        assert_eq!(GapTier::from_gap(3), GapTier::Spaced);
        assert_eq!(GapTier::from_gap(crate::history::NEVER_USED), GapTier::Spaced);
        assert!(GapTier::Spaced > GapTier::Near);
    }

    #[test]
    fn test_single_performer_two_performed_objects_fails_i1() {
        let roster = roster(&["Moose"]);
        let plan = IntermissionPlan::none(12);
        let mut engine = AssignmentEngine::new(&roster, &plan, false);
        let history = HistoryTracker::for_roster(&roster);
        let mut tie = TieBreaker::from_seed(None);

        let err = engine
            .assign(1, pair(0, 1), None, &history, &mut tie)
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Assignment {
                run: 1,
                rule: HardRule::DistinctPerformers
            }
        ));
    }

    #[test]
    fn test_switching_object_keeps_performer() {
        let roster = roster(&["Moose", "Luca"]);
        let plan = IntermissionPlan::none(12);
        let mut engine = AssignmentEngine::new(&roster, &plan, false);
        let mut history = HistoryTracker::for_roster(&roster);
        let mut tie = TieBreaker::from_seed(None);

        // Run 1: B = Shirt/Luca.
        let previous = finished(
            1,
            Assignment::new(ObjectId(1), Some(PerformerId(0))),
            Assignment::new(ObjectId(0), Some(PerformerId(1))),
        );
        history.record(1, Position::A, ObjectId(1), Some(PerformerId(0)));
        history.record(1, Position::B, ObjectId(0), Some(PerformerId(1)));

        // Run 2: Shirt moves to A and must stay with Luca.
        let (a, b) = engine
            .assign(2, pair(0, 3), Some(&previous), &history, &mut tie)
            .unwrap();
        assert_eq!(a.performer, Some(PerformerId(1)));
        assert_eq!(b.performer, Some(PerformerId(0)));
    }

    #[test]
    fn test_switch_conflict_reports_i4() {
        // Only Moose may play the Robot; the Shirt arrives from B with Moose.
        let roster = Roster::new(
            vec![
                StageObject::new("Shirt", Eligibility::Any),
                StageObject::new("Muppet", Eligibility::Any),
                StageObject::new(
                    "Robot",
                    Eligibility::Only {
                        performers: vec![PerformerId(0)],
                        allows_none: false,
                    },
                ),
            ],
            vec!["Moose".to_string(), "Luca".to_string()],
        );
        let plan = IntermissionPlan::none(4);
        let mut engine = AssignmentEngine::new(&roster, &plan, false);
        let history = HistoryTracker::for_roster(&roster);
        let mut tie = TieBreaker::from_seed(None);
        let previous = finished(
            1,
            Assignment::new(ObjectId(1), Some(PerformerId(1))),
            Assignment::new(ObjectId(0), Some(PerformerId(0))),
        );

        let err = engine
            .assign(2, pair(0, 2), Some(&previous), &history, &mut tie)
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Assignment {
                run: 2,
                rule: HardRule::SwitchKeepsPerformer
            }
        ));
    }

    #[test]
    fn test_gap_preference_picks_fresh_triple() {
        let roster = roster(&["Moose", "Luca"]);
        let plan = IntermissionPlan::none(12);
        let mut engine = AssignmentEngine::new(&roster, &plan, false);
        let mut history = HistoryTracker::for_roster(&roster);
        let mut tie = TieBreaker::from_seed(None);

        // Shirt/Moose in A at run 2 makes it "Near" at run 4.
        history.record(2, Position::A, ObjectId(0), Some(PerformerId(0)));
        history.record(2, Position::B, ObjectId(1), Some(PerformerId(1)));
        history.record(3, Position::A, ObjectId(1), Some(PerformerId(1)));
        history.record(3, Position::B, ObjectId(3), Some(PerformerId(0)));

        let (a, b) = engine.assign(4, pair(0, 2), None, &history, &mut tie).unwrap();
        assert_eq!(a.performer, Some(PerformerId(1)));
        assert_eq!(b.performer, None);
    }

    #[test]
    fn test_boundary_forces_exactly_one_empty_slot() {
        let roster = Roster::new(
            vec![
                StageObject::new("Shirt", Eligibility::Any),
                StageObject::new(
                    "Robot",
                    Eligibility::Only {
                        performers: vec![PerformerId(0), PerformerId(1)],
                        allows_none: true,
                    },
                ),
                StageObject::new(
                    "Puppet",
                    Eligibility::Only {
                        performers: vec![PerformerId(0), PerformerId(1)],
                        allows_none: true,
                    },
                ),
            ],
            vec!["Moose".to_string(), "Luca".to_string()],
        );
        let plan = IntermissionPlan::new(2, 10, 4);
        let history = HistoryTracker::for_roster(&roster);
        let mut tie = TieBreaker::from_seed(None);

        let mut engine = AssignmentEngine::new(&roster, &plan, true);
        assert_eq!(plan.boundary(2), Some(BoundarySide::Before));
        let (a, b) = engine.assign(2, pair(1, 2), None, &history, &mut tie).unwrap();
        assert_eq!(
            [a.performer, b.performer].iter().filter(|p| p.is_none()).count(),
            1
        );

        // Without the flag nobody is left empty mid-show.
        let mut relaxed = AssignmentEngine::new(&roster, &plan, false);
        let (a, b) = relaxed.assign(2, pair(1, 2), None, &history, &mut tie).unwrap();
        assert!(a.performer.is_some() && b.performer.is_some());
    }

    #[test]
    fn test_variety_across_the_break() {
        let roster = Roster::new(
            vec![
                StageObject::new("Shirt", Eligibility::Any),
                StageObject::new("Animatronic", Eligibility::Unperformed),
                StageObject::new("Robot", Eligibility::Any),
            ],
            vec!["Moose".to_string(), "Luca".to_string()],
        );
        let plan = IntermissionPlan::new(2, 10, 4);
        let mut history = HistoryTracker::for_roster(&roster);
        let mut tie = TieBreaker::from_seed(None);
        let mut engine = AssignmentEngine::new(&roster, &plan, true);

        // Run 2 (before the break): Shirt/Moose beside the Animatronic.
        let (a2, b2) = engine.assign(2, pair(0, 1), None, &history, &mut tie).unwrap();
        assert_eq!(a2.performer, Some(PerformerId(0)));
        history.record(2, Position::A, a2.object, a2.performer);
        history.record(2, Position::B, b2.object, b2.performer);
        let previous = finished(2, a2, b2);

        // Run 3 (after the break): the Robot goes to Luca, not Moose again.
        let (a3, b3) = engine
            .assign(3, pair(1, 2), Some(&previous), &history, &mut tie)
            .unwrap();
        assert_eq!(a3.performer, None);
        assert_eq!(b3.performer, Some(PerformerId(1)));
    }

    #[test]
    fn test_score_orders_boundary_before_gap() {
        let low_gap = CandidateScore {
            boundary_met: true,
            variety_kept: true,
            gap_points: 0,
            balance: Reverse(50),
            edge_staffed: false,
        };
        let high_gap = CandidateScore {
            boundary_met: false,
            gap_points: 4,
            balance: Reverse(0),
            edge_staffed: true,
            ..low_gap
        };
        assert!(low_gap > high_gap);
        let better_balance = CandidateScore {
            balance: Reverse(10),
            ..low_gap
        };
        assert!(better_balance > low_gap);
    }
}
