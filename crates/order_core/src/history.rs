//! History Tracker
//!
//! Cumulative per-(position, object, performer) and per-performer state,
//! written once per finished run by the scheduler and read by the
//! assignment engine for gap and balance scoring.
//!
//! Intermissions never reach `record`: gap arithmetic is over run indices
//! only, so a break neither inflates nor deflates a gap.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ObjectId, PerformerId, Position, Roster};

/// Gap reported for a triple that has never been used.
pub const NEVER_USED: u32 = u32::MAX;

type Triple = (Position, ObjectId, Option<PerformerId>);

#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    last_used: BTreeMap<Triple, u32>,
    /// `[A, B]` appearances per performer.
    position_counts: Vec<[u32; 2]>,
    /// Appearances per performer per object.
    object_counts: Vec<Vec<u32>>,
}

impl HistoryTracker {
    pub fn new(performer_count: usize, object_count: usize) -> Self {
        Self {
            last_used: BTreeMap::new(),
            position_counts: vec![[0; 2]; performer_count],
            object_counts: vec![vec![0; object_count]; performer_count],
        }
    }

    pub fn for_roster(roster: &Roster) -> Self {
        Self::new(roster.performer_count(), roster.object_count())
    }

    /// Record one slot of a finished run. Empty slots update the last-used
    /// index but no counts.
    pub fn record(
        &mut self,
        run_index: u32,
        position: Position,
        object: ObjectId,
        performer: Option<PerformerId>,
    ) {
        self.last_used.insert((position, object, performer), run_index);

        if let Some(p) = performer {
            if let Some(counts) = self.position_counts.get_mut(p.0) {
                counts[position.index()] += 1;
            }
            if let Some(slot) = self
                .object_counts
                .get_mut(p.0)
                .and_then(|row| row.get_mut(object.0))
            {
                *slot += 1;
            }
        }
    }

    /// `run_index - last_used` for the triple, or `NEVER_USED`.
    pub fn gap(
        &self,
        position: Position,
        object: ObjectId,
        performer: Option<PerformerId>,
        run_index: u32,
    ) -> u32 {
        match self.last_used(position, object, performer) {
            Some(last) => run_index.saturating_sub(last),
            None => NEVER_USED,
        }
    }

    pub fn last_used(
        &self,
        position: Position,
        object: ObjectId,
        performer: Option<PerformerId>,
    ) -> Option<u32> {
        self.last_used.get(&(position, object, performer)).copied()
    }

    pub fn position_counts(&self, performer: PerformerId) -> [u32; 2] {
        self.position_counts
            .get(performer.0)
            .copied()
            .unwrap_or([0; 2])
    }

    pub fn position_count(&self, performer: PerformerId, position: Position) -> u32 {
        self.position_counts(performer)[position.index()]
    }

    pub fn object_count(&self, performer: PerformerId, object: ObjectId) -> u32 {
        self.object_counts
            .get(performer.0)
            .and_then(|row| row.get(object.0))
            .copied()
            .unwrap_or(0)
    }

    pub fn object_counts(&self, performer: PerformerId) -> &[u32] {
        self.object_counts
            .get(performer.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn performer_count(&self) -> usize {
        self.position_counts.len()
    }

    /// Name-resolved copy for diagnostics output.
    pub fn snapshot(&self, roster: &Roster, characters: [&str; 2]) -> HistorySnapshot {
        let last_used = self
            .last_used
            .iter()
            .map(|(&(position, object, performer), &run)| LastUse {
                character: characters[position.index()].to_string(),
                object: roster.object_name(object).to_string(),
                performer: roster.performer_label(performer).to_string(),
                run,
            })
            .collect();

        let performers = roster
            .performer_ids()
            .map(|p| {
                let [a, b] = self.position_counts(p);
                PerformerTally {
                    performer: roster.performer_name(p).to_string(),
                    by_character: BTreeMap::from([
                        (characters[0].to_string(), a),
                        (characters[1].to_string(), b),
                    ]),
                    by_object: roster
                        .object_ids()
                        .map(|o| (roster.object_name(o).to_string(), self.object_count(p, o)))
                        .collect(),
                }
            })
            .collect();

        HistorySnapshot {
            last_used,
            performers,
        }
    }
}

/// Serializable view of a tracker.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    pub last_used: Vec<LastUse>,
    pub performers: Vec<PerformerTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastUse {
    pub character: String,
    pub object: String,
    pub performer: String,
    pub run: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformerTally {
    pub performer: String,
    pub by_character: BTreeMap<String, u32>,
    pub by_object: BTreeMap<String, u32>,
}
