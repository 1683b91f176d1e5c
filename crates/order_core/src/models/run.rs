//! Run-level output types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::roster::{ObjectId, PerformerId};

/// One of the two concurrent on-stage roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    A,
    B,
}

impl Position {
    pub const ALL: [Position; 2] = [Position::A, Position::B];

    pub fn other(self) -> Position {
        match self {
            Position::A => Position::B,
            Position::B => Position::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Position::A => 0,
            Position::B => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Position::A => write!(f, "A"),
            Position::B => write!(f, "B"),
        }
    }
}

/// The objects of one run, before performers are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPair {
    pub a: ObjectId,
    pub b: ObjectId,
}

impl ObjectPair {
    pub fn new(a: ObjectId, b: ObjectId) -> Self {
        Self { a, b }
    }

    pub fn object(&self, position: Position) -> ObjectId {
        match position {
            Position::A => self.a,
            Position::B => self.b,
        }
    }

    pub fn reversed(&self) -> ObjectPair {
        ObjectPair::new(self.b, self.a)
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.a == object || self.b == object
    }
}

/// (object, performer-or-none) bound to one position of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub object: ObjectId,
    pub performer: Option<PerformerId>,
}

impl Assignment {
    pub fn new(object: ObjectId, performer: Option<PerformerId>) -> Self {
        Self { object, performer }
    }

    pub fn is_unperformed(&self) -> bool {
        self.performer.is_none()
    }
}

/// Which side of an intermission a run touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundarySide {
    /// Last run before a break.
    Before,
    /// First run after a break.
    After,
    /// Both: a single run sandwiched between two breaks.
    Between,
}

impl BoundarySide {
    pub fn precedes_break(self) -> bool {
        matches!(self, BoundarySide::Before | BoundarySide::Between)
    }

    pub fn follows_break(self) -> bool {
        matches!(self, BoundarySide::After | BoundarySide::Between)
    }
}

/// A preference or relaxable rule the pair sequencer had to give up for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relaxation {
    /// Pair-type counts may now differ by more than one.
    Quota,
    /// Boundary run without a none-capable object beside a performed one.
    Boundary,
    /// Exact reverse of the previous run's pair (I5 relaxed).
    FullSwap,
}

impl Relaxation {
    pub const ALL: [Relaxation; 3] = [Relaxation::Quota, Relaxation::Boundary, Relaxation::FullSwap];

    /// Inverse of [`Relaxation::label`].
    pub fn from_label(label: &str) -> Option<Relaxation> {
        let label = label.trim();
        Relaxation::ALL.into_iter().find(|r| r.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Relaxation::Quota => "quota relaxed",
            Relaxation::Boundary => "boundary relaxed",
            Relaxation::FullSwap => "full swap relaxed",
        }
    }
}

/// A finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRun {
    /// 1-based run number; intermissions are not counted.
    pub index: u32,
    pub a: Assignment,
    pub b: Assignment,
    pub boundary: Option<BoundarySide>,
    #[serde(default)]
    pub relaxations: Vec<Relaxation>,
}

impl ScheduledRun {
    pub fn slot(&self, position: Position) -> &Assignment {
        match position {
            Position::A => &self.a,
            Position::B => &self.b,
        }
    }

    pub fn pair(&self) -> ObjectPair {
        ObjectPair::new(self.a.object, self.b.object)
    }

    pub fn is_relaxed(&self, relaxation: Relaxation) -> bool {
        self.relaxations.contains(&relaxation)
    }

    /// Number of empty performer slots (0..=2).
    pub fn unperformed_slots(&self) -> usize {
        [self.a, self.b]
            .iter()
            .filter(|s| s.is_unperformed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_other() {
        assert_eq!(Position::A.other(), Position::B);
        assert_eq!(Position::B.other(), Position::A);
        assert_eq!(Position::B.index(), 1);
    }

    #[test]
    fn test_boundary_side_flags() {
        assert!(BoundarySide::Before.precedes_break());
        assert!(!BoundarySide::Before.follows_break());
        assert!(BoundarySide::Between.precedes_break());
        assert!(BoundarySide::Between.follows_break());
    }

    #[test]
    fn test_pair_helpers() {
        let pair = ObjectPair::new(ObjectId(0), ObjectId(2));
        assert_eq!(pair.reversed(), ObjectPair::new(ObjectId(2), ObjectId(0)));
        assert!(pair.contains(ObjectId(2)));
        assert!(!pair.contains(ObjectId(1)));
        assert_eq!(pair.object(Position::B), ObjectId(2));
    }

    #[test]
    fn test_relaxation_labels_parse_back() {
        for relaxation in Relaxation::ALL {
            assert_eq!(Relaxation::from_label(relaxation.label()), Some(relaxation));
        }
        assert_eq!(Relaxation::from_label(" quota relaxed "), Some(Relaxation::Quota));
        assert_eq!(Relaxation::from_label("swap"), None);
    }
}
