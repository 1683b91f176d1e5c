//! Roster: the validated, immutable cast of a show.
//!
//! Objects and performers are addressed by dense indices (`ObjectId`,
//! `PerformerId`) into the roster. Names only matter at the edges
//! (config loading and sheet output).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an object in the roster (configured order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

/// Index of a performer in the roster (configured order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PerformerId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

impl fmt::Display for PerformerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "performer#{}", self.0)
    }
}

/// Label used for an empty performer slot in sheets and logs.
pub const NO_PERFORMER: &str = "None";

/// Who may embody an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Every rostered performer.
    Any,
    /// Nobody: the object runs on its own (animatronic prop).
    Unperformed,
    /// An explicit list, optionally also permitting the empty slot.
    Only {
        performers: Vec<PerformerId>,
        allows_none: bool,
    },
}

/// A stage object with its eligibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageObject {
    pub name: String,
    pub eligibility: Eligibility,
}

impl StageObject {
    pub fn new(name: impl Into<String>, eligibility: Eligibility) -> Self {
        Self {
            name: name.into(),
            eligibility,
        }
    }
}

/// Validated objects and performers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    objects: Vec<StageObject>,
    performers: Vec<String>,
}

impl Roster {
    /// Build a roster without validation. `ShowConfig::roster` is the
    /// validating constructor.
    pub fn new(objects: Vec<StageObject>, performers: Vec<String>) -> Self {
        Self {
            objects,
            performers,
        }
    }

    pub fn objects(&self) -> &[StageObject] {
        &self.objects
    }

    pub fn performers(&self) -> &[String] {
        &self.performers
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn performer_count(&self) -> usize {
        self.performers.len()
    }

    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> {
        (0..self.objects.len()).map(ObjectId)
    }

    pub fn performer_ids(&self) -> impl Iterator<Item = PerformerId> {
        (0..self.performers.len()).map(PerformerId)
    }

    pub fn object_name(&self, id: ObjectId) -> &str {
        &self.objects[id.0].name
    }

    pub fn performer_name(&self, id: PerformerId) -> &str {
        &self.performers[id.0]
    }

    /// Performer name, or `"None"` for an empty slot.
    pub fn performer_label(&self, performer: Option<PerformerId>) -> &str {
        match performer {
            Some(id) => self.performer_name(id),
            None => NO_PERFORMER,
        }
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .map(ObjectId)
    }

    pub fn find_performer(&self, name: &str) -> Option<PerformerId> {
        self.performers
            .iter()
            .position(|p| p == name)
            .map(PerformerId)
    }

    /// Performer choices for an object, in configured performer order.
    /// The empty slot (`None`) comes last when permitted.
    pub fn candidates(&self, object: ObjectId) -> Vec<Option<PerformerId>> {
        match &self.objects[object.0].eligibility {
            Eligibility::Any => self.performer_ids().map(Some).collect(),
            Eligibility::Unperformed => vec![None],
            Eligibility::Only {
                performers,
                allows_none,
            } => {
                let mut out: Vec<Option<PerformerId>> =
                    performers.iter().copied().map(Some).collect();
                if *allows_none {
                    out.push(None);
                }
                out
            }
        }
    }

    /// Whether the object may run without a performer.
    pub fn permits_none(&self, object: ObjectId) -> bool {
        match &self.objects[object.0].eligibility {
            Eligibility::Any => false,
            Eligibility::Unperformed => true,
            Eligibility::Only { allows_none, .. } => *allows_none,
        }
    }

    /// Whether at least one real performer may embody the object.
    pub fn permits_performer(&self, object: ObjectId) -> bool {
        match &self.objects[object.0].eligibility {
            Eligibility::Any => !self.performers.is_empty(),
            Eligibility::Unperformed => false,
            Eligibility::Only { performers, .. } => !performers.is_empty(),
        }
    }
}
