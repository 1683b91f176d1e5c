//! Show configuration (YAML).
//!
//! ```yaml
//! show:
//!   name: R.U.R.
//!   start_time: "7:00 PM"
//!   run_count: 12
//!   step_minutes: 10
//!   seed: none            # or an integer
//!   force_none_at_intermission: true
//!   intermission:
//!     every_n_runs: 6
//!     length_minutes: 15
//! characters:
//!   - { name: Domin, offset_start_min: 0, offset_end_min: 8 }
//!   - { name: Alquist, offset_start_min: 2, offset_end_min: 10 }
//! performers: [Moose, Luca]
//! objects:
//!   - { name: Shirt, performer: all }
//!   - { name: Animatronic, performer: none }
//!   - { name: Robot, performer: [Luca, None] }
//! ```
//!
//! `ShowConfig::roster` turns the raw document into a validated [`Roster`];
//! nothing downstream sees unvalidated input.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::intermission::IntermissionPlan;
use crate::models::{Eligibility, PerformerId, Roster, StageObject};
use crate::scheduler::SchedulerOptions;

/// Default node budget for the pair-sequence search.
pub const DEFAULT_SEARCH_BUDGET: u32 = 50_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowConfig {
    pub show: ShowSection,
    #[serde(default)]
    pub characters: Vec<CharacterConfig>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowSection {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    pub run_count: u32,
    #[serde(default)]
    pub step_minutes: u32,
    #[serde(default)]
    pub seed: Option<SeedSpec>,
    #[serde(default)]
    pub intermission: IntermissionConfig,
    #[serde(default)]
    pub force_none_at_intermission: bool,
    #[serde(default)]
    pub pair_types: PairTypeMode,
    #[serde(default = "default_search_budget")]
    pub search_budget: u32,
}

fn default_start_time() -> String {
    "7:00 PM".to_string()
}

fn default_search_budget() -> u32 {
    DEFAULT_SEARCH_BUDGET
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntermissionConfig {
    #[serde(default)]
    pub every_n_runs: u32,
    #[serde(default)]
    pub length_minutes: u32,
}

/// A position's display name and its on-stage window relative to run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub name: String,
    #[serde(default)]
    pub offset_start_min: i64,
    #[serde(default)]
    pub offset_end_min: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub name: String,
    #[serde(default)]
    pub performer: PerformerSpec,
}

/// `all` / `any`, `none`, a single performer name, or a list of names
/// (which may contain `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerformerSpec {
    One(String),
    Many(Vec<String>),
}

impl Default for PerformerSpec {
    fn default() -> Self {
        PerformerSpec::One("none".to_string())
    }
}

/// An integer seed, or the keyword `none` for sequential tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedSpec {
    Value(u64),
    Keyword(String),
}

/// Whether (x, y) and (y, x) count as one pair type for quota purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairTypeMode {
    #[default]
    Ordered,
    Unordered,
}

fn is_none_keyword(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("none")
}

fn is_all_keyword(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("all") || v.eq_ignore_ascii_case("any")
}

impl ShowConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Performer names with the `None` placeholder filtered out.
    fn performer_names(&self) -> Vec<String> {
        self.performers
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && !is_none_keyword(p))
            .collect()
    }

    /// Validate and build the roster.
    pub fn roster(&self) -> Result<Roster, ConfigError> {
        if self.show.run_count == 0 {
            return Err(ConfigError::NoRuns);
        }
        if self.characters.len() != 2 {
            return Err(ConfigError::CharacterCount {
                found: self.characters.len(),
            });
        }

        let performers = self.performer_names();
        let mut seen = HashSet::new();
        for name in &performers {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicatePerformer { name: name.clone() });
            }
        }
        let lookup = |object: &str, name: &str| -> Result<PerformerId, ConfigError> {
            performers
                .iter()
                .position(|p| p == name.trim())
                .map(PerformerId)
                .ok_or_else(|| ConfigError::UnknownPerformer {
                    object: object.to_string(),
                    performer: name.trim().to_string(),
                })
        };

        let mut objects = Vec::with_capacity(self.objects.len());
        let mut seen_objects = HashSet::new();
        for (index, raw) in self.objects.iter().enumerate() {
            let name = raw.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyObjectName { index });
            }
            if !seen_objects.insert(name) {
                return Err(ConfigError::DuplicateObject {
                    name: name.to_string(),
                });
            }

            let eligibility = match &raw.performer {
                PerformerSpec::One(value) if is_all_keyword(value) => Eligibility::Any,
                PerformerSpec::One(value) if is_none_keyword(value) => Eligibility::Unperformed,
                PerformerSpec::One(value) => Eligibility::Only {
                    performers: vec![lookup(name, value)?],
                    allows_none: false,
                },
                PerformerSpec::Many(values) => {
                    if values.iter().any(|v| is_all_keyword(v)) {
                        Eligibility::Any
                    } else {
                        let mut ids = Vec::new();
                        let mut allows_none = false;
                        for value in values {
                            if is_none_keyword(value) {
                                allows_none = true;
                                continue;
                            }
                            let id = lookup(name, value)?;
                            if !ids.contains(&id) {
                                ids.push(id);
                            }
                        }
                        Eligibility::Only {
                            performers: ids,
                            allows_none,
                        }
                    }
                }
            };

            let empty = match &eligibility {
                Eligibility::Any => performers.is_empty(),
                Eligibility::Unperformed => false,
                Eligibility::Only {
                    performers,
                    allows_none,
                } => performers.is_empty() && !allows_none,
            };
            if empty {
                return Err(ConfigError::NoEligiblePerformers {
                    object: name.to_string(),
                });
            }

            objects.push(StageObject::new(name, eligibility));
        }

        if objects.len() < 2 {
            return Err(ConfigError::TooFewObjects {
                found: objects.len(),
            });
        }

        Ok(Roster::new(objects, performers))
    }

    /// `None` means sequential tie-breaking.
    pub fn seed(&self) -> Result<Option<u64>, ConfigError> {
        match &self.show.seed {
            None => Ok(None),
            Some(SeedSpec::Value(seed)) => Ok(Some(*seed)),
            Some(SeedSpec::Keyword(value)) if is_none_keyword(value) || value.trim().is_empty() => {
                Ok(None)
            }
            Some(SeedSpec::Keyword(value)) => match value.trim().parse::<u64>() {
                Ok(seed) => Ok(Some(seed)),
                Err(_) => Err(ConfigError::InvalidSeed {
                    value: value.clone(),
                }),
            },
        }
    }

    pub fn intermission_plan(&self) -> IntermissionPlan {
        IntermissionPlan::new(
            self.show.intermission.every_n_runs,
            self.show.intermission.length_minutes,
            self.show.run_count,
        )
    }

    pub fn scheduler_options(&self) -> Result<SchedulerOptions, ConfigError> {
        Ok(SchedulerOptions {
            run_count: self.show.run_count,
            seed: self.seed()?,
            intermission: self.intermission_plan(),
            force_none_at_intermission: self.show.force_none_at_intermission,
            pair_types: self.show.pair_types,
            search_budget: self.show.search_budget,
        })
    }

    /// Position A and B display names. Falls back to `"A"` / `"B"` when
    /// the characters list is malformed.
    pub fn character_names(&self) -> [&str; 2] {
        match self.characters.as_slice() {
            [a, b] => [a.name.as_str(), b.name.as_str()],
            _ => ["A", "B"],
        }
    }
}
