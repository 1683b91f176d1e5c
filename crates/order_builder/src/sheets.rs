//! Timing sheet and per-performer call sheets.
//!
//! ## Master sheet
//! One row per run (`Run`, `Time`, `<A>`, `<A>Performer`, `<B>`,
//! `<B>Performer`, `Notes`) plus an `Intermission` row after every run
//! that is followed by a break. The clock advances `step_minutes` per run
//! and `length_minutes` per break.
//!
//! ## Call sheets
//! One per configured performer, even when empty. A row per slot the
//! performer fills, with the character's in/out times from its offsets.

use anyhow::Result;
use order_core::models::{Position, NO_PERFORMER};
use order_core::{Schedule, ShowConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::timing::{add_minutes, format_show_time, parse_show_time};

pub const INTERMISSION_LABEL: &str = "Intermission";

/// Column suffix for a character's performer column.
pub const PERFORMER_SUFFIX: &str = "Performer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRow {
    /// Run number, or `Intermission`.
    pub run: String,
    pub time: String,
    pub a_object: String,
    pub a_performer: String,
    pub b_object: String,
    pub b_performer: String,
    pub notes: String,
}

impl MasterRow {
    pub fn is_intermission(&self) -> bool {
        self.run == INTERMISSION_LABEL
    }

    pub fn to_record(&self) -> [&str; 7] {
        [
            self.run.as_str(),
            self.time.as_str(),
            self.a_object.as_str(),
            self.a_performer.as_str(),
            self.b_object.as_str(),
            self.b_performer.as_str(),
            self.notes.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRow {
    #[serde(rename = "Run")]
    pub run: u32,
    #[serde(rename = "RunStart")]
    pub run_start: String,
    #[serde(rename = "Character")]
    pub character: String,
    #[serde(rename = "CharacterInTime")]
    pub in_time: String,
    #[serde(rename = "CharacterOutTime")]
    pub out_time: String,
}

#[derive(Debug, Clone)]
pub struct CallSheet {
    pub performer: String,
    pub rows: Vec<CallRow>,
}

#[derive(Debug, Clone)]
pub struct ShowSheets {
    pub headers: Vec<String>,
    pub master: Vec<MasterRow>,
    pub call_sheets: Vec<CallSheet>,
}

impl ShowSheets {
    pub fn run_rows(&self) -> impl Iterator<Item = &MasterRow> {
        self.master.iter().filter(|row| !row.is_intermission())
    }
}

pub fn master_headers(characters: [&str; 2]) -> Vec<String> {
    let mut headers = vec!["Run".to_string(), "Time".to_string()];
    for name in characters {
        headers.push(name.to_string());
        headers.push(format!("{}{}", name, PERFORMER_SUFFIX));
    }
    headers.push("Notes".to_string());
    headers
}

pub fn build_sheets(config: &ShowConfig, schedule: &Schedule) -> Result<ShowSheets> {
    let roster = &schedule.roster;
    let characters = config.character_names();
    let step = i64::from(config.show.step_minutes);
    let break_length = i64::from(config.show.intermission.length_minutes);

    let mut clock = parse_show_time(&config.show.start_time)?;
    let mut master = Vec::with_capacity(schedule.runs.len() + schedule.intermissions_after.len());
    let mut call_sheets: Vec<CallSheet> = roster
        .performers()
        .iter()
        .map(|name| CallSheet {
            performer: name.clone(),
            rows: Vec::new(),
        })
        .collect();

    for run in &schedule.runs {
        let run_start = format_show_time(clock);
        let notes: Vec<&str> = run.relaxations.iter().map(|r| r.label()).collect();

        master.push(MasterRow {
            run: run.index.to_string(),
            time: run_start.clone(),
            a_object: roster.object_name(run.a.object).to_string(),
            a_performer: roster.performer_label(run.a.performer).to_string(),
            b_object: roster.object_name(run.b.object).to_string(),
            b_performer: roster.performer_label(run.b.performer).to_string(),
            notes: notes.join("; "),
        });

        for position in Position::ALL {
            let Some(performer) = run.slot(position).performer else {
                continue;
            };
            let character = config.characters.get(position.index());
            let (start, end) = character
                .map(|c| (c.offset_start_min, c.offset_end_min))
                .unwrap_or((0, 0));
            if let Some(sheet) = call_sheets.get_mut(performer.0) {
                sheet.rows.push(CallRow {
                    run: run.index,
                    run_start: run_start.clone(),
                    character: characters[position.index()].to_string(),
                    in_time: format_show_time(add_minutes(clock, start)),
                    out_time: format_show_time(add_minutes(clock, end)),
                });
            }
        }

        clock = add_minutes(clock, step);

        if schedule.intermissions_after.contains(&run.index) {
            master.push(MasterRow {
                run: INTERMISSION_LABEL.to_string(),
                time: format_show_time(clock),
                a_object: String::new(),
                a_performer: String::new(),
                b_object: String::new(),
                b_performer: String::new(),
                notes: String::new(),
            });
            clock = add_minutes(clock, break_length);
        }
    }

    Ok(ShowSheets {
        headers: master_headers(characters),
        master,
        call_sheets,
    })
}

/// Lower-case, alphanumerics kept, everything else collapsed to one `_`.
pub fn sanitize_filename(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "performer".to_string()
    } else {
        trimmed.to_string()
    }
}

/// One file stem per performer, in order. Names that sanitise to the same
/// stem get `_2`, `_3`, ... in the order they appear.
pub fn call_sheet_stems<'a>(performers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut stems = Vec::new();
    for name in performers {
        let base = sanitize_filename(name);
        let mut stem = base.clone();
        let mut n = 2;
        while taken.contains(&stem) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        taken.insert(stem.clone());
        stems.push(stem);
    }
    stems
}

/// True for the literal empty-slot label.
pub fn is_no_performer(value: &str) -> bool {
    value.trim().is_empty() || value.trim().eq_ignore_ascii_case(NO_PERFORMER)
}
