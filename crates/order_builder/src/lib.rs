//! Order Builder Library
//!
//! Schedule → timing sheet + performer call sheets (CSV)
//! Master CSV → run list for re-validation
//! History tracker → JSON snapshot

pub mod sheets;
pub mod timing;

use anyhow::{bail, Context, Result};
use order_core::history::HistorySnapshot;
use order_core::models::{BoundarySide, Eligibility, StageObject};
use order_core::{
    validate_runs, Assignment, ObjectId, PerformerId, Relaxation, Roster, Schedule, ScheduledRun,
    ShowConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub use sheets::{
    build_sheets, call_sheet_stems, is_no_performer, master_headers, sanitize_filename, CallRow,
    CallSheet, MasterRow, ShowSheets, INTERMISSION_LABEL, PERFORMER_SUFFIX,
};
pub use timing::{format_show_time, parse_show_time};

pub const MASTER_FILE: &str = "show_order.csv";
pub const PERFORMERS_DIR: &str = "performers";
pub const CALL_HEADERS: [&str; 5] = [
    "Run",
    "RunStart",
    "Character",
    "CharacterInTime",
    "CharacterOutTime",
];

/// What `write_sheets` produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetManifest {
    pub master: PathBuf,
    pub call_sheets: Vec<PathBuf>,
    pub runs: usize,
    pub intermissions: usize,
    /// RFC3339
    pub created_at: String,
}

/// Write `show_order.csv` and `performers/<name>.csv` under `out_dir`.
/// Performers whose names sanitise alike get numbered files.
pub fn write_sheets(out_dir: &Path, sheets: &ShowSheets) -> Result<SheetManifest> {
    let performers_dir = out_dir.join(PERFORMERS_DIR);
    fs::create_dir_all(&performers_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            performers_dir.display()
        )
    })?;

    let master = out_dir.join(MASTER_FILE);
    write_master_sheet(&master, sheets)?;

    let stems = call_sheet_stems(sheets.call_sheets.iter().map(|s| s.performer.as_str()));
    let mut call_sheets = Vec::with_capacity(sheets.call_sheets.len());
    for (sheet, stem) in sheets.call_sheets.iter().zip(stems) {
        let path = performers_dir.join(format!("{}.csv", stem));
        write_call_sheet(&path, &sheet.rows)?;
        call_sheets.push(path);
    }

    Ok(SheetManifest {
        master,
        call_sheets,
        runs: sheets.run_rows().count(),
        intermissions: sheets.master.len() - sheets.run_rows().count(),
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Re-check every hard rule on `schedule`; only a clean schedule reaches disk.
pub fn write_checked_sheets(
    out_dir: &Path,
    config: &ShowConfig,
    schedule: &Schedule,
) -> Result<SheetManifest> {
    let report = validate_runs(&schedule.runs);
    if !report.is_valid() {
        bail!("Generated schedule failed validation:\n{}", report.summary());
    }
    let sheets = build_sheets(config, schedule)?;
    write_sheets(out_dir, &sheets)
}

pub fn write_master_sheet(path: &Path, sheets: &ShowSheets) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    writer.write_record(&sheets.headers)?;
    for row in &sheets.master {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Header row is written even for a performer with no calls.
pub fn write_call_sheet(path: &Path, rows: &[CallRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    writer.write_record(CALL_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_call_sheet(path: &Path) -> Result<Vec<CallRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.with_context(|| format!("Bad row in {}", path.display()))?);
    }
    Ok(rows)
}

pub fn write_history(path: &Path, snapshot: &HistorySnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize history")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write history file: {}", path.display()))?;
    Ok(())
}

// =============================================================================
// Reading a master sheet back
// =============================================================================

/// Runs rebuilt from a master CSV. Objects and performers are interned in
/// first-seen order, so ids are only meaningful against `roster`.
#[derive(Debug, Clone)]
pub struct MasterSheet {
    pub characters: [String; 2],
    pub roster: Roster,
    pub runs: Vec<ScheduledRun>,
}

#[derive(Default)]
struct Interner {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Interner {
    fn id(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }
}

pub fn read_master_sheet(path: &Path) -> Result<MasterSheet> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let headers = reader.headers()?.clone();

    if headers.len() < 6 || &headers[0] != "Run" {
        bail!(
            "{}: expected columns Run, Time, <A>, <A>Performer, <B>, <B>Performer",
            path.display()
        );
    }
    let characters = [headers[2].to_string(), headers[4].to_string()];
    for (column, name) in [(3, &characters[0]), (5, &characters[1])] {
        if headers[column] != format!("{}{}", name, PERFORMER_SUFFIX) {
            bail!(
                "{}: column {} should be {}{}",
                path.display(),
                column + 1,
                name,
                PERFORMER_SUFFIX
            );
        }
    }
    let notes_column = headers.iter().position(|h| h == "Notes");

    let mut objects = Interner::default();
    let mut performers = Interner::default();
    let mut runs: Vec<ScheduledRun> = Vec::new();
    let mut break_pending = false;

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad row {} in {}", line + 2, path.display()))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        if field(0) == INTERMISSION_LABEL {
            if let Some(last) = runs.last_mut() {
                last.boundary = Some(match last.boundary {
                    Some(BoundarySide::After) | Some(BoundarySide::Between) => {
                        BoundarySide::Between
                    }
                    _ => BoundarySide::Before,
                });
            }
            break_pending = true;
            continue;
        }

        let index: u32 = field(0)
            .parse()
            .with_context(|| format!("Row {}: bad run number {:?}", line + 2, field(0)))?;
        let mut slot = |object: &str, performer: &str| {
            let object = ObjectId(objects.id(object));
            let performer = if is_no_performer(performer) {
                None
            } else {
                Some(PerformerId(performers.id(performer)))
            };
            Assignment::new(object, performer)
        };
        let a = slot(field(2), field(3));
        let b = slot(field(4), field(5));
        let relaxations = notes_column
            .map(|c| {
                field(c)
                    .split(';')
                    .filter_map(Relaxation::from_label)
                    .collect()
            })
            .unwrap_or_default();

        runs.push(ScheduledRun {
            index,
            a,
            b,
            boundary: break_pending.then_some(BoundarySide::After),
            relaxations,
        });
        break_pending = false;
    }

    let roster = Roster::new(
        objects
            .names
            .into_iter()
            .map(|name| StageObject::new(name, Eligibility::Any))
            .collect(),
        performers.names,
    );

    Ok(MasterSheet {
        characters,
        roster,
        runs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_core::{generate_schedule, validate_runs, HardRule, ShowConfig};
    use tempfile::TempDir;

    const CONFIG: &str = r#"
show:
  name: R.U.R.
  start_time: "7:00 PM"
  run_count: 12
  step_minutes: 10
  seed: 3
  force_none_at_intermission: true
  intermission:
    every_n_runs: 6
    length_minutes: 15
characters:
  - { name: Domin, offset_start_min: 0, offset_end_min: 8 }
  - { name: Alquist, offset_start_min: 2, offset_end_min: 10 }
performers: [Moose, Luca, None]
objects:
  - { name: Shirt, performer: all }
  - { name: Muppet, performer: all }
  - { name: Animatronic, performer: none }
  - { name: Robot, performer: all }
"#;

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ShowConfig::from_yaml_str(CONFIG)?;
        let schedule = generate_schedule(&config)?;
        let sheets = build_sheets(&config, &schedule)?;

        let manifest = write_sheets(dir.path(), &sheets)?;
        assert_eq!(manifest.runs, 12);
        assert_eq!(manifest.intermissions, 1);
        assert_eq!(manifest.call_sheets.len(), 2);
        assert!(manifest.call_sheets[0].ends_with("performers/moose.csv"));

        let read = read_master_sheet(&manifest.master)?;
        assert_eq!(read.characters, ["Domin".to_string(), "Alquist".to_string()]);
        assert_eq!(read.runs.len(), 12);
        assert_eq!(read.runs[5].boundary, Some(BoundarySide::Before));
        assert_eq!(read.runs[6].boundary, Some(BoundarySide::After));
        assert!(validate_runs(&read.runs).is_valid());

        for (original, reread) in schedule.runs.iter().zip(&read.runs) {
            assert_eq!(original.index, reread.index);
            assert_eq!(
                schedule.roster.object_name(original.a.object),
                read.roster.object_name(reread.a.object)
            );
            assert_eq!(
                schedule.roster.performer_label(original.b.performer),
                read.roster.performer_label(reread.b.performer)
            );
            assert_eq!(original.relaxations, reread.relaxations);
        }

        let moose = read_call_sheet(&manifest.call_sheets[0])?;
        let expected = sheets.call_sheets[0].rows.clone();
        assert_eq!(moose, expected);
        Ok(())
    }

    #[test]
    fn test_invalid_schedule_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ShowConfig::from_yaml_str(CONFIG)?;
        let mut schedule = generate_schedule(&config)?;
        let run = schedule
            .runs
            .iter_mut()
            .find(|run| run.a.performer.is_some() && run.b.performer.is_some())
            .unwrap();
        run.b.performer = run.a.performer;

        let err = write_checked_sheets(dir.path(), &config, &schedule).unwrap_err();
        assert!(err.to_string().contains("failed validation"));
        assert!(!dir.path().join(MASTER_FILE).exists());
        assert!(!dir.path().join(PERFORMERS_DIR).exists());

        let clean = generate_schedule(&config)?;
        let manifest = write_checked_sheets(dir.path(), &config, &clean)?;
        assert!(manifest.master.exists());
        Ok(())
    }

    #[test]
    fn test_colliding_performer_names_keep_both_sheets() -> Result<()> {
        let dir = TempDir::new()?;
        let row = |run: u32| CallRow {
            run,
            run_start: "7:00 PM".to_string(),
            character: "Domin".to_string(),
            in_time: "7:00 PM".to_string(),
            out_time: "7:08 PM".to_string(),
        };
        let sheets = ShowSheets {
            headers: master_headers(["Domin", "Alquist"]),
            master: Vec::new(),
            call_sheets: vec![
                CallSheet {
                    performer: "Mary Kate".to_string(),
                    rows: vec![row(1)],
                },
                CallSheet {
                    performer: "mary-kate".to_string(),
                    rows: vec![row(2), row(3)],
                },
            ],
        };

        let manifest = write_sheets(dir.path(), &sheets)?;
        assert!(manifest.call_sheets[0].ends_with("performers/mary_kate.csv"));
        assert!(manifest.call_sheets[1].ends_with("performers/mary_kate_2.csv"));
        assert_eq!(read_call_sheet(&manifest.call_sheets[0])?, vec![row(1)]);
        assert_eq!(read_call_sheet(&manifest.call_sheets[1])?, vec![row(2), row(3)]);
        Ok(())
    }

    #[test]
    fn test_empty_call_sheet_keeps_header() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nobody.csv");
        write_call_sheet(&path, &[])?;
        let text = fs::read_to_string(&path)?;
        assert_eq!(text.trim(), CALL_HEADERS.join(","));
        assert!(read_call_sheet(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_hand_edited_sheet_is_flagged() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(MASTER_FILE);
        fs::write(
            &path,
            "Run,Time,Domin,DominPerformer,Alquist,AlquistPerformer,Notes\n\
             1,7:00 PM,Shirt,Moose,Muppet,Luca,\n\
             2,7:10 PM,Shirt,Luca,Robot,Moose,\n\
             Intermission,7:20 PM,,,,,\n\
             3,7:35 PM,Robot,Luca,Shirt,Luca,\n",
        )?;

        let read = read_master_sheet(&path)?;
        assert_eq!(read.runs.len(), 3);
        assert_eq!(read.roster.object_count(), 3);
        let report = validate_runs(&read.runs);
        assert!(!report.is_valid());
        assert_eq!(report.count(HardRule::NoPositionRepeat), 1);
        assert_eq!(report.count(HardRule::DistinctPerformers), 1);
        Ok(())
    }

    #[test]
    fn test_relaxed_swap_survives_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(MASTER_FILE);
        fs::write(
            &path,
            "Run,Time,Domin,DominPerformer,Alquist,AlquistPerformer,Notes\n\
             1,7:00 PM,Shirt,Moose,Muppet,Luca,\n\
             2,7:10 PM,Muppet,Luca,Shirt,Moose,full swap relaxed\n",
        )?;
        let read = read_master_sheet(&path)?;
        assert!(read.runs[1].is_relaxed(Relaxation::FullSwap));
        assert!(validate_runs(&read.runs).is_valid());
        Ok(())
    }

    #[test]
    fn test_rejects_foreign_csv() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("other.csv");
        fs::write(&path, "a,b,c\n1,2,3\n")?;
        assert!(read_master_sheet(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_history_json() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ShowConfig::from_yaml_str(CONFIG)?;
        let schedule = generate_schedule(&config)?;
        let path = dir.path().join("history.json");
        write_history(
            &path,
            &schedule.history.snapshot(&schedule.roster, config.character_names()),
        )?;

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(value["performers"].as_array().map(Vec::len), Some(2));
        assert!(!value["last_used"].as_array().unwrap().is_empty());
        Ok(())
    }
}
