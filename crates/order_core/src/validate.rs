//! Post-hoc audit of a finished run list against I1–I5.
//!
//! Works on any `ScheduledRun` slice, whether freshly generated or read back
//! from an edited sheet. A full swap on a run that carries
//! `Relaxation::FullSwap` is listed as relaxed rather than as a violation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Relaxation, ScheduledRun};
use crate::rules::{self, HardRule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: HardRule,
    pub run: u32,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run {}: {} ({})", self.run, self.rule.code(), self.detail)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub runs_checked: usize,
    pub violations: Vec<Violation>,
    /// (run, relaxation) pairs carried by the runs themselves.
    pub relaxed: Vec<(u32, Relaxation)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, rule: HardRule) -> usize {
        self.violations.iter().filter(|v| v.rule == rule).count()
    }

    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        HardRule::ALL
            .iter()
            .map(|&rule| (rule.code(), self.count(rule)))
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} runs checked, {} violation(s), {} relaxation(s)",
            self.runs_checked,
            self.violations.len(),
            self.relaxed.len()
        );
        for violation in &self.violations {
            out.push_str("\n  ");
            out.push_str(&violation.to_string());
        }
        for (run, relaxation) in &self.relaxed {
            out.push_str(&format!("\n  run {}: {}", run, relaxation.label()));
        }
        out
    }

    fn push(&mut self, rule: HardRule, run: u32, detail: String) {
        self.violations.push(Violation { rule, run, detail });
    }
}

pub fn validate_runs(runs: &[ScheduledRun]) -> ValidationReport {
    let mut report = ValidationReport {
        runs_checked: runs.len(),
        ..ValidationReport::default()
    };

    for (i, run) in runs.iter().enumerate() {
        for &relaxation in &run.relaxations {
            report.relaxed.push((run.index, relaxation));
        }

        if !rules::distinct_performers(&run.a, &run.b) {
            report.push(
                HardRule::DistinctPerformers,
                run.index,
                "same performer in both positions".to_string(),
            );
        }
        if !rules::distinct_objects(run.pair()) {
            report.push(
                HardRule::DistinctObjects,
                run.index,
                "same object in both positions".to_string(),
            );
        }

        let Some(previous) = i.checked_sub(1).and_then(|p| runs.get(p)) else {
            continue;
        };

        if !rules::no_position_repeat(previous.pair(), run.pair()) {
            report.push(
                HardRule::NoPositionRepeat,
                run.index,
                format!("repeats a position from run {}", previous.index),
            );
        }
        if !rules::switch_keeps_performer(previous, &run.a, &run.b) {
            report.push(
                HardRule::SwitchKeepsPerformer,
                run.index,
                format!("object changed position without its run {} performer", previous.index),
            );
        }
        if rules::is_full_swap(previous.pair(), run.pair())
            && !run.is_relaxed(Relaxation::FullSwap)
        {
            report.push(
                HardRule::NoFullSwap,
                run.index,
                format!("exact reverse of run {}", previous.index),
            );
        }
    }

    report
}
