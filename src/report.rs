//! Per-trial CSV rows, console summaries, and the aggregate JSON export.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::agent::Policy;
use crate::game::{Outcome, NUM_AGENTS};

/// Line writer for one lineup's trial results:
/// `experiment_<name>.csv`, a header of slot policy names and one
/// normalized-share row per trial.
pub struct CsvReport {
    writer: BufWriter<File>,
}

impl CsvReport {
    pub fn create(out_dir: &Path, name: &str, slots: &[Policy; NUM_AGENTS]) -> Result<Self> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;
        let path = out_dir.join(format!("experiment_{name}.csv"));
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let header: Vec<&str> = slots.iter().map(|p| p.name()).collect();
        writeln!(writer, "{}", header.join(","))?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, outcome: &Outcome) -> Result<()> {
        let row: Vec<String> = outcome.shares.iter().map(f64::to_string).collect();
        writeln!(self.writer, "{}", row.join(","))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Aggregate view of one lineup's trials, in report order.
#[derive(Debug, Clone, Serialize)]
pub struct LineupSummary {
    pub name: String,
    pub trials: usize,
    pub policies: Vec<Policy>,
    pub mean_shares: Vec<f64>,
    /// Per slot, how many trials it won.
    pub wins: Vec<usize>,
    pub mean_rounds: f64,
}

impl LineupSummary {
    pub fn from_outcomes(name: &str, slots: &[Policy; NUM_AGENTS], outcomes: &[Outcome]) -> Self {
        let trials = outcomes.len();
        let mut mean_shares = vec![0.0; NUM_AGENTS];
        let mut wins = vec![0usize; NUM_AGENTS];
        let mut rounds = 0usize;
        for outcome in outcomes {
            for (acc, share) in mean_shares.iter_mut().zip(outcome.shares) {
                *acc += share;
            }
            wins[outcome.winner] += 1;
            rounds += outcome.rounds;
        }
        if trials > 0 {
            for acc in &mut mean_shares {
                *acc /= trials as f64;
            }
        }
        Self {
            name: name.to_string(),
            trials,
            policies: slots.to_vec(),
            mean_shares,
            wins,
            mean_rounds: if trials > 0 {
                rounds as f64 / trials as f64
            } else {
                0.0
            },
        }
    }
}

/// Fixed-width console table for one lineup.
pub fn print_summary(summary: &LineupSummary) {
    println!();
    println!(
        "=== {} ({} trials, mean {:.1} rounds) ===",
        summary.name, summary.trials, summary.mean_rounds
    );
    println!(" {:>4}  {:10}  {:>11}  {:>6}", "slot", "policy", "mean share", "wins");
    println!("{:-<38}", "");
    for slot in 0..NUM_AGENTS {
        println!(
            " {:>4}  {:10}  {:>11.4}  {:>6}",
            slot,
            summary.policies[slot].name(),
            summary.mean_shares[slot],
            summary.wins[slot]
        );
    }
}

/// Aggregate JSON export across all lineups run.
pub fn write_summary_json(path: &Path, summaries: &[LineupSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
