use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::agent::Policy;
use crate::game::NUM_AGENTS;
use crate::venue::PayoutOrder;

/// Heuristic comparison for a dice-bidding venue game
#[derive(Parser, Debug)]
#[command(name = "croupier", version, about)]
pub struct CliArgs {
    /// Path to TOML config file
    #[arg(short, long, default_value = "configs/default.toml")]
    pub config: PathBuf,

    // --- Overrides ---
    /// Games per lineup
    #[arg(long)]
    pub trials: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Run only the named lineup
    #[arg(long)]
    pub lineup: Option<String>,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// smallest_first (reference behavior) or largest_first
    #[arg(long)]
    pub payout_order: Option<String>,

    /// Write an aggregate JSON summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Sequential trials with per-round narration
    #[arg(long)]
    pub verbose: bool,
}

/// A named roster of five policy tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupSpec {
    pub name: String,
    pub policies: Vec<String>,
}

impl LineupSpec {
    /// Parse the tags into the fixed-size lineup. Misspelled tags are a
    /// configuration error; the forfeit variant must be requested
    /// explicitly as "unknown".
    pub fn parse(&self) -> Result<[Policy; NUM_AGENTS]> {
        if self.policies.len() != NUM_AGENTS {
            bail!(
                "lineup '{}' names {} policies, expected {NUM_AGENTS}",
                self.name,
                self.policies.len()
            );
        }
        let parsed: Vec<Policy> = self
            .policies
            .iter()
            .map(|tag| tag.parse())
            .collect::<Result<_>>()
            .with_context(|| format!("lineup '{}'", self.name))?;
        Ok(parsed.try_into().expect("length checked above"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub payout_order: PayoutOrder,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_lineups")]
    pub lineups: Vec<LineupSpec>,
}

fn default_trials() -> usize {
    100
}
fn default_seed() -> u64 {
    42
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("results")
}

/// The six reference rosters: one of each heuristic, then one uniform
/// roster per heuristic.
fn default_lineups() -> Vec<LineupSpec> {
    let mut lineups = vec![LineupSpec {
        name: "mixed".to_string(),
        policies: Policy::CANONICAL
            .iter()
            .map(|p| p.name().to_string())
            .collect(),
    }];
    for policy in Policy::CANONICAL {
        lineups.push(LineupSpec {
            name: format!("all-{}", policy.name()),
            policies: vec![policy.name().to_string(); NUM_AGENTS],
        });
    }
    lineups
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            seed: default_seed(),
            payout_order: PayoutOrder::default(),
            out_dir: default_out_dir(),
            lineups: default_lineups(),
        }
    }
}

impl Config {
    /// Load config from TOML file, apply CLI overrides
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config: Config = if args.config.exists() {
            let content = fs::read_to_string(&args.config)
                .with_context(|| format!("Failed to read config: {:?}", args.config))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {:?}", args.config))?
        } else {
            Config::default()
        };

        config.apply_cli_overrides(args)?;
        Ok(config)
    }

    fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(trials) = args.trials {
            self.trials = trials;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(dir) = &args.out_dir {
            self.out_dir = dir.clone();
        }
        if let Some(order) = &args.payout_order {
            self.payout_order = order.parse()?;
        }
        Ok(())
    }

    /// Validate configuration parameters, lineups included. Runs before
    /// any game is constructed.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            bail!("trials must be > 0");
        }
        if self.lineups.is_empty() {
            bail!("at least one lineup is required");
        }
        let mut names = HashSet::new();
        for spec in &self.lineups {
            if !names.insert(spec.name.as_str()) {
                bail!("duplicate lineup name '{}'", spec.name);
            }
            spec.parse()?;
        }
        Ok(())
    }

    /// The lineups to run, optionally restricted to one by name.
    pub fn selected_lineups(&self, filter: Option<&str>) -> Result<Vec<&LineupSpec>> {
        match filter {
            None => Ok(self.lineups.iter().collect()),
            Some(name) => {
                let spec = self
                    .lineups
                    .iter()
                    .find(|spec| spec.name == name)
                    .with_context(|| {
                        let known: Vec<&str> =
                            self.lineups.iter().map(|s| s.name.as_str()).collect();
                        format!("unknown lineup '{name}' (known: {})", known.join(", "))
                    })?;
                Ok(vec![spec])
            }
        }
    }
}
