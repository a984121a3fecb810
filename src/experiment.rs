//! The experiment driver: repeated independent games under one roster.
//!
//! Trial `t` is seeded `base_seed + t`, so a run is reproducible and the
//! trials are free to execute in parallel — each game owns disjoint
//! state and its own RNG.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::agent::Policy;
use crate::config::{Config, LineupSpec};
use crate::game::{Game, Outcome, NUM_AGENTS};
use crate::venue::PayoutOrder;

pub struct Experiment {
    pub name: String,
    /// Seat assignment in turn order.
    pub lineup: [Policy; NUM_AGENTS],
    pub trials: usize,
    pub base_seed: u64,
    pub payout_order: PayoutOrder,
}

impl Experiment {
    pub fn new(spec: &LineupSpec, config: &Config) -> Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            lineup: spec.parse()?,
            trials: config.trials,
            base_seed: config.seed,
            payout_order: config.payout_order,
        })
    }

    /// The lineup in report order: (canonical policy rank, then seat).
    /// Every trial's outcome slots line up with this.
    pub fn slot_policies(&self) -> [Policy; NUM_AGENTS] {
        let mut order: Vec<usize> = (0..NUM_AGENTS).collect();
        order.sort_by_key(|&seat| (self.lineup[seat].canonical_rank(), seat));
        let mut slots = [Policy::Unknown; NUM_AGENTS];
        for (slot, &seat) in order.iter().enumerate() {
            slots[slot] = self.lineup[seat];
        }
        slots
    }

    fn seed_for(&self, trial: usize) -> u64 {
        self.base_seed.wrapping_add(trial as u64)
    }

    /// Run all trials on the rayon pool. Outcomes come back in trial
    /// order regardless of scheduling.
    pub fn run(&self) -> Vec<Outcome> {
        let bar = ProgressBar::new(self.trials as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40}] {pos}/{len} trials ({eta})")
                .expect("valid template")
                .progress_chars("=> "),
        );

        let outcomes: Vec<Outcome> = (0..self.trials)
            .into_par_iter()
            .map(|trial| {
                let outcome =
                    Game::new(self.lineup, self.payout_order, self.seed_for(trial)).play();
                bar.inc(1);
                outcome
            })
            .collect();

        bar.finish_and_clear();
        outcomes
    }

    /// Sequential trials with per-round narration and a winner line per
    /// game.
    pub fn run_traced(&self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(self.trials);
        for trial in 0..self.trials {
            println!("Trial {trial}:");
            let mut game = Game::new(self.lineup, self.payout_order, self.seed_for(trial));
            while !game.is_finished() {
                game.play_round();
                print!("{}", game.render_state());
            }
            let outcome = game.settle();
            println!(
                "The winner is slot {} ({}) with {} after {} rounds.",
                outcome.winner,
                outcome.policies[outcome.winner],
                outcome.totals[outcome.winner],
                outcome.rounds
            );
            outcomes.push(outcome);
        }
        outcomes
    }
}
