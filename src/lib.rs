//! Simulation engine and experiment harness for a five-player
//! dice-bidding venue game: agents roll shrinking hands of dice, commit
//! same-faced groups into venues, and venues pay out their prize pools
//! to the largest ownership groups at settlement. Five decision
//! heuristics compete; the experiment layer replays lineups across many
//! seeded trials and reports normalized winnings.

pub mod agent;
pub mod config;
pub mod die;
pub mod experiment;
pub mod game;
pub mod report;
pub mod venue;

pub use agent::{choose_group, Agent, DiceGroup, Policy};
pub use die::{Die, DieColor};
pub use experiment::Experiment;
pub use game::{Game, Outcome, HAND_SIZE, NUM_AGENTS};
pub use venue::{PayoutOrder, Prize, Venue, FUNDING_FLOOR, VENUE_COUNT};
