//! Agents and their decision heuristics.
//!
//! Each policy looks at the agent's hand grouped by top face and picks
//! exactly one group to commit. Selection is pure: [`choose_group`]
//! returns the index of the chosen group and mutates nothing; the round
//! loop performs the single removal and the deposits.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use crate::die::Die;
use crate::venue::{Prize, Venue};

/// Decision heuristics. Closed set; `Unknown` forfeits its turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Commit the largest group; uniform-random among ties.
    Alpha,
    /// Commit the group matching the venue with the single highest
    /// remaining top prize; random fallback on ties or no match.
    Bravo,
    /// As Bravo, but "most remaining prizes by count".
    Charlie,
    /// In the highest-top-prize venue, commit the matching group iff the
    /// resulting deposit count exceeds every opponent's; else random.
    Delta,
    /// As Delta, but the resulting count must equal some opponent's.
    Echo,
    /// Plays no group.
    Unknown,
}

impl Policy {
    /// Canonical report order for the five playing policies.
    pub const CANONICAL: [Policy; 5] = [
        Policy::Alpha,
        Policy::Bravo,
        Policy::Charlie,
        Policy::Delta,
        Policy::Echo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Policy::Alpha => "alpha",
            Policy::Bravo => "bravo",
            Policy::Charlie => "charlie",
            Policy::Delta => "delta",
            Policy::Echo => "echo",
            Policy::Unknown => "unknown",
        }
    }

    /// Position in the canonical report order; `Unknown` sorts last.
    pub fn canonical_rank(self) -> usize {
        match self {
            Policy::Alpha => 0,
            Policy::Bravo => 1,
            Policy::Charlie => 2,
            Policy::Delta => 3,
            Policy::Echo => 4,
            Policy::Unknown => 5,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha" => Ok(Policy::Alpha),
            "bravo" => Ok(Policy::Bravo),
            "charlie" => Ok(Policy::Charlie),
            "delta" => Ok(Policy::Delta),
            "echo" => Ok(Policy::Echo),
            "unknown" | "forfeit" => Ok(Policy::Unknown),
            other => bail!(
                "unknown policy '{other}' (expected alpha, bravo, charlie, delta, echo, or unknown)"
            ),
        }
    }
}

/// One same-faced subset of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceGroup {
    pub face: u8,
    pub size: usize,
}

/// A participant: a fixed policy, a fixed turn-order key, a shrinking
/// hand, and the prizes credited at settlement.
#[derive(Debug, Clone)]
pub struct Agent {
    pub policy: Policy,
    /// Turn-order key, assigned once at setup. Also the seat index.
    pub priority: usize,
    pub hand: Vec<Die>,
    /// Empty until settlement.
    pub winnings: Vec<Prize>,
}

impl Agent {
    pub fn new(policy: Policy, priority: usize, hand: Vec<Die>) -> Self {
        Self {
            policy,
            priority,
            hand,
            winnings: Vec::new(),
        }
    }

    pub fn roll_hand(&mut self, rng: &mut StdRng) {
        for die in &mut self.hand {
            die.roll(rng);
        }
    }

    /// Disjoint groups per face value present in the hand, ascending by
    /// face.
    pub fn groups_by_face(&self) -> Vec<DiceGroup> {
        let mut groups = Vec::new();
        for face in 1..=6 {
            let size = self.hand.iter().filter(|die| die.top_face == face).count();
            if size > 0 {
                groups.push(DiceGroup { face, size });
            }
        }
        groups
    }

    pub fn total_winnings(&self) -> u32 {
        self.winnings.iter().map(|prize| prize.amount).sum()
    }
}

/// Pick the group the given policy commits this turn, or `None` for a
/// forfeit. `groups` must be the current hand's groups; `opponents` are
/// the other seats in the game. Every random selection draws exactly
/// once, single-candidate fallbacks included.
pub fn choose_group(
    policy: Policy,
    seat: usize,
    groups: &[DiceGroup],
    venues: &[Venue],
    opponents: &[usize],
    rng: &mut StdRng,
) -> Option<usize> {
    if groups.is_empty() {
        return None;
    }
    match policy {
        Policy::Alpha => Some(choose_largest_group(groups, rng)),
        Policy::Bravo => Some(choose_by_venue(groups, venues, rng, |v| v.top_prize())),
        Policy::Charlie => Some(choose_by_venue(groups, venues, rng, |v| v.prize_count() as u32)),
        Policy::Delta => Some(choose_versus(groups, venues, seat, opponents, rng, CountGoal::Exceed)),
        Policy::Echo => Some(choose_versus(groups, venues, seat, opponents, rng, CountGoal::Match)),
        Policy::Unknown => None,
    }
}

fn random_group(groups: &[DiceGroup], rng: &mut StdRng) -> usize {
    rng.gen_range(0..groups.len())
}

fn choose_largest_group(groups: &[DiceGroup], rng: &mut StdRng) -> usize {
    let best = groups.iter().map(|g| g.size).max().expect("groups are non-empty");
    let candidates: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.size == best)
        .map(|(i, _)| i)
        .collect();
    candidates[rng.gen_range(0..candidates.len())]
}

/// Bravo/Charlie skeleton: rank venues by a key, and commit the group
/// matching the unique best venue. Several venues tied for best, or no
/// matching group, falls back to a uniform-random group.
fn choose_by_venue<K>(groups: &[DiceGroup], venues: &[Venue], rng: &mut StdRng, key: K) -> usize
where
    K: Fn(&Venue) -> u32,
{
    let best = venues.iter().map(&key).max().unwrap_or(0);
    let mut holders = venues.iter().filter(|&v| key(v) == best);
    match (holders.next(), holders.next()) {
        (Some(venue), None) => groups
            .iter()
            .position(|g| g.face == venue.id)
            .unwrap_or_else(|| random_group(groups, rng)),
        _ => random_group(groups, rng),
    }
}

#[derive(Clone, Copy)]
enum CountGoal {
    /// Exceed every opponent's current deposit count.
    Exceed,
    /// Equal some opponent's current deposit count.
    Match,
}

/// Delta/Echo skeleton: restricted to the venue holding the single
/// highest top prize, commit the matching group iff the resulting own
/// deposit count satisfies the goal against the opponents' live counts.
fn choose_versus(
    groups: &[DiceGroup],
    venues: &[Venue],
    seat: usize,
    opponents: &[usize],
    rng: &mut StdRng,
    goal: CountGoal,
) -> usize {
    let target = richest_venue(venues);
    if let Some(idx) = groups.iter().position(|g| g.face == target.id) {
        let would_have = target.count_owned_by(seat) + groups[idx].size;
        let satisfied = match goal {
            CountGoal::Exceed => opponents
                .iter()
                .all(|&opp| target.count_owned_by(opp) < would_have),
            CountGoal::Match => opponents
                .iter()
                .any(|&opp| target.count_owned_by(opp) == would_have),
        };
        if satisfied {
            return idx;
        }
    }
    random_group(groups, rng)
}

/// First venue in id order holding the maximal top prize.
fn richest_venue(venues: &[Venue]) -> &Venue {
    let (first, rest) = venues.split_first().expect("game has venues");
    let mut best = first;
    for venue in rest {
        if venue.top_prize() > best.top_prize() {
            best = venue;
        }
    }
    best
}
