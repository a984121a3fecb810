//! Venues: pooled betting destinations identified by a face value, each
//! holding a shrinking pool of prize amounts and the dice deposited by
//! every agent over the course of a game.
//!
//! Settlement groups a venue's deposits by color, pays one prize per group
//! in descending group-size order, and stops when groups or prizes run
//! out. The direction prizes are drawn from the pool is a [`PayoutOrder`]
//! policy: the reference behavior pays the *smallest* remaining prize
//! first, so the largest group does not receive the largest prize.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::die::{Die, DieColor};

/// Number of venues; venue ids run 1..=6 and double as the face value a
/// venue accepts.
pub const VENUE_COUNT: usize = 6;

/// A venue keeps drawing notes from the shuffled prize deck at setup
/// until its running total first reaches this floor.
pub const FUNDING_FLOOR: u32 = 50_000;

/// Which end of the descending-sorted prize pool settlement draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutOrder {
    /// Pop from the tail: the largest group is paid the smallest
    /// remaining prize. Reproduces the reference behavior.
    #[default]
    SmallestFirst,
    /// Draw from the head: the largest group is paid the largest
    /// remaining prize.
    LargestFirst,
}

impl fmt::Display for PayoutOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutOrder::SmallestFirst => f.write_str("smallest_first"),
            PayoutOrder::LargestFirst => f.write_str("largest_first"),
        }
    }
}

impl FromStr for PayoutOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "smallest_first" => Ok(PayoutOrder::SmallestFirst),
            "largest_first" => Ok(PayoutOrder::LargestFirst),
            other => bail!("unknown payout order '{other}' (expected smallest_first or largest_first)"),
        }
    }
}

/// A prize awarded at settlement: a monetary amount paired with the dice
/// group that won it. Attributed to the owner of the group's first die.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prize {
    pub amount: u32,
    pub dice: Vec<Die>,
}

impl Prize {
    /// Seat index of the winning agent.
    pub fn owner(&self) -> usize {
        self.dice.first().expect("prize group is never empty").owner
    }
}

#[derive(Debug, Clone)]
pub struct Venue {
    /// 1..=6; also the face value this venue accepts.
    pub id: u8,
    /// Sorted descending at creation; strictly shrinks during settlement.
    prizes: Vec<u32>,
    /// Dice contributed by any agent during the game, in arrival order.
    pub deposits: Vec<Die>,
}

impl Venue {
    pub fn new(id: u8, mut prizes: Vec<u32>) -> Self {
        prizes.sort_unstable_by(|a, b| b.cmp(a));
        Self {
            id,
            prizes,
            deposits: Vec::new(),
        }
    }

    /// Remaining prize amounts, descending.
    pub fn prizes(&self) -> &[u32] {
        &self.prizes
    }

    /// Highest remaining prize, or 0 once the pool is empty.
    pub fn top_prize(&self) -> u32 {
        self.prizes.first().copied().unwrap_or(0)
    }

    pub fn prize_count(&self) -> usize {
        self.prizes.len()
    }

    /// The caller guarantees the die's top face matches this venue.
    pub fn deposit(&mut self, die: Die) {
        debug_assert_eq!(die.top_face, self.id, "die deposited into the wrong venue");
        self.deposits.push(die);
    }

    /// How many deposited dice the given seat owns. A live scan, never a
    /// cached value.
    pub fn count_owned_by(&self, seat: usize) -> usize {
        self.deposits.iter().filter(|die| die.owner == seat).count()
    }

    /// Convert deposits into prizes: one group per contributing color,
    /// largest group paid first, ties kept in canonical color order (the
    /// groups are built in that order and the sort is stable). Produces
    /// at most `min(#groups, #prizes)` prizes; the smallest groups may
    /// receive nothing.
    pub fn settle(&mut self, order: PayoutOrder) -> Vec<Prize> {
        let mut groups: Vec<Vec<Die>> = Vec::new();
        for color in DieColor::ALL {
            let group: Vec<Die> = self
                .deposits
                .iter()
                .filter(|die| die.color == color)
                .cloned()
                .collect();
            if !group.is_empty() {
                groups.push(group);
            }
        }
        groups.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut awarded = Vec::new();
        for dice in groups {
            let amount = match order {
                PayoutOrder::SmallestFirst => self.prizes.pop(),
                PayoutOrder::LargestFirst => {
                    if self.prizes.is_empty() {
                        None
                    } else {
                        Some(self.prizes.remove(0))
                    }
                }
            };
            let Some(amount) = amount else { break };
            awarded.push(Prize { amount, dice });
        }
        awarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn die(face: u8, color: DieColor, owner: usize) -> Die {
        Die {
            faces: vec![face],
            top_face: face,
            color,
            owner,
        }
    }

    #[test]
    fn test_prizes_sorted_descending_at_creation() {
        let venue = Venue::new(1, vec![30_000, 90_000, 10_000]);
        assert_eq!(venue.prizes(), &[90_000, 30_000, 10_000]);
        assert_eq!(venue.top_prize(), 90_000);
        assert_eq!(venue.prize_count(), 3);
    }

    #[test]
    fn test_deposit_and_live_count() {
        let mut venue = Venue::new(2, vec![50_000]);
        venue.deposit(die(2, DieColor::Blue, 0));
        venue.deposit(die(2, DieColor::White, 1));
        venue.deposit(die(2, DieColor::Blue, 0));
        assert_eq!(venue.count_owned_by(0), 2);
        assert_eq!(venue.count_owned_by(1), 1);
        assert_eq!(venue.count_owned_by(4), 0);
    }

    #[test]
    fn test_single_prize_goes_to_larger_group() {
        let mut venue = Venue::new(3, vec![70_000]);
        for _ in 0..3 {
            venue.deposit(die(3, DieColor::Red, 3));
        }
        venue.deposit(die(3, DieColor::Green, 4));

        let prizes = venue.settle(PayoutOrder::SmallestFirst);
        assert_eq!(prizes.len(), 1);
        assert_eq!(prizes[0].amount, 70_000);
        assert_eq!(prizes[0].dice.len(), 3);
        assert_eq!(prizes[0].owner(), 3);
    }

    #[test]
    fn test_smallest_prize_is_paid_first() {
        let mut venue = Venue::new(1, vec![90_000, 30_000, 10_000]);
        venue.deposit(die(1, DieColor::Blue, 0));
        venue.deposit(die(1, DieColor::Blue, 0));
        venue.deposit(die(1, DieColor::White, 1));

        let prizes = venue.settle(PayoutOrder::SmallestFirst);
        assert_eq!(prizes.len(), 2);
        // Largest group first, but it draws the smallest prize.
        assert_eq!(prizes[0].owner(), 0);
        assert_eq!(prizes[0].amount, 10_000);
        assert_eq!(prizes[1].owner(), 1);
        assert_eq!(prizes[1].amount, 30_000);
        assert_eq!(venue.prizes(), &[90_000]);
    }

    #[test]
    fn test_largest_first_inverts_the_draw() {
        let mut venue = Venue::new(1, vec![90_000, 30_000, 10_000]);
        venue.deposit(die(1, DieColor::Blue, 0));
        venue.deposit(die(1, DieColor::Blue, 0));
        venue.deposit(die(1, DieColor::White, 1));

        let prizes = venue.settle(PayoutOrder::LargestFirst);
        assert_eq!(prizes[0].amount, 90_000);
        assert_eq!(prizes[1].amount, 30_000);
        assert_eq!(venue.prizes(), &[10_000]);
    }

    #[test]
    fn test_equal_groups_tie_break_in_canonical_color_order() {
        let mut venue = Venue::new(5, vec![60_000, 20_000]);
        // Deposited in reverse canonical order; blue must still be paid
        // before white.
        venue.deposit(die(5, DieColor::White, 1));
        venue.deposit(die(5, DieColor::Blue, 0));

        let prizes = venue.settle(PayoutOrder::SmallestFirst);
        assert_eq!(prizes.len(), 2);
        assert_eq!(prizes[0].owner(), 0);
        assert_eq!(prizes[1].owner(), 1);
    }

    #[test]
    fn test_awards_bounded_by_pool_size() {
        let mut venue = Venue::new(4, vec![40_000, 20_000]);
        venue.deposit(die(4, DieColor::Blue, 0));
        venue.deposit(die(4, DieColor::White, 1));
        venue.deposit(die(4, DieColor::Black, 2));

        let prizes = venue.settle(PayoutOrder::SmallestFirst);
        assert_eq!(prizes.len(), 2);
    }

    #[test]
    fn test_settle_with_no_deposits_awards_nothing() {
        let mut venue = Venue::new(6, vec![50_000]);
        assert!(venue.settle(PayoutOrder::SmallestFirst).is_empty());
        assert_eq!(venue.prize_count(), 1);
    }

    #[test]
    fn test_payout_order_parsing() {
        assert_eq!(
            "smallest_first".parse::<PayoutOrder>().unwrap(),
            PayoutOrder::SmallestFirst
        );
        assert_eq!(
            "largest-first".parse::<PayoutOrder>().unwrap(),
            PayoutOrder::LargestFirst
        );
        assert!("biggest".parse::<PayoutOrder>().is_err());
    }
}
