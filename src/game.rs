//! The game engine: setup, the round loop, and settlement.
//!
//! A game is single-use. `Game::new` returns a fully set-up instance,
//! `play` consumes it and returns the [`Outcome`]; replaying means
//! constructing a fresh game. The engine is single-threaded and draws all
//! randomness from one seeded `StdRng` in a fixed order: one shuffle at
//! setup, one draw per die top-face sample, one draw per random group
//! selection.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::agent::{choose_group, Agent, Policy};
use crate::die::{Die, DieColor};
use crate::venue::{PayoutOrder, Venue, FUNDING_FLOOR, VENUE_COUNT};

/// Seats per game. The reference configurations always use five.
pub const NUM_AGENTS: usize = 5;

/// Dice dealt to each seat at setup.
pub const HAND_SIZE: usize = 8;

/// The full prize deck dealt across venues at setup:
/// 5 each of 60/70/80/90k, 6 each of 10/40/50k, 8 each of 20/30k.
fn prize_deck() -> Vec<u32> {
    let mut deck = Vec::with_capacity(54);
    for _ in 0..5 {
        deck.extend_from_slice(&[60_000, 70_000, 80_000, 90_000]);
    }
    for _ in 0..6 {
        deck.extend_from_slice(&[10_000, 40_000, 50_000]);
    }
    for _ in 0..8 {
        deck.extend_from_slice(&[20_000, 30_000]);
    }
    deck
}

/// Result of one settled game, in report order: slots are sorted by
/// (canonical policy rank, then priority), never by turn order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Per-slot winnings normalized by the grand total. Sums to 1, or is
    /// all zeros when nothing was won.
    pub shares: [f64; NUM_AGENTS],
    /// Per-slot raw winnings.
    pub totals: [u32; NUM_AGENTS],
    /// Policy played in each slot.
    pub policies: [Policy; NUM_AGENTS],
    /// Slot index of the winner: maximum total winnings, ties broken to
    /// the lowest priority.
    pub winner: usize,
    /// Rounds played before every hand emptied.
    pub rounds: usize,
}

pub struct Game {
    /// Turn order: ascending priority, fixed at setup.
    agents: Vec<Agent>,
    /// Venue at index i accepts face value i + 1.
    venues: Vec<Venue>,
    round: usize,
    payout_order: PayoutOrder,
    rng: StdRng,
}

impl Game {
    /// Construct a fresh, independent, fully set-up game: shuffle the
    /// prize deck, fund each venue in id order until it reaches the
    /// funding floor, and deal each seat its hand.
    pub fn new(lineup: [Policy; NUM_AGENTS], payout_order: PayoutOrder, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut deck = prize_deck();
        deck.shuffle(&mut rng);

        let venues = (1..=VENUE_COUNT as u8)
            .map(|id| {
                let mut notes = Vec::new();
                let mut total = 0u32;
                while total < FUNDING_FLOOR {
                    let note = deck.pop().expect("prize deck exhausted while funding venues");
                    total += note;
                    notes.push(note);
                }
                Venue::new(id, notes)
            })
            .collect();

        let agents = lineup
            .iter()
            .enumerate()
            .map(|(seat, &policy)| {
                let color = DieColor::ALL[seat];
                let hand = (0..HAND_SIZE)
                    .map(|_| Die::standard(color, seat, &mut rng))
                    .collect();
                Agent::new(policy, seat, hand)
            })
            .collect();

        Self {
            agents,
            venues,
            round: 0,
            payout_order,
            rng,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn round(&self) -> usize {
        self.round
    }

    /// Total dice still in hands.
    pub fn hands_remaining(&self) -> usize {
        self.agents.iter().map(|agent| agent.hand.len()).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.hands_remaining() == 0
    }

    /// Run the game to completion and settle it.
    pub fn play(mut self) -> Outcome {
        while !self.is_finished() {
            self.play_round();
        }
        self.settle()
    }

    /// One round: every agent, in fixed priority order, rolls its
    /// remaining hand and commits one group. Empty hands are skipped.
    pub fn play_round(&mut self) {
        self.round += 1;
        for seat in 0..self.agents.len() {
            self.take_turn(seat);
        }
    }

    fn take_turn(&mut self, seat: usize) {
        let Self {
            agents,
            venues,
            rng,
            ..
        } = self;

        if agents[seat].hand.is_empty() {
            return;
        }
        agents[seat].roll_hand(rng);

        let groups = agents[seat].groups_by_face();
        let opponents: Vec<usize> = (0..agents.len()).filter(|&i| i != seat).collect();
        let choice = choose_group(
            agents[seat].policy,
            seat,
            &groups,
            venues.as_slice(),
            &opponents,
            rng,
        );
        let Some(choice) = choice else {
            // A forfeiting agent relinquishes its whole hand without
            // depositing, so the game still terminates.
            agents[seat].hand.clear();
            return;
        };

        let face = groups[choice].face;
        let (played, kept): (Vec<Die>, Vec<Die>) = std::mem::take(&mut agents[seat].hand)
            .into_iter()
            .partition(|die| die.top_face == face);
        agents[seat].hand = kept;
        for die in played {
            venues[usize::from(die.top_face - 1)].deposit(die);
        }
    }

    /// Settle every venue in id order, credit the prizes, and produce the
    /// report-ordered outcome. Settling an unfinished game is a
    /// programming error.
    pub fn settle(mut self) -> Outcome {
        assert!(
            self.is_finished(),
            "settlement invoked before every hand was emptied"
        );

        for venue in &mut self.venues {
            for prize in venue.settle(self.payout_order) {
                let owner = prize.owner();
                self.agents[owner].winnings.push(prize);
            }
        }

        let totals_by_seat: Vec<u32> = self.agents.iter().map(Agent::total_winnings).collect();
        // Strictly-greater scan in priority order: ties stay with the
        // lowest priority.
        let mut winner_seat = 0;
        for seat in 1..totals_by_seat.len() {
            if totals_by_seat[seat] > totals_by_seat[winner_seat] {
                winner_seat = seat;
            }
        }

        let mut report_order: Vec<usize> = (0..self.agents.len()).collect();
        report_order.sort_by_key(|&seat| {
            (
                self.agents[seat].policy.canonical_rank(),
                self.agents[seat].priority,
            )
        });

        let mut totals = [0u32; NUM_AGENTS];
        let mut policies = [Policy::Unknown; NUM_AGENTS];
        for (slot, &seat) in report_order.iter().enumerate() {
            totals[slot] = totals_by_seat[seat];
            policies[slot] = self.agents[seat].policy;
        }
        let winner = report_order
            .iter()
            .position(|&seat| seat == winner_seat)
            .expect("winner seat is in the report order");

        Outcome {
            shares: normalized_shares(&totals),
            totals,
            policies,
            winner,
            rounds: self.round,
        }
    }

    /// ASCII snapshot of the current state, for verbose narration.
    pub fn render_state(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "=== Round {} ===", self.round);
        for venue in &self.venues {
            let counts: Vec<String> = DieColor::ALL
                .iter()
                .filter_map(|&color| {
                    let n = venue.deposits.iter().filter(|d| d.color == color).count();
                    (n > 0).then(|| format!("{color}:{n}"))
                })
                .collect();
            let deposits = if counts.is_empty() {
                "-".to_string()
            } else {
                counts.join(" ")
            };
            let _ = writeln!(out, "Venue {} {:?}: {}", venue.id, venue.prizes(), deposits);
        }
        for agent in &self.agents {
            let _ = writeln!(
                out,
                "Seat {} {} ({}): {} dice in hand",
                agent.priority,
                agent.policy,
                DieColor::ALL[agent.priority],
                agent.hand.len()
            );
        }
        out
    }
}

/// Per-slot winnings divided by the grand total; all zeros when the grand
/// total is zero.
fn normalized_shares(totals: &[u32; NUM_AGENTS]) -> [f64; NUM_AGENTS] {
    let grand: u32 = totals.iter().sum();
    if grand == 0 {
        return [0.0; NUM_AGENTS];
    }
    let mut shares = [0.0; NUM_AGENTS];
    for (share, &total) in shares.iter_mut().zip(totals) {
        *share = f64::from(total) / f64::from(grand);
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::Prize;

    const MIXED: [Policy; NUM_AGENTS] = [
        Policy::Alpha,
        Policy::Bravo,
        Policy::Charlie,
        Policy::Delta,
        Policy::Echo,
    ];

    fn die(face: u8, owner: usize) -> Die {
        Die {
            faces: vec![face],
            top_face: face,
            color: DieColor::ALL[owner],
            owner,
        }
    }

    /// A game with hand-picked hands and flat venue pools.
    fn game_with_hands(hands: Vec<Vec<Die>>) -> Game {
        let agents = hands
            .into_iter()
            .enumerate()
            .map(|(seat, hand)| Agent::new(Policy::Alpha, seat, hand))
            .collect();
        let venues = (1..=VENUE_COUNT as u8)
            .map(|id| Venue::new(id, vec![50_000]))
            .collect();
        Game {
            agents,
            venues,
            round: 0,
            payout_order: PayoutOrder::SmallestFirst,
            rng: StdRng::seed_from_u64(0),
        }
    }

    #[test]
    fn test_setup_funds_every_venue_to_the_floor() {
        let game = Game::new(MIXED, PayoutOrder::SmallestFirst, 42);
        assert_eq!(game.venues().len(), VENUE_COUNT);
        for venue in game.venues() {
            assert!(venue.prizes().iter().sum::<u32>() >= FUNDING_FLOOR);
            assert!(venue.deposits.is_empty());
        }
    }

    #[test]
    fn test_setup_deals_hands_by_seat() {
        let game = Game::new(MIXED, PayoutOrder::SmallestFirst, 42);
        assert_eq!(game.agents().len(), NUM_AGENTS);
        for (seat, agent) in game.agents().iter().enumerate() {
            assert_eq!(agent.priority, seat);
            assert_eq!(agent.policy, MIXED[seat]);
            assert_eq!(agent.hand.len(), HAND_SIZE);
            assert!(agent.winnings.is_empty());
            for d in &agent.hand {
                assert_eq!(d.owner, seat);
                assert_eq!(d.color, DieColor::ALL[seat]);
            }
        }
        assert_eq!(game.hands_remaining(), NUM_AGENTS * HAND_SIZE);
    }

    #[test]
    fn test_hands_shrink_monotonically_and_dice_are_conserved() {
        let mut game = Game::new(MIXED, PayoutOrder::SmallestFirst, 7);
        let mut remaining = game.hands_remaining();
        while !game.is_finished() {
            game.play_round();
            let now = game.hands_remaining();
            assert!(now < remaining, "every round must shrink some hand");
            remaining = now;
        }
        let deposited: usize = game.venues().iter().map(|v| v.deposits.len()).sum();
        assert_eq!(deposited, NUM_AGENTS * HAND_SIZE);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let a = Game::new(MIXED, PayoutOrder::SmallestFirst, 1234).play();
        let b = Game::new(MIXED, PayoutOrder::SmallestFirst, 1234).play();
        assert_eq!(a, b);
    }

    #[test]
    fn test_outcome_shares_sum_to_one() {
        let outcome = Game::new(MIXED, PayoutOrder::SmallestFirst, 5).play();
        let sum: f64 = outcome.shares.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(outcome.policies, MIXED);
    }

    #[test]
    fn test_single_round_with_preset_single_faced_hands() {
        let hands = vec![
            vec![die(1, 0)],
            vec![die(1, 1)],
            vec![die(2, 2)],
            vec![die(3, 3)],
            vec![die(4, 4)],
        ];
        let mut game = game_with_hands(hands);
        game.play_round();

        let counts: Vec<usize> = game.venues().iter().map(|v| v.deposits.len()).collect();
        assert_eq!(counts, vec![2, 1, 1, 1, 0, 0]);
        assert!(game.is_finished());

        let outcome = game.settle();
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn test_winner_tie_breaks_to_lowest_priority() {
        let mut game = game_with_hands(vec![vec![], vec![], vec![], vec![], vec![]]);
        game.agents[2].winnings.push(Prize {
            amount: 60_000,
            dice: vec![die(1, 2)],
        });
        game.agents[4].winnings.push(Prize {
            amount: 60_000,
            dice: vec![die(2, 4)],
        });

        let outcome = game.settle();
        // All agents share one policy, so report order equals seat order.
        assert_eq!(outcome.winner, 2);
    }

    #[test]
    fn test_settlement_with_no_deposits_is_all_zero() {
        let game = game_with_hands(vec![vec![], vec![], vec![], vec![], vec![]]);
        let outcome = game.settle();
        assert_eq!(outcome.shares, [0.0; NUM_AGENTS]);
        assert_eq!(outcome.totals, [0u32; NUM_AGENTS]);
    }

    #[test]
    #[should_panic(expected = "settlement invoked")]
    fn test_settling_an_unfinished_game_panics() {
        let game = Game::new(MIXED, PayoutOrder::SmallestFirst, 42);
        let _ = game.settle();
    }

    #[test]
    fn test_forfeit_policy_discards_without_depositing() {
        let lineup = [
            Policy::Alpha,
            Policy::Unknown,
            Policy::Alpha,
            Policy::Alpha,
            Policy::Alpha,
        ];
        let mut game = Game::new(lineup, PayoutOrder::SmallestFirst, 9);
        while !game.is_finished() {
            game.play_round();
        }
        let deposited: usize = game.venues().iter().map(|v| v.deposits.len()).sum();
        assert_eq!(deposited, (NUM_AGENTS - 1) * HAND_SIZE);
        for venue in game.venues() {
            assert_eq!(venue.count_owned_by(1), 0);
        }
    }

    #[test]
    fn test_report_order_sorts_by_policy_then_priority() {
        let lineup = [
            Policy::Echo,
            Policy::Delta,
            Policy::Charlie,
            Policy::Bravo,
            Policy::Alpha,
        ];
        let outcome = Game::new(lineup, PayoutOrder::SmallestFirst, 42).play();
        assert_eq!(outcome.policies, Policy::CANONICAL);
    }

    #[test]
    fn test_normalized_shares_zero_total() {
        assert_eq!(normalized_shares(&[0; NUM_AGENTS]), [0.0; NUM_AGENTS]);
    }

    #[test]
    fn test_normalized_shares_sum_to_one() {
        let shares = normalized_shares(&[10_000, 0, 30_000, 50_000, 10_000]);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(shares[3], 0.5);
    }

    #[test]
    fn test_prize_deck_composition() {
        let deck = prize_deck();
        assert_eq!(deck.len(), 54);
        assert_eq!(deck.iter().sum::<u32>(), 2_500_000);
    }
}
