//! Die and color primitives.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Face values of a standard die.
pub const STANDARD_FACES: [u8; 6] = [1, 2, 3, 4, 5, 6];

/// Dice-set colors, one per seat. The declaration order is the canonical
/// color ordering used to break settlement ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DieColor {
    Blue,
    White,
    Black,
    Red,
    Green,
}

impl DieColor {
    /// All colors in canonical order; `ALL[seat]` is the color dealt to
    /// that seat.
    pub const ALL: [DieColor; 5] = [
        DieColor::Blue,
        DieColor::White,
        DieColor::Black,
        DieColor::Red,
        DieColor::Green,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DieColor::Blue => "blue",
            DieColor::White => "white",
            DieColor::Black => "black",
            DieColor::Red => "red",
            DieColor::Green => "green",
        }
    }
}

impl fmt::Display for DieColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single die. Owner (a seat index) and color are fixed at creation and
/// never change, even once the die is deposited into a venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die {
    /// Faces the die can land on. Single-faced dice are legal and make
    /// `roll` a fixed point.
    pub faces: Vec<u8>,
    pub top_face: u8,
    pub color: DieColor,
    /// Seat index of the owning agent.
    pub owner: usize,
}

impl Die {
    /// The initial top face is sampled the same way a roll is: one
    /// uniform draw over the faces.
    pub fn new(faces: Vec<u8>, color: DieColor, owner: usize, rng: &mut StdRng) -> Self {
        let top_face = *faces.choose(rng).expect("die needs at least one face");
        Self {
            faces,
            top_face,
            color,
            owner,
        }
    }

    pub fn standard(color: DieColor, owner: usize, rng: &mut StdRng) -> Self {
        Self::new(STANDARD_FACES.to_vec(), color, owner, rng)
    }

    /// Resample the top face uniformly. Side effect only.
    pub fn roll(&mut self, rng: &mut StdRng) {
        self.top_face = *self.faces.choose(rng).expect("die needs at least one face");
    }
}
