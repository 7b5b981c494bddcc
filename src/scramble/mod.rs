//! Random-move scramble generation for the supported events.

mod cube;
mod puzzles;
mod square1;

use std::str::FromStr;

use rand::{rngs::StdRng, rngs::ThreadRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CubikError;

/// WCA event; serialized as its event id (`333`, `pyram`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, strum_macros::Display,
)]
pub enum Event {
    #[default]
    #[serde(rename = "333")]
    #[strum(to_string = "3x3")]
    Cube333,
    #[serde(rename = "222")]
    #[strum(to_string = "2x2")]
    Cube222,
    #[serde(rename = "333oh")]
    #[strum(to_string = "3x3 OH")]
    OneHanded,
    #[serde(rename = "333bf")]
    #[strum(to_string = "3x3 BLD")]
    Blindfolded,
    #[serde(rename = "444")]
    #[strum(to_string = "4x4")]
    Cube444,
    #[serde(rename = "555")]
    #[strum(to_string = "5x5")]
    Cube555,
    #[serde(rename = "666")]
    #[strum(to_string = "6x6")]
    Cube666,
    #[serde(rename = "777")]
    #[strum(to_string = "7x7")]
    Cube777,
    #[serde(rename = "pyram")]
    #[strum(to_string = "Pyraminx")]
    Pyraminx,
    #[serde(rename = "skewb")]
    #[strum(to_string = "Skewb")]
    Skewb,
    #[serde(rename = "megaminx")]
    #[strum(to_string = "Megaminx")]
    Megaminx,
    #[serde(rename = "sq1")]
    #[strum(to_string = "Square-1")]
    Square1,
    #[serde(rename = "clock")]
    #[strum(to_string = "Clock")]
    Clock,
    #[serde(rename = "333fm")]
    #[strum(to_string = "3x3 FMC")]
    FewestMoves,
}

impl Event {
    pub const ALL: [Event; 14] = [
        Event::Cube333,
        Event::Cube222,
        Event::OneHanded,
        Event::Blindfolded,
        Event::Cube444,
        Event::Cube555,
        Event::Cube666,
        Event::Cube777,
        Event::Pyraminx,
        Event::Skewb,
        Event::Megaminx,
        Event::Square1,
        Event::Clock,
        Event::FewestMoves,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Event::Cube333 => "333",
            Event::Cube222 => "222",
            Event::OneHanded => "333oh",
            Event::Blindfolded => "333bf",
            Event::Cube444 => "444",
            Event::Cube555 => "555",
            Event::Cube666 => "666",
            Event::Cube777 => "777",
            Event::Pyraminx => "pyram",
            Event::Skewb => "skewb",
            Event::Megaminx => "megaminx",
            Event::Square1 => "sq1",
            Event::Clock => "clock",
            Event::FewestMoves => "333fm",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|e| e == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Cube size for NxN events; OH, BLD and FMC use 3x3 scrambles
    fn cube_size(&self) -> Option<usize> {
        match self {
            Event::Cube222 => Some(2),
            Event::Cube333 | Event::OneHanded | Event::Blindfolded | Event::FewestMoves => Some(3),
            Event::Cube444 => Some(4),
            Event::Cube555 => Some(5),
            Event::Cube666 => Some(6),
            Event::Cube777 => Some(7),
            _ => None,
        }
    }
}

impl FromStr for Event {
    type Err = CubikError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| CubikError::UnknownEvent(s.to_string()))
    }
}

pub trait ScrambleProvider {
    /// A non-empty move sequence for `event`
    fn generate(&mut self, event: Event) -> String;
}

/// Random-move scrambles. Not random-state, which is fine for practice.
#[derive(Debug, Clone)]
pub struct RandomMoveScrambler<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomMoveScrambler<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomMoveScrambler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomMoveScrambler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomMoveScrambler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ScrambleProvider for RandomMoveScrambler<R> {
    fn generate(&mut self, event: Event) -> String {
        if let Some(size) = event.cube_size() {
            return cube::scramble(&mut self.rng, size);
        }
        match event {
            Event::Pyraminx => puzzles::pyraminx(&mut self.rng),
            Event::Skewb => puzzles::skewb(&mut self.rng),
            Event::Megaminx => puzzles::megaminx(&mut self.rng),
            Event::Clock => puzzles::clock(&mut self.rng),
            Event::Square1 => square1::scramble(&mut self.rng),
            _ => cube::scramble(&mut self.rng, 3),
        }
    }
}
