//! Probability primitives - single-die odds and batch rolls
//!
//! Attack and save rolls use the same rule: a natural 1 always fails and a
//! natural 6 always succeeds, whatever the target.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Lowest target a roll can need once natural 1s are excluded
pub const MIN_TARGET: u8 = 2;
/// Highest face of the die
pub const DIE_FACES: u8 = 6;
/// Quality used when a unit can only hit on natural 6s
pub const WORST_QUALITY: u8 = 7;

/// Source of d6 results
///
/// Everything random in the engine goes through this trait so a seeded
/// source reproduces an engagement exactly.
pub trait DieRoller {
    /// Roll one die, returning a value in 1..=6
    fn roll_d6(&mut self) -> u8;
}

/// Seeded die source backed by ChaCha8
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DieRoller for SeededDice {
    fn roll_d6(&mut self) -> u8 {
        self.rng.gen_range(1..=DIE_FACES)
    }
}

/// Die source that replays a fixed sequence, cycling when it runs out
///
/// Used to drive exact scenarios (tests, replays of a recorded game).
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    /// Faces outside 1..=6 are clamped into range. An empty script rolls 1s.
    pub fn new(faces: Vec<u8>) -> Self {
        let faces = faces
            .into_iter()
            .map(|f| f.clamp(1, DIE_FACES))
            .collect();
        Self { faces, cursor: 0 }
    }

    /// How many dice have been rolled so far
    pub fn rolled(&self) -> usize {
        self.cursor
    }
}

impl DieRoller for ScriptedDice {
    fn roll_d6(&mut self) -> u8 {
        if self.faces.is_empty() {
            return 1;
        }
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face
    }
}

/// Result of rolling a batch of dice against one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub successes: u32,
    /// Natural 6s rolled (each is also counted in `successes`)
    pub sixes: u32,
}

/// Does a single face succeed against `target`?
pub fn face_succeeds(face: u8, target: u8) -> bool {
    match face {
        1 => false,
        6 => true,
        _ => face >= target.max(MIN_TARGET),
    }
}

/// Probability that one die succeeds against `target`
pub fn success_chance(target: u8) -> f64 {
    if target > DIE_FACES {
        return 1.0 / 6.0;
    }
    let effective = target.max(MIN_TARGET);
    f64::from(DIE_FACES - effective + 1) / 6.0
}

/// Roll `count` dice against `target`
pub fn roll_batch<D: DieRoller + ?Sized>(dice: &mut D, count: u32, target: u8) -> RollOutcome {
    let mut outcome = RollOutcome::default();
    for _ in 0..count {
        let face = dice.roll_d6();
        if face_succeeds(face, target) {
            outcome.successes += 1;
        }
        if face == DIE_FACES {
            outcome.sixes += 1;
        }
    }
    tracing::trace!(
        count,
        target,
        successes = outcome.successes,
        sixes = outcome.sixes,
        "rolled batch"
    );
    outcome
}
