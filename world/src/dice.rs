//! Dice implementations: a seeded ChaCha stream and a scripted replay source.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use valor_core::Dice;

/// Deterministic dice backed by ChaCha8; the same seed yields the same session.
#[derive(Clone, Debug)]
pub struct SeededDice {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SeededDice {
    /// Creates dice seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed the dice were created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Dice for SeededDice {
    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.inner.gen_bool(probability)
    }

    fn below(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        self.inner.gen_range(0..upper)
    }
}

/// Dice that replay a fixed script of outcomes.
///
/// Each call consumes the next scripted answer of its kind; once a script
/// runs dry, `chance` answers `false` and `below` answers `0`. Scripted
/// values are clamped below `upper`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    chances: VecDeque<bool>,
    values: VecDeque<u32>,
}

impl ScriptedDice {
    /// Creates dice with empty scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends answers for [`Dice::chance`].
    #[must_use]
    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Appends answers for [`Dice::below`].
    #[must_use]
    pub fn with_values(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.values.extend(values);
        self
    }
}

impl Dice for ScriptedDice {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn below(&mut self, upper: u32) -> u32 {
        let value = self.values.pop_front().unwrap_or(0);
        value.min(upper.saturating_sub(1))
    }
}
