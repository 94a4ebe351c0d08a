use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

/// How a check die is rolled. `Normal` is the single-roll "none" mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

/// A supply of uniformly distributed integers.
pub trait RandomSource {
    /// Uniform integer in `1..=max`. Callers guarantee `max >= 1`.
    fn next_in_range(&mut self, max: u32) -> u32;
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn next_in_range(&mut self, max: u32) -> u32 {
        (**self).next_in_range(max)
    }
}

/// Gameplay source: ChaCha8 seeded from OS entropy (or a fixed u64 seed).
pub struct EntropySource {
    rng: ChaCha8Rng,
}

impl EntropySource {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropySource {
    fn next_in_range(&mut self, max: u32) -> u32 {
        self.rng.gen_range(1..=max)
    }
}

/// Linear-congruential generator (a = 1664525, c = 1013904223, m = 2^32).
///
/// Bit-for-bit reproducible across implementations; meant for tests and
/// replays, never for live play. Each draw advances the state once and maps
/// it onto `1..=max` as `floor(state * max / 2^32) + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededSource {
    state: u32,
}

impl SeededSource {
    /// Seed 0 is coerced to 1.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SeededSource {
    fn next_in_range(&mut self, max: u32) -> u32 {
        let raw = u64::from(self.next_u32());
        ((raw * u64::from(max)) >> 32) as u32 + 1
    }
}

/// Replays a fixed list of values (cycling), clamped into the requested range.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_in_range(&mut self, max: u32) -> u32 {
        if self.values.is_empty() {
            return 1;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(1, max.max(1))
    }
}

/// Individual dice in roll order plus the kept value (checks) or the sum.
///
/// `total` is wider than a single die so that any `count x faces` sum fits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollResult {
    pub rolls: Vec<i32>,
    pub total: i64,
}

/// `<count>d<faces>`, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceNotation {
    pub count: u32,
    pub faces: u32,
}

impl DiceNotation {
    pub fn new(count: u32, faces: u32) -> Self {
        Self { count, faces }
    }

    /// Highest total these dice can produce.
    pub fn max_total(&self) -> u64 {
        u64::from(self.count) * u64::from(self.faces)
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)
    }
}

impl FromStr for DiceNotation {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice_notation(s).ok_or_else(|| RuleError::InvalidNotation(s.to_string()))
    }
}

/// Match exactly `<positive integer>d<positive integer>`.
///
/// `None` means "not dice notation", so callers can try another reading of
/// the input; it is never an error by itself.
pub fn parse_dice_notation(text: &str) -> Option<DiceNotation> {
    let (count, faces) = text.split_once('d')?;
    let count = parse_positive(count)?;
    let faces = parse_positive(faces)?;
    Some(DiceNotation { count, faces })
}

fn parse_positive(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

pub struct Dice<S = EntropySource> {
    source: S,
}

impl Dice<EntropySource> {
    pub fn from_entropy() -> Self {
        Self::new(EntropySource::new())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(EntropySource::from_seed(seed))
    }
}

impl Dice<SeededSource> {
    /// Deterministic dice over the LCG; same seed, same call sequence, same output.
    pub fn seeded(seed: u32) -> Self {
        Self::new(SeededSource::new(seed))
    }
}

impl Dice<ScriptedSource> {
    pub fn from_scripted(values: Vec<u32>) -> Self {
        Self::new(ScriptedSource::new(values))
    }
}

impl<S: RandomSource> Dice<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Uniform in `[1, max_face]`; a non-positive face count rolls 0.
    pub fn roll_die(&mut self, max_face: i32) -> i32 {
        if max_face <= 0 {
            return 0;
        }
        self.source.next_in_range(max_face as u32) as i32
    }

    /// Roll `count` dice of `faces` sides (count clamped to >= 0, faces to >= 1).
    pub fn roll_sum(&mut self, count: i32, faces: i32) -> RollResult {
        let faces = faces.max(1);
        let rolls: Vec<i32> = (0..count.max(0)).map(|_| self.roll_die(faces)).collect();
        let total: i64 = rolls.iter().map(|r| i64::from(*r)).sum();
        debug!(count, faces, ?rolls, total, "rolled dice");
        RollResult { rolls, total }
    }

    /// One roll, or two independent rolls keeping the max (advantage) or
    /// min (disadvantage). Rolls are reported in the order they were made.
    pub fn resolve_check(&mut self, max_face: i32, mode: AdMode) -> RollResult {
        let faces = max_face.max(1);
        let first = self.roll_die(faces);
        let result = match mode {
            AdMode::Normal => RollResult {
                rolls: vec![first],
                total: i64::from(first),
            },
            AdMode::Advantage => {
                let second = self.roll_die(faces);
                RollResult {
                    rolls: vec![first, second],
                    total: i64::from(first.max(second)),
                }
            }
            AdMode::Disadvantage => {
                let second = self.roll_die(faces);
                RollResult {
                    rolls: vec![first, second],
                    total: i64::from(first.min(second)),
                }
            }
        };
        debug!(faces, ?mode, rolls = ?result.rolls, kept = result.total, "resolved check");
        result
    }

    pub fn roll_notation(&mut self, notation: DiceNotation) -> RollResult {
        let count = i32::try_from(notation.count).unwrap_or(i32::MAX);
        let faces = i32::try_from(notation.faces).unwrap_or(i32::MAX);
        self.roll_sum(count, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_first_step_matches_reference_arithmetic() {
        let mut src = SeededSource::new(1);
        // 1 * 1664525 + 1013904223
        assert_eq!(src.next_u32(), 1_015_568_748);
    }

    #[test]
    fn zero_seed_is_coerced_to_one() {
        assert_eq!(SeededSource::new(0), SeededSource::new(1));
    }

    #[test]
    fn scripted_values_are_clamped_to_face_count() {
        let mut dice = Dice::from_scripted(vec![25, 0]);
        assert_eq!(dice.roll_die(20), 20);
        assert_eq!(dice.roll_die(20), 1);
    }
}
