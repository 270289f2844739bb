//! Deterministic random number generation, one stream per match.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical dice, coin flips and picks
//! - **Context streams**: Each room derives its own stream from the registry seed
//! - **Swappable**: The engine only sees [`RandomSource`], so tests can script rolls
//!
//! ```
//! use hex_tactics::core::{GameRng, RandomSource};
//!
//! let root = GameRng::new(42);
//! let mut a = root.for_context("room-1");
//! let mut b = root.for_context("room-1");
//! assert_eq!(a.roll(6), b.roll(6));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

/// Randomness consumed by a match.
///
/// Every random decision the engine makes (seat flip, background pick,
/// dice rolls) goes through this trait.
pub trait RandomSource: Send + std::fmt::Debug {
    /// Roll a die: uniform in `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32;

    /// Fair coin flip.
    fn coin_flip(&mut self) -> bool;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Clone into a new box; lets match drafts own their own copy.
    fn boxed_clone(&self) -> Box<dyn RandomSource>;
}

impl Clone for Box<dyn RandomSource> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// The registry uses the room id as context so every room gets its own
    /// reproducible stream from a single process seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }
}

impl RandomSource for GameRng {
    fn roll(&mut self, sides: u32) -> u32 {
        self.inner.gen_range(1..=sides.max(1))
    }

    fn coin_flip(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len.max(1))
    }

    fn boxed_clone(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}

/// Scripted source that replays fixed die faces, then falls back to a seeded RNG.
///
/// Rolls are clamped into `1..=sides`. Coin flips and picks always come
/// from the fallback.
///
/// ```
/// use hex_tactics::core::{RandomSource, ScriptedDice};
///
/// let mut dice = ScriptedDice::new([3, 1]);
/// assert_eq!(dice.roll(3), 3);
/// assert_eq!(dice.roll(6), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    fallback: GameRng,
}

impl ScriptedDice {
    #[must_use]
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: GameRng::new(0),
        }
    }
}

impl RandomSource for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        match self.faces.pop_front() {
            Some(face) => face.clamp(1, sides.max(1)),
            None => self.fallback.roll(sides),
        }
    }

    fn coin_flip(&mut self) -> bool {
        self.fallback.coin_flip()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.fallback.pick(len)
    }

    fn boxed_clone(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.roll(6), rng2.roll(6));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.roll(1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.roll(1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_roll_bounds() {
        let mut rng = GameRng::new(7);
        for _ in 0..500 {
            let face = rng.roll(3);
            assert!((1..=3).contains(&face));
        }
    }

    #[test]
    fn test_context_is_deterministic_and_distinct() {
        let root = GameRng::new(42);
        let mut a1 = root.for_context("alpha");
        let mut a2 = root.for_context("alpha");
        let mut b = root.for_context("beta");

        let s1: Vec<_> = (0..10).map(|_| a1.roll(1000)).collect();
        let s2: Vec<_> = (0..10).map(|_| a2.roll(1000)).collect();
        let s3: Vec<_> = (0..10).map(|_| b.roll(1000)).collect();

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn test_boxed_clone_continues_same_stream() {
        let mut original: Box<dyn RandomSource> = Box::new(GameRng::new(9));
        original.roll(6);
        let mut copy = original.clone();
        assert_eq!(original.roll(20), copy.roll(20));
    }

    #[test]
    fn test_scripted_dice_clamps_and_falls_back() {
        let mut dice = ScriptedDice::new([9, 0]);
        assert_eq!(dice.roll(3), 3);
        assert_eq!(dice.roll(6), 1);
        let face = dice.roll(4);
        assert!((1..=4).contains(&face));
    }
}
