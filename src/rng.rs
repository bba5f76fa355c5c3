//! Deterministic RNG for combat resolution
//!
//! All randomness in a run flows through one seeded generator so that a
//! fixed seed replays the same run exactly.

/// Trait for random number generation in battles
pub trait BattleRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a random number in range [0, max)
    fn gen_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }

    /// Generate a uniform float in [0, 1)
    fn gen_f32(&mut self) -> f32 {
        // 24 high bits, matching f32 mantissa precision
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Roll a probability check
    fn gen_chance(&mut self, p: f32) -> bool {
        p > 0.0 && self.gen_f32() < p
    }

    /// Shuffle a slice using Fisher-Yates algorithm
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.gen_range(i + 1);
            slice.swap(i, j);
        }
    }
}

/// XorShift32 RNG - simple, fast, deterministic
///
/// This is suitable for game logic where cryptographic security is not needed.
/// The same seed will always produce the same sequence.
#[derive(Debug, Clone)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is combined into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }

    /// Create a new RNG from a u32 seed
    pub fn seed_from_u32(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }
}

impl BattleRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
