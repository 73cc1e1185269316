//! Deterministic pseudo-random sources.
//!
//! Two unrelated generators live here:
//!
//! - [`SeededRandom`] drives grid layout. It is a small linear-congruential generator whose
//!   whole state is one integer, so a seed fully determines the layout sequence.
//! - [`sine_noise`] is a stateless hash used by the blob outline. Each call depends only on
//!   its input, which lets every outline point be computed independently.

const LCG_MUL: u64 = 9301;
const LCG_INC: u64 = 49297;
const LCG_MOD: u64 = 233_280;

/// Upper bound (exclusive) of [`session_seed`].
pub const SESSION_SEED_RANGE: u64 = 999_999;

/// Linear-congruential generator: `state = (state * 9301 + 49297) mod 233280`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandom {
    seed: u64,
    state: u64,
}

impl SeededRandom {
    /// Seeds are reduced modulo 233280 up front. The first step applies the same reduction,
    /// so the produced sequence is identical to stepping from the raw seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            state: seed % LCG_MOD,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MUL + LCG_INC) % LCG_MOD;
        self.state as f64 / LCG_MOD as f64
    }

    /// `floor(next * n)`, always `< n` for `n > 0`. Returns 0 when `n == 0`
    /// (a value is still drawn so call sequences stay aligned).
    pub fn below(&mut self, n: usize) -> usize {
        let r = self.next_f64();
        if n == 0 {
            return 0;
        }
        ((r * n as f64).floor() as usize).min(n - 1)
    }

    /// Restart from `seed`, as if newly constructed.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }
}

/// `frac(sin(x) * 10000)`, in `[0, 1)`.
pub fn sine_noise(x: f64) -> f64 {
    let v = x.sin() * 10000.0;
    v - v.floor()
}

/// Seed for a fresh session in `[0, 999999)`, mixing wall-clock time with per-process
/// hasher entropy.
pub fn session_seed() -> u64 {
    use std::hash::{BuildHasher, Hasher};

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut h = std::collections::hash_map::RandomState::new().build_hasher();
    h.write_u64(nanos);
    h.finish() % SESSION_SEED_RANGE
}
