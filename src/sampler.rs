use crate::core::Basis;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Source of every random draw a simulation run makes.
///
/// The engine never reaches for a global generator; it draws exclusively from
/// the `Sampler` it was handed. Tests substitute a fixed or seeded sampler to
/// make a run fully reproducible.
pub trait Sampler {
    /// Draws a uniformly random bit in {0, 1}.
    fn random_bit(&mut self) -> u8;

    /// Draws a uniformly random basis.
    fn random_basis(&mut self) -> Basis;

    /// Draws `amount` distinct positions uniformly from `0..len`.
    fn sample_positions(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn random_bit(&mut self) -> u8 {
        (**self).random_bit()
    }

    fn random_basis(&mut self) -> Basis {
        (**self).random_basis()
    }

    fn sample_positions(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (**self).sample_positions(len, amount)
    }
}

/// A `Sampler` backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    /// Wraps an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<ChaCha20Rng> {
    /// Seeded ChaCha20 stream. Same seed, same run.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }

    /// ChaCha20 stream keyed from the thread-local entropy source, independent
    /// of every other sampler.
    pub fn from_entropy() -> Self {
        Self::new(ChaCha20Rng::from_rng(&mut rand::rng()))
    }
}

impl<R: Rng> Sampler for RngSampler<R> {
    fn random_bit(&mut self) -> u8 {
        u8::from(self.rng.random_bool(0.5))
    }

    fn random_basis(&mut self) -> Basis {
        if self.rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    fn sample_positions(&mut self, len: usize, amount: usize) -> Vec<usize> {
        // Floyd/partial-shuffle selection without replacement
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}
