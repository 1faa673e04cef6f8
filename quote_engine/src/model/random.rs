//! Injectable sources of uniform draws in `[0, 1)`.
//!
//! The market simulator never reaches for a global generator: it owns a boxed
//! `UnitSource`, so hosts can pick an OS-seeded generator, a fixed seed for
//! reproducible runs, or a constant draw in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quote_common::Result;

/// Something that yields uniform values in `[0, 1)`.
pub trait UnitSource: Send {
    /// Next draw. Implementations report failures as `SimulationFailure`.
    fn next_unit(&mut self) -> Result<f64>;
}

/// `UnitSource` backed by `rand`'s standard generator.
#[derive(Debug, Clone)]
pub struct RngSource {
    rng: StdRng,
}

impl RngSource {
    /// Generator seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, OS-seeded otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }
}

impl UnitSource for RngSource {
    fn next_unit(&mut self) -> Result<f64> {
        Ok(self.rng.random::<f64>())
    }
}

/// Returns the same draw every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub f64);

impl UnitSource for FixedSource {
    fn next_unit(&mut self) -> Result<f64> {
        Ok(self.0)
    }
}
