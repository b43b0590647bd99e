use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Inclusive range of whole degrees a random target is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempRange {
    pub low: i32,
    pub high: i32,
}

impl TempRange {
    #[must_use]
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// Whether `deg_c` lies inside the range (bounds included)
    #[must_use]
    pub fn contains(&self, deg_c: f32) -> bool {
        (self.low as f32..=self.high as f32).contains(&deg_c)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }
}

/// Source of the random target temperatures used by shimmer rerolls and
/// per-tick phase targets.
///
/// Production code draws from an RNG via [`RandomTargets`]; tests plug in
/// fixed sequences.
pub trait TargetSource {
    /// Draw a whole-degree temperature uniformly from `range`
    fn roll(&mut self, range: TempRange) -> f32;
}

/// [`TargetSource`] backed by any [`rand::Rng`]
#[derive(Debug, Clone)]
pub struct RandomTargets<R> {
    rng: R,
}

impl<R: Rng> RandomTargets<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTargets<StdRng> {
    /// Reproducible targets for a given seed
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Targets seeded from OS entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TargetSource for RandomTargets<R> {
    #[allow(clippy::cast_precision_loss)]
    fn roll(&mut self, range: TempRange) -> f32 {
        if range.high <= range.low {
            return range.low as f32;
        }
        self.rng.gen_range(range.low..=range.high) as f32
    }
}
