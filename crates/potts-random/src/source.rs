//! A single worker's random stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};

/// One worker's dedicated random stream.
///
/// Drawing from a source that was never seeded is a programming error;
/// debug builds panic on the first draw.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl RandomSource {
    /// A source that must be seeded before use.
    pub fn unseeded() -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(0),
            seed: None,
        }
    }

    /// A source seeded with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Reset the stream to the start of `seed`'s sequence.
    pub fn seed(&mut self, seed: u64) {
        *self = Self::from_seed(seed);
    }

    /// The seed this stream started from, if seeded.
    pub fn seed_value(&self) -> Option<u64> {
        self.seed
    }

    fn stream(&mut self) -> &mut ChaCha8Rng {
        debug_assert!(self.seed.is_some(), "RandomSource drawn before seed()");
        &mut self.rng
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform01(&mut self) -> f64 {
        self.stream().random::<f64>()
    }

    /// Zero-mean normal draw with standard deviation `stddev`.
    pub fn gaussian(&mut self, stddev: f64) -> f64 {
        let z: f64 = StandardNormal.sample(self.stream());
        z * stddev
    }

    /// Gamma draw with the given shape and scale.
    ///
    /// Returns `None` without consuming the stream unless both
    /// parameters are positive.
    pub fn gamma(&mut self, shape: f64, scale: f64) -> Option<f64> {
        let dist = Gamma::new(shape, scale).ok()?;
        Some(dist.sample(self.stream()))
    }

    /// Uniform integer in `[0, max]`, both ends inclusive.
    pub fn bounded_int(&mut self, max: u64) -> u64 {
        self.stream().random_range(0..=max)
    }

    /// Fair coin flip.
    pub fn bool_(&mut self) -> bool {
        self.stream().random::<bool>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomSource::from_seed(42);
        let mut b = RandomSource::from_seed(42);
        for _ in 0..100 {
            assert_eq!(a.uniform01().to_bits(), b.uniform01().to_bits());
            assert_eq!(a.bounded_int(17), b.bounded_int(17));
        }
    }

    #[test]
    fn reseeding_restarts_the_stream() {
        let mut a = RandomSource::from_seed(7);
        let first = a.uniform01();
        a.uniform01();
        a.seed(7);
        assert_eq!(a.uniform01(), first);
        assert_eq!(a.seed_value(), Some(7));
    }

    #[test]
    fn bounded_int_is_inclusive() {
        let mut r = RandomSource::from_seed(3);
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = r.bounded_int(3);
            assert!(v <= 3);
            seen_max |= v == 3;
        }
        assert!(seen_max);
        assert_eq!(r.bounded_int(0), 0);
    }

    #[test]
    fn gaussian_moments() {
        let mut r = RandomSource::from_seed(11);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| r.gaussian(2.0)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "stddev {}", var.sqrt());
        assert_eq!(r.gaussian(0.0), 0.0);
    }

    #[test]
    fn gamma_mean_is_shape_times_scale() {
        let mut r = RandomSource::from_seed(5);
        let n = 20_000;
        let mean = (0..n).map(|_| r.gamma(2.0, 1.5).unwrap()).sum::<f64>() / n as f64;
        assert!((mean - 3.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn gamma_rejects_invalid_parameters() {
        let mut r = RandomSource::from_seed(5);
        let mut fresh = RandomSource::from_seed(5);
        assert_eq!(r.gamma(0.0, 1.0), None);
        assert_eq!(r.gamma(2.0, -1.0), None);
        assert_eq!(r.gamma(f64::NAN, 1.0), None);
        // Rejected calls leave the stream where it was.
        assert_eq!(r.uniform01(), fresh.uniform01());
    }

    #[test]
    fn bool_is_roughly_fair() {
        let mut r = RandomSource::from_seed(9);
        let heads = (0..10_000).filter(|_| r.bool_()).count();
        assert!((4_500..5_500).contains(&heads), "{heads}");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "drawn before seed")]
    fn unseeded_draw_panics_in_debug() {
        let mut r = RandomSource::unseeded();
        r.uniform01();
    }

    proptest! {
        #[test]
        fn uniform_in_unit_interval(seed in any::<u64>()) {
            let mut r = RandomSource::from_seed(seed);
            for _ in 0..32 {
                let u = r.uniform01();
                prop_assert!((0.0..1.0).contains(&u));
            }
        }
    }
}
