//! Pseudo-random number generator wrapper for Monte Carlo simulations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Source of the random variates consumed by the path evolver and the
/// scenario aggregator.
///
/// Implement this to drive the engine from a recorded or synthetic stream.
pub trait RandomSource {
    /// Uniform variate in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Standard normal variate.
    fn standard_normal(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    #[inline]
    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }
}

/// Monte Carlo simulation random number generator.
///
/// Normals use the Ziggurat sampler of `rand_distr::StandardNormal`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::rng::PricerRng;
///
/// let mut rng1 = PricerRng::from_seed(42);
/// let mut rng2 = PricerRng::from_seed(42);
/// assert_eq!(rng1.gen_uniform(), rng2.gen_uniform());
///
/// let mut buffer = vec![0.0; 100];
/// rng1.fill_normal(&mut buffer);
/// ```
#[derive(Clone, Debug)]
pub struct PricerRng {
    inner: StdRng,
    /// Seed used for initialisation, kept for logging.
    seed: u64,
}

impl PricerRng {
    /// Creates a generator initialised with `seed`.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates the generator for stream `stream` of the run seeded by `seed`.
    ///
    /// Distinct `(seed, stream)` pairs give statistically independent
    /// sequences; the same pair always gives the same sequence.
    ///
    /// ```rust
    /// use pricer_pricing::rng::PricerRng;
    ///
    /// let mut a = PricerRng::for_stream(7, 3);
    /// let mut b = PricerRng::for_stream(7, 3);
    /// let mut c = PricerRng::for_stream(7, 4);
    ///
    /// let x = a.gen_normal();
    /// assert_eq!(x, b.gen_normal());
    /// assert_ne!(x, c.gen_normal());
    /// ```
    #[inline]
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mixed = splitmix64(seed ^ splitmix64(stream.wrapping_add(1)));
        Self {
            inner: StdRng::seed_from_u64(mixed),
            seed,
        }
    }

    /// Returns the run seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Standard normal variate (mean 0, variance 1).
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills `buffer` with uniform values in `[0, 1)`.
    #[inline]
    pub fn fill_uniform(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.inner.gen();
        }
    }

    /// Fills `buffer` with standard normal variates.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

impl RandomSource for PricerRng {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.gen_uniform()
    }

    #[inline]
    fn standard_normal(&mut self) -> f64 {
        self.gen_normal()
    }
}

/// SplitMix64 finaliser.
#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
