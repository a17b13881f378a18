//! The uniform generator family and the factory that builds it.

use core::fmt;
use core::str::FromStr;
use rand_core::{OsRng, RngCore};
#[cfg(feature = "serde")] use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::lcg::LinearCongruential;
use crate::lfsr::Lfsr;
use crate::mersenne::MersenneTwister;
use crate::middle::{MiddleProduct, QuadraticResidue};
use crate::params::{trace_unused, LcgParams, LfsrParams, MiddleProductParams, Params};
use crate::physical::PhysicalNoise;
use crate::xorshift::Xorshift32;

/// Uniform values in generation order. Every element is in [0, 1), except
/// that the Mersenne Twister can reach exactly 1.0.
pub type UniformSample = Vec<f64>;

/// Generator algorithm tag.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Mersenne,
    LcgAdditive,
    LcgMultiplicative,
    Lfsr,
    MiddleProduct,
    QuadraticResidue,
    Xorshift32,
    PhysicalNoise,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Mersenne,
        Algorithm::LcgAdditive,
        Algorithm::LcgMultiplicative,
        Algorithm::Lfsr,
        Algorithm::MiddleProduct,
        Algorithm::QuadraticResidue,
        Algorithm::Xorshift32,
        Algorithm::PhysicalNoise,
    ];

    /// The key used in configuration and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            Algorithm::Mersenne => "mersenne",
            Algorithm::LcgAdditive => "lcg_additive",
            Algorithm::LcgMultiplicative => "lcg_multiplicative",
            Algorithm::Lfsr => "lfsr",
            Algorithm::MiddleProduct => "middle_product",
            Algorithm::QuadraticResidue => "quadratic_residue",
            Algorithm::Xorshift32 => "xorshift32",
            Algorithm::PhysicalNoise => "physical_noise",
        }
    }

    /// All tags, comma separated.
    pub fn valid_tags() -> String {
        Self::ALL.iter().map(|a| a.tag()).collect::<Vec<_>>().join(", ")
    }

    /// Every algorithm except physical noise replays exactly from its seed.
    pub fn is_deterministic(self) -> bool {
        self != Algorithm::PhysicalNoise
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.iter().copied().find(|a| a.tag() == key).ok_or_else(|| Error::Configuration {
            what: "algorithm",
            key: s.to_string(),
            valid: Self::valid_tags(),
        })
    }
}

/// Draws a seed from the operating system.
pub fn entropy_seed() -> Result<i64> {
    let mut bytes = [0u8; 8];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(i64::from_le_bytes(bytes))
}

/// A stateful uniform generator. Each instance owns its state outright.
#[derive(Clone, Debug)]
pub enum UniformGenerator {
    Mersenne(MersenneTwister),
    LcgAdditive(LinearCongruential),
    LcgMultiplicative(LinearCongruential),
    Lfsr(Lfsr),
    MiddleProduct(MiddleProduct),
    QuadraticResidue(QuadraticResidue),
    Xorshift32(Xorshift32),
    PhysicalNoise(PhysicalNoise),
}

impl UniformGenerator {

    /// Builds a generator. A missing seed is drawn from the operating system.
    /// Seeds are taken as their 64-bit two's complement pattern and then
    /// reduced as each algorithm requires (low 32 bits, modulo m, 4 digits).
    ///
    /// ```
    /// use rand_montecarlo::{Algorithm, Params, UniformGenerator};
    ///
    /// let mut a = UniformGenerator::create(Algorithm::Xorshift32, Some(7), &Params::new()).unwrap();
    /// let mut b = UniformGenerator::create(Algorithm::Xorshift32, Some(7), &Params::new()).unwrap();
    /// assert_eq!(a.generate(10).unwrap(), b.generate(10).unwrap());
    /// ```
    pub fn create(algorithm: Algorithm, seed: Option<i64>, params: &Params) -> Result<Self> {
        let seed = match (algorithm, seed) {
            (Algorithm::PhysicalNoise, _) => 0,
            (_, Some(seed)) => seed,
            (_, None) => entropy_seed()?,
        };
        let bits = seed as u64;
        let generator = match algorithm {
            Algorithm::Mersenne => {
                trace_unused(params, &[]);
                UniformGenerator::Mersenne(MersenneTwister::new(bits as u32))
            }
            Algorithm::LcgAdditive => {
                UniformGenerator::LcgAdditive(LinearCongruential::new(LcgParams::from_params(params)?, bits))
            }
            Algorithm::LcgMultiplicative => {
                UniformGenerator::LcgMultiplicative(LinearCongruential::multiplicative(LcgParams::from_params(params)?, bits))
            }
            Algorithm::Lfsr => UniformGenerator::Lfsr(Lfsr::new(LfsrParams::from_params(params)?, bits)),
            Algorithm::MiddleProduct => {
                UniformGenerator::MiddleProduct(MiddleProduct::new(MiddleProductParams::from_params(params)?, bits))
            }
            Algorithm::QuadraticResidue => {
                trace_unused(params, &[]);
                UniformGenerator::QuadraticResidue(QuadraticResidue::new(bits))
            }
            Algorithm::Xorshift32 => {
                trace_unused(params, &[]);
                UniformGenerator::Xorshift32(Xorshift32::new(bits as u32))
            }
            Algorithm::PhysicalNoise => {
                trace_unused(params, &[]);
                UniformGenerator::PhysicalNoise(PhysicalNoise::new())
            }
        };
        if generator.is_stuck() {
            warn!(algorithm = algorithm.tag(), seed, "seed leaves the generator stuck on one value");
        }
        debug!(algorithm = algorithm.tag(), seed, "created uniform generator");
        Ok(generator)
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            UniformGenerator::Mersenne(_) => Algorithm::Mersenne,
            UniformGenerator::LcgAdditive(_) => Algorithm::LcgAdditive,
            UniformGenerator::LcgMultiplicative(_) => Algorithm::LcgMultiplicative,
            UniformGenerator::Lfsr(_) => Algorithm::Lfsr,
            UniformGenerator::MiddleProduct(_) => Algorithm::MiddleProduct,
            UniformGenerator::QuadraticResidue(_) => Algorithm::QuadraticResidue,
            UniformGenerator::Xorshift32(_) => Algorithm::Xorshift32,
            UniformGenerator::PhysicalNoise(_) => Algorithm::PhysicalNoise,
        }
    }

    /// Returns true if the output has collapsed to a single repeated value,
    /// or, for the multiplicative LCG, is certain to reach zero. The LFSR
    /// always collapses eventually but only counts once it has.
    pub fn is_stuck(&self) -> bool {
        match self {
            UniformGenerator::LcgMultiplicative(g) => g.reaches_zero(),
            UniformGenerator::Lfsr(g) => g.is_stuck(),
            UniformGenerator::MiddleProduct(g) => g.is_stuck(),
            UniformGenerator::QuadraticResidue(g) => g.is_stuck(),
            UniformGenerator::Xorshift32(g) => g.is_stuck(),
            UniformGenerator::Mersenne(_) | UniformGenerator::LcgAdditive(_) | UniformGenerator::PhysicalNoise(_) => false,
        }
    }

    /// Returns the next uniform value.
    /// Only physical noise can fail, when the entropy source is unreadable.
    #[inline]
    pub fn next(&mut self) -> Result<f64> {
        Ok(match self {
            UniformGenerator::Mersenne(g) => g.next_f64(),
            UniformGenerator::LcgAdditive(g) | UniformGenerator::LcgMultiplicative(g) => g.next_f64(),
            UniformGenerator::Lfsr(g) => g.next_f64(),
            UniformGenerator::MiddleProduct(g) => g.next_f64(),
            UniformGenerator::QuadraticResidue(g) => g.next_f64(),
            UniformGenerator::Xorshift32(g) => g.next_f64(),
            UniformGenerator::PhysicalNoise(g) => g.next_f64()?,
        })
    }

    /// Returns the next n values, in the same order as n calls to `next`.
    pub fn generate(&mut self, n: u64) -> Result<UniformSample> {
        let mut sample = Vec::with_capacity(n.min(1 << 24) as usize);
        self.fill(&mut sample, n)?;
        Ok(sample)
    }

    /// Appends the next n values to `sample`.
    /// On failure `sample` keeps whatever was appended before the error.
    pub fn fill(&mut self, sample: &mut UniformSample, n: u64) -> Result<()> {
        for _ in 0 .. n {
            sample.push(self.next()?);
        }
        Ok(())
    }
}
