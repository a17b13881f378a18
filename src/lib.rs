//! Classic uniform random number generators, transforms to common
//! distributions, and one-dimensional Monte Carlo integration.
//!
//! None of the generators are cryptographically secure. All of them except
//! [`PhysicalNoise`] replay exactly from their seed.

pub mod error;
pub mod lcg;
pub mod lfsr;
pub mod mersenne;
pub mod middle;
pub mod montecarlo;
pub mod params;
pub mod physical;
pub mod session;
pub mod transform;
pub mod uniform;
pub mod xorshift;

pub use error::{Error, ErrorKind, EvalError, Result};
pub use lcg::LinearCongruential;
pub use lfsr::Lfsr;
pub use mersenne::MersenneTwister;
pub use middle::{MiddleProduct, QuadraticResidue};
pub use montecarlo::{integrate, Evaluator, IntegrationRecord, MonteCarloResult, Polynomial};
pub use params::{GeneratorConfig, ParamValue, Params};
pub use physical::PhysicalNoise;
pub use session::{create_distribution, generate_numbers, monte_carlo_integration};
pub use session::{DistributionSession, ExpressionCompiler, GeneratorHandle, IntegrationRequest};
pub use transform::{transform, Distribution, TransformParams};
pub use uniform::{Algorithm, UniformGenerator, UniformSample};
pub use xorshift::Xorshift32;
pub use rand_core::{RngCore, SeedableRng};

// Linear congruential defaults from Numerical Recipes.
pub const LCG_A: u64 = 1664525;
pub const LCG_C: u64 = 1013904223;
pub const LCG_M: u64 = 1 << 32;

/// Default LFSR tap positions.
pub const LFSR_TAPS: [u32; 2] = [3, 2];

/// Default second seed of the middle-product generator.
pub const MIDDLE_SECOND_SEED: u64 = 5735;

// 64-bit LCG multiplier from Steele, G. and Vigna, S.,
// Computationally Easy, Spectrally Good Multipliers for
// Congruential Pseudorandom Number Generators (2020).
// Drives the throwaway generators in tests.
#[cfg(test)] pub(crate) const LCG_M64_1: u64 = 0xd1342543de82ef95;
