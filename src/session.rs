//! Generator ownership, sample caching and the public entry points.
//!
//! A [`GeneratorHandle`] owns one uniform generator plus every value it has
//! produced so far. A [`DistributionSession`] owns exactly one handle for the
//! lifetime of a user's session; nothing is shared between sessions.

use tracing::{debug, trace};

use crate::error::{Error, EvalError, Result};
use crate::montecarlo::{self, Evaluator, IntegrationRecord, MonteCarloResult, DEFAULT_POINTS};
use crate::params::{GeneratorConfig, Params};
use crate::transform::TransformParams;
use crate::uniform::{entropy_seed, Algorithm, UniformGenerator, UniformSample};

/// A uniform generator and the cache of everything it has produced.
#[derive(Clone, Debug)]
pub struct GeneratorHandle {
    /// Config with the seed resolved, so the handle can be rebuilt exactly.
    config: GeneratorConfig,
    generator: UniformGenerator,
    cache: UniformSample,
}

impl GeneratorHandle {

    /// Builds a handle. A missing seed is drawn once and remembered.
    pub fn create(algorithm: Algorithm, seed: Option<i64>, params: &Params) -> Result<Self> {
        let seed = match (algorithm.is_deterministic(), seed) {
            (true, None) => Some(entropy_seed()?),
            (_, seed) => seed,
        };
        let generator = UniformGenerator::create(algorithm, seed, params)?;
        let config = GeneratorConfig::new(algorithm, seed, params.clone());
        Ok(GeneratorHandle { config, generator, cache: Vec::new() })
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::create(config.algorithm, config.seed, &config.params)
    }

    /// The configuration this handle was built from, with its actual seed.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.generator.algorithm()
    }

    /// Every value produced so far, in generation order.
    pub fn cached(&self) -> &[f64] {
        &self.cache
    }

    /// Draws one new value and caches it.
    pub fn next(&mut self) -> Result<f64> {
        let x = self.generator.next()?;
        self.cache.push(x);
        Ok(x)
    }

    /// Draws n new values, caches them and returns them.
    pub fn generate(&mut self, n: u64) -> Result<&[f64]> {
        let start = self.cache.len();
        self.extend(n)?;
        Ok(&self.cache[start ..])
    }

    /// Returns the first n values ever produced, generating more if the
    /// cache is shorter.
    pub fn samples(&mut self, n: u64) -> Result<&[f64]> {
        let have = self.cache.len() as u64;
        if have < n {
            self.extend(n - have)?;
        }
        Ok(&self.cache[.. n as usize])
    }

    fn extend(&mut self, n: u64) -> Result<()> {
        let before = self.cache.len();
        // A failed draw keeps the values already appended: they were produced.
        let outcome = self.generator.fill(&mut self.cache, n);
        debug!(algorithm = self.algorithm().tag(), from = before, to = self.cache.len(), "extended sample cache");
        outcome
    }

    /// Rebuilds the generator from its config and empties the cache.
    /// Deterministic algorithms restart their sequence from the beginning.
    pub fn reset(&mut self) -> Result<()> {
        self.generator = UniformGenerator::create(self.config.algorithm, self.config.seed, &self.config.params)?;
        self.cache.clear();
        trace!(algorithm = self.algorithm().tag(), "reset generator");
        Ok(())
    }
}

/// One user session: owns a single generator handle.
#[derive(Clone, Debug)]
pub struct DistributionSession {
    handle: GeneratorHandle,
}

impl DistributionSession {

    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(DistributionSession { handle: GeneratorHandle::from_config(config)? })
    }

    pub fn handle(&self) -> &GeneratorHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut GeneratorHandle {
        &mut self.handle
    }

    /// Draws n new uniform values.
    pub fn generate(&mut self, n: u64) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(Error::InvalidCount(n));
        }
        Ok(self.handle.generate(n)?.to_vec())
    }

    /// Draws n new uniform values and transforms them.
    pub fn sample(&mut self, params: &TransformParams, n: u64) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(Error::InvalidCount(n));
        }
        params.apply(self.handle.generate(n)?)
    }

    /// Integrates over the session's cached points, extending them as needed.
    pub fn integrate<E: Evaluator + ?Sized>(
        &mut self,
        evaluator: &E,
        a: f64,
        b: f64,
        n_points: u64,
        expression_text: &str,
    ) -> Result<MonteCarloResult> {
        montecarlo::integrate(evaluator, a, b, n_points, &mut self.handle, expression_text)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.handle.reset()
    }
}

/// Turns expression text into an [`Evaluator`]. Supplied by the caller;
/// this crate never executes expression text itself.
pub trait ExpressionCompiler {
    type Evaluator: Evaluator;

    fn compile(&self, expression_text: &str) -> core::result::Result<Self::Evaluator, EvalError>;
}

impl<F, E> ExpressionCompiler for F
where
    F: Fn(&str) -> core::result::Result<E, EvalError>,
    E: Evaluator,
{
    type Evaluator = E;

    fn compile(&self, expression_text: &str) -> core::result::Result<E, EvalError> {
        self(expression_text)
    }
}

/// Arguments of [`monte_carlo_integration`], with defaults of 10000 points,
/// the Mersenne Twister, an entropy seed and no parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationRequest {
    pub expression_text: String,
    pub a: f64,
    pub b: f64,
    pub n_points: u64,
    pub algorithm: String,
    pub seed: Option<i64>,
    pub params: Params,
}

impl IntegrationRequest {
    pub fn new(expression_text: &str, a: f64, b: f64) -> Self {
        IntegrationRequest {
            expression_text: expression_text.to_string(),
            a,
            b,
            n_points: DEFAULT_POINTS,
            algorithm: Algorithm::Mersenne.tag().to_string(),
            seed: None,
            params: Params::new(),
        }
    }

    pub fn n_points(mut self, n_points: u64) -> Self {
        self.n_points = n_points;
        self
    }

    pub fn algorithm(mut self, algorithm: &str) -> Self {
        self.algorithm = algorithm.to_string();
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// Builds a generator handle from an algorithm key.
pub fn create_distribution(algorithm: &str, seed: Option<i64>, params: &Params) -> Result<GeneratorHandle> {
    GeneratorHandle::create(algorithm.parse()?, seed, params)
}

/// Generates `count` uniform values with a fresh generator.
///
/// ```
/// use rand_montecarlo::{generate_numbers, Params};
///
/// let xs = generate_numbers(5, "lcg_additive", Some(0), &Params::new()).unwrap();
/// assert_eq!(1013904223.0 / 4294967296.0, xs[0]);
/// assert!(generate_numbers(0, "lcg_additive", Some(0), &Params::new()).is_err());
/// ```
pub fn generate_numbers(count: u64, algorithm: &str, seed: Option<i64>, params: &Params) -> Result<Vec<f64>> {
    if count == 0 {
        return Err(Error::InvalidCount(count));
    }
    let mut generator = UniformGenerator::create(algorithm.parse()?, seed, params)?;
    generator.generate(count)
}

/// Compiles the expression with the caller's compiler and integrates it
/// with a fresh generator.
pub fn monte_carlo_integration<C: ExpressionCompiler + ?Sized>(
    compiler: &C,
    request: &IntegrationRequest,
) -> Result<IntegrationRecord> {
    montecarlo::check_bounds(request.a, request.b, request.n_points)?;
    let mut handle = create_distribution(&request.algorithm, request.seed, &request.params)?;
    let evaluator = compiler.compile(&request.expression_text)?;
    let result = montecarlo::integrate(
        &evaluator,
        request.a,
        request.b,
        request.n_points,
        &mut handle,
        &request.expression_text,
    )?;
    Ok(result.to_record())
}
