//! One-dimensional Monte Carlo integration.
//!
//! The integrand comes from an external [`Evaluator`]; this module never
//! interprets expression text. Points are drawn from a [`GeneratorHandle`],
//! whose sample cache is extended as needed and reused across calls.

#[cfg(feature = "serde")] use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, EvalError, Result};
use crate::session::GeneratorHandle;

/// Default number of integration points.
pub const DEFAULT_POINTS: u64 = 10_000;

/// A real function of one variable supplied by the caller.
pub trait Evaluator {
    /// Evaluates the function at a single point.
    fn evaluate(&self, x: f64) -> core::result::Result<f64, EvalError>;

    /// Evaluates the function at every point. Implementations with a
    /// vectorised path should override this; integration always calls it.
    fn evaluate_batch(&self, xs: &[f64]) -> core::result::Result<Vec<f64>, EvalError> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

impl<F: Fn(f64) -> core::result::Result<f64, EvalError>> Evaluator for F {
    fn evaluate(&self, x: f64) -> core::result::Result<f64, EvalError> {
        self(x)
    }
}

/// Polynomial c0 + c1 x + c2 x^2 + ..., evaluated with Horner's rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Coefficients in increasing order of degree.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Polynomial { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Exact integral over [a, b].
    pub fn integral(&self, a: f64, b: f64) -> f64 {
        let antiderivative = |x: f64| {
            self.coefficients.iter().enumerate().rev().fold(0.0, |acc, (k, c)| acc * x + c / (k + 1) as f64) * x
        };
        antiderivative(b) - antiderivative(a)
    }
}

impl Evaluator for Polynomial {
    fn evaluate(&self, x: f64) -> core::result::Result<f64, EvalError> {
        Ok(self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c))
    }

    fn evaluate_batch(&self, xs: &[f64]) -> core::result::Result<Vec<f64>, EvalError> {
        let mut ys = vec![0.0; xs.len()];
        for c in self.coefficients.iter().rev() {
            for (y, x) in ys.iter_mut().zip(xs) {
                *y = *y * x + c;
            }
        }
        Ok(ys)
    }
}

/// Outcome of one integration. Immutable once built.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MonteCarloResult {
    estimate: f64,
    standard_error: f64,
    n_points: u64,
    a: f64,
    b: f64,
    expression_text: String,
}

/// The `{result, error, n_points, a, b, expression}` record handed back by
/// the integration entry point.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationRecord {
    pub result: f64,
    pub error: f64,
    pub n_points: u64,
    pub a: f64,
    pub b: f64,
    pub expression: String,
}

impl MonteCarloResult {
    #[inline] pub fn estimate(&self) -> f64 {
        self.estimate
    }

    #[inline] pub fn standard_error(&self) -> f64 {
        self.standard_error
    }

    #[inline] pub fn n_points(&self) -> u64 {
        self.n_points
    }

    #[inline] pub fn a(&self) -> f64 {
        self.a
    }

    #[inline] pub fn b(&self) -> f64 {
        self.b
    }

    pub fn expression_text(&self) -> &str {
        &self.expression_text
    }

    pub fn to_record(&self) -> IntegrationRecord {
        IntegrationRecord {
            result: self.estimate,
            error: self.standard_error,
            n_points: self.n_points,
            a: self.a,
            b: self.b,
            expression: self.expression_text.clone(),
        }
    }
}

/// Running mean and sum of squared deviations (Welford, 1962).
#[derive(Clone, Copy, Debug, Default)]
struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Population standard deviation.
    fn std_dev(&self) -> f64 {
        if self.count == 0 { 0.0 } else { (self.m2 / self.count as f64).sqrt() }
    }
}

/// Checks the preconditions shared by every integration entry point.
pub(crate) fn check_bounds(a: f64, b: f64, n_points: u64) -> Result<()> {
    // Finite bounds can still be too far apart for b - a to be finite.
    if !(a.is_finite() && b.is_finite() && a < b && (b - a).is_finite()) {
        return Err(Error::InvalidRange { a, b });
    }
    if n_points == 0 {
        return Err(Error::InvalidCount(n_points));
    }
    Ok(())
}

/// Estimates the integral of `evaluator` over [a, b] from `n_points` uniform
/// points.
///
/// The handle's cache is extended to `n_points` samples if it is shorter and
/// its first `n_points` samples are used, so repeating the call with a larger
/// count reuses the earlier points. The estimate is (b - a) mean(f) and the
/// standard error (b - a) sd(f) / sqrt(n), with the population standard
/// deviation. Any evaluator failure, or a non-finite value, aborts the call.
///
/// ```
/// use rand_montecarlo::{integrate, Algorithm, EvalError, GeneratorHandle, Params};
///
/// let mut handle = GeneratorHandle::create(Algorithm::Mersenne, Some(1), &Params::new()).unwrap();
/// let one = |_x: f64| -> Result<f64, EvalError> { Ok(1.0) };
/// let result = integrate(&one, 0.0, 5.0, 100, &mut handle, "1").unwrap();
/// assert_eq!(5.0, result.estimate());
/// assert_eq!(0.0, result.standard_error());
/// ```
pub fn integrate<E: Evaluator + ?Sized>(
    evaluator: &E,
    a: f64,
    b: f64,
    n_points: u64,
    handle: &mut GeneratorHandle,
    expression_text: &str,
) -> Result<MonteCarloResult> {
    check_bounds(a, b, n_points)?;
    let width = b - a;
    let xs: Vec<f64> = handle.samples(n_points)?.iter().map(|u| u * width + a).collect();
    let ys = evaluator.evaluate_batch(&xs)?;
    if ys.len() != xs.len() {
        return Err(EvalError::Other(format!("evaluator returned {} values for {} points", ys.len(), xs.len())).into());
    }

    let mut moments = Moments::default();
    for (&x, &y) in xs.iter().zip(&ys) {
        if !y.is_finite() {
            return Err(EvalError::NonFinite { x, value: y }.into());
        }
        moments.update(y);
    }

    let result = MonteCarloResult {
        estimate: width * moments.mean,
        standard_error: width * moments.std_dev() / (n_points as f64).sqrt(),
        n_points,
        a,
        b,
        expression_text: expression_text.to_string(),
    };
    debug!(
        expression = expression_text,
        a, b, n_points,
        estimate = result.estimate,
        standard_error = result.standard_error,
        "monte carlo integration finished"
    );
    Ok(result)
}

#[cfg(test)] mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::params::Params;
    use crate::uniform::Algorithm;
    use approx::assert_abs_diff_eq;

    fn handle(algorithm: Algorithm, seed: i64) -> GeneratorHandle {
        GeneratorHandle::create(algorithm, Some(seed), &Params::new()).unwrap()
    }

    #[test] fn constant_integrand_is_exact() {
        let one = Polynomial::new(vec![1.0]);
        for algorithm in Algorithm::ALL {
            for n in [1, 2, 17, 1000] {
                let result = integrate(&one, 0.0, 5.0, n, &mut handle(algorithm, 99), "1").unwrap();
                assert_eq!(5.0, result.estimate(), "{} n = {}", algorithm, n);
                assert_eq!(0.0, result.standard_error());
                assert_eq!(n, result.n_points());
            }
        }
    }

    #[test] fn polynomial_estimate_within_error_bars() {
        let f = Polynomial::new(vec![1.0, -2.0, 3.0]);
        let exact = f.integral(-1.0, 2.0);
        assert_abs_diff_eq!(9.0, exact, epsilon = 1e-12);
        let result = integrate(&f, -1.0, 2.0, 20000, &mut handle(Algorithm::Mersenne, 2024), "3x^2-2x+1").unwrap();
        assert!((result.estimate() - exact).abs() < 4.0 * result.standard_error());
        assert_eq!("3x^2-2x+1", result.expression_text());
    }

    #[test] fn standard_error_shrinks_with_root_n() {
        let f = Polynomial::new(vec![0.0, 0.0, 1.0]);
        let mut ratio = 0.0;
        let repeats = 20;
        for seed in 1 ..= repeats {
            let small = integrate(&f, 0.0, 1.0, 2000, &mut handle(Algorithm::Mersenne, seed), "x^2").unwrap();
            let large = integrate(&f, 0.0, 1.0, 4000, &mut handle(Algorithm::Mersenne, seed + 1000), "x^2").unwrap();
            ratio += small.standard_error() / large.standard_error();
        }
        ratio /= repeats as f64;
        assert_abs_diff_eq!(2f64.sqrt(), ratio, epsilon = 0.1);
    }

    #[test] fn preconditions() {
        let f = Polynomial::new(vec![1.0]);
        let mut h = handle(Algorithm::Xorshift32, 1);
        assert_eq!(ErrorKind::InvalidRange, integrate(&f, 5.0, 5.0, 10, &mut h, "1").unwrap_err().kind());
        assert_eq!(ErrorKind::InvalidRange, integrate(&f, 5.0, 1.0, 10, &mut h, "1").unwrap_err().kind());
        assert_eq!(ErrorKind::InvalidRange, integrate(&f, 0.0, f64::INFINITY, 10, &mut h, "1").unwrap_err().kind());
        assert_eq!(ErrorKind::InvalidCount, integrate(&f, 0.0, 1.0, 0, &mut h, "1").unwrap_err().kind());
        assert_eq!(ErrorKind::InvalidRange, integrate(&f, -1e308, 1e308, 10, &mut h, "1").unwrap_err().kind());
        assert!(h.cached().is_empty());
    }

    #[test] fn evaluator_failure_aborts() {
        let reciprocal = |x: f64| -> core::result::Result<f64, EvalError> {
            if x < 0.5 { Err(EvalError::DivisionByZero { x }) } else { Ok(1.0 / x) }
        };
        let err = integrate(&reciprocal, 0.0, 1.0, 100, &mut handle(Algorithm::Mersenne, 3), "1/x").unwrap_err();
        assert_eq!(ErrorKind::Evaluation, err.kind());

        let nan = |_x: f64| -> core::result::Result<f64, EvalError> { Ok(f64::NAN) };
        let err = integrate(&nan, 0.0, 1.0, 10, &mut handle(Algorithm::Mersenne, 3), "nan").unwrap_err();
        assert!(matches!(err, Error::Evaluation(EvalError::NonFinite { .. })));
    }

    #[test] fn larger_requests_reuse_cached_points() {
        let f = Polynomial::new(vec![0.0, 1.0]);
        let mut h = handle(Algorithm::LcgAdditive, 11);
        let first = integrate(&f, 0.0, 1.0, 100, &mut h, "x").unwrap();
        assert_eq!(100, h.cached().len());
        let second = integrate(&f, 0.0, 1.0, 300, &mut h, "x").unwrap();
        assert_eq!(300, h.cached().len());
        let again = integrate(&f, 0.0, 1.0, 100, &mut h, "x").unwrap();
        assert_eq!(first, again);

        let mut fresh = handle(Algorithm::LcgAdditive, 11);
        assert_eq!(second, integrate(&f, 0.0, 1.0, 300, &mut fresh, "x").unwrap());
    }

    #[test] fn batch_and_scalar_agree() {
        let f = Polynomial::new(vec![0.5, -1.0, 0.25, 2.0]);
        let xs = [-2.0, -0.5, 0.0, 1.0, 3.5];
        let batch = f.evaluate_batch(&xs).unwrap();
        for (x, y) in xs.iter().zip(batch) {
            assert_abs_diff_eq!(f.evaluate(*x).unwrap(), y, epsilon = 1e-12);
        }
    }

    #[test] fn record_shape() {
        let f = Polynomial::new(vec![2.0]);
        let result = integrate(&f, 1.0, 3.0, 10, &mut handle(Algorithm::Mersenne, 1), "2").unwrap();
        let record = result.to_record();
        assert_eq!(4.0, record.result);
        assert_eq!(0.0, record.error);
        assert_eq!((1.0, 3.0, 10), (record.a, record.b, record.n_points));
        assert_eq!("2", record.expression);
    }

    #[cfg(feature = "serde")]
    #[test] fn record_serializes_with_entry_point_keys() {
        let f = Polynomial::new(vec![2.0]);
        let record = integrate(&f, 1.0, 3.0, 10, &mut handle(Algorithm::Mersenne, 1), "2").unwrap().to_record();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(4.0, value["result"]);
        assert_eq!(0.0, value["error"]);
        assert_eq!(10, value["n_points"]);
        assert_eq!("2", value["expression"]);
        assert_eq!(record, serde_json::from_value(value).unwrap());
    }
}
