//! Transforms from uniform samples to other distributions.
//!
//! All functions are pure. Length relationships differ per distribution:
//! - normal: two outputs per input pair, a trailing odd sample is dropped
//! - exponential, Poisson, binomial, uniform: one output per input
//! - gamma, beta: at most one output per input pair (rejected pairs vanish)

use core::f64::consts::PI;
use core::fmt;
use core::str::FromStr;
#[cfg(feature = "serde")] use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::params::{integer, number, positive, trace_unused, Params};

/// Largest rate for which e^-λ is comfortably representable.
pub const MAX_POISSON_LAMBDA: f64 = 700.0;

/// Target distribution tag.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Distribution {
    Normal,
    Exponential,
    Poisson,
    Binomial,
    Gamma,
    Beta,
    Uniform,
}

impl Distribution {
    pub const ALL: [Distribution; 7] = [
        Distribution::Normal,
        Distribution::Exponential,
        Distribution::Poisson,
        Distribution::Binomial,
        Distribution::Gamma,
        Distribution::Beta,
        Distribution::Uniform,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Distribution::Normal => "normal",
            Distribution::Exponential => "exponential",
            Distribution::Poisson => "poisson",
            Distribution::Binomial => "binomial",
            Distribution::Gamma => "gamma",
            Distribution::Beta => "beta",
            Distribution::Uniform => "uniform",
        }
    }

    pub fn valid_tags() -> String {
        Self::ALL.iter().map(|d| d.tag()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Distribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "box_muller" | "gaussian" => return Ok(Distribution::Normal),
            _ => (),
        }
        Self::ALL.iter().copied().find(|d| d.tag() == key).ok_or_else(|| Error::Configuration {
            what: "distribution",
            key: s.to_string(),
            valid: Self::valid_tags(),
        })
    }
}

/// Validated parameters of a target distribution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "distribution", rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformParams {
    Normal { mean: f64, std_dev: f64 },
    Exponential { lambda: f64 },
    Poisson { lambda: f64 },
    Binomial { n: u64, p: f64 },
    Gamma { alpha: f64, beta: f64 },
    Beta { alpha: f64, beta: f64 },
    Uniform { low: f64, high: f64 },
}

impl TransformParams {

    /// Reads and validates the keys a distribution needs, applying defaults:
    /// `mean` 0, `std_dev` 1, `lambda` 1, `n` 10, `p` 0.5, gamma `alpha` 2
    /// and `beta` 1, beta `alpha` 2 and `beta` 2, `low` 0, `high` 1.
    pub fn from_params(distribution: Distribution, params: &Params) -> Result<Self> {
        let parsed = match distribution {
            Distribution::Normal => {
                trace_unused(params, &["mean", "std_dev"]);
                let mean = number(params, "mean")?.unwrap_or(0.0);
                let std_dev = positive(params, "std_dev", Some(1.0))?;
                TransformParams::Normal { mean, std_dev }
            }
            Distribution::Exponential => {
                trace_unused(params, &["lambda"]);
                TransformParams::Exponential { lambda: positive(params, "lambda", Some(1.0))? }
            }
            Distribution::Poisson => {
                trace_unused(params, &["lambda"]);
                let lambda = positive(params, "lambda", Some(1.0))?;
                if lambda > MAX_POISSON_LAMBDA {
                    return Err(Error::parameter("lambda", format!("{} exceeds {}", lambda, MAX_POISSON_LAMBDA)));
                }
                TransformParams::Poisson { lambda }
            }
            Distribution::Binomial => {
                trace_unused(params, &["n", "p"]);
                let n = integer(params, "n", 10, 0, u32::MAX as u64)?;
                let p = number(params, "p")?.unwrap_or(0.5);
                if !(0.0 ..= 1.0).contains(&p) {
                    return Err(Error::parameter("p", format!("{} is not a probability", p)));
                }
                if p < 1.0 && (1.0 - p).powf(n as f64) == 0.0 {
                    return Err(Error::parameter("n", format!("(1 - p)^n underflows for n = {}, p = {}", n, p)));
                }
                TransformParams::Binomial { n, p }
            }
            Distribution::Gamma => {
                trace_unused(params, &["alpha", "beta"]);
                let alpha = positive(params, "alpha", Some(2.0))?;
                if alpha < 1.0 {
                    return Err(Error::parameter("alpha", format!("{} < 1 is not supported by the gamma sampler", alpha)));
                }
                TransformParams::Gamma { alpha, beta: positive(params, "beta", Some(1.0))? }
            }
            Distribution::Beta => {
                trace_unused(params, &["alpha", "beta"]);
                let alpha = positive(params, "alpha", Some(2.0))?;
                TransformParams::Beta { alpha, beta: positive(params, "beta", Some(2.0))? }
            }
            Distribution::Uniform => {
                trace_unused(params, &["low", "high"]);
                let low = number(params, "low")?.unwrap_or(0.0);
                let high = number(params, "high")?.unwrap_or(1.0);
                if low >= high {
                    return Err(Error::parameter("high", format!("{} must exceed low = {}", high, low)));
                }
                TransformParams::Uniform { low, high }
            }
        };
        Ok(parsed)
    }

    pub fn distribution(&self) -> Distribution {
        match self {
            TransformParams::Normal { .. } => Distribution::Normal,
            TransformParams::Exponential { .. } => Distribution::Exponential,
            TransformParams::Poisson { .. } => Distribution::Poisson,
            TransformParams::Binomial { .. } => Distribution::Binomial,
            TransformParams::Gamma { .. } => Distribution::Gamma,
            TransformParams::Beta { .. } => Distribution::Beta,
            TransformParams::Uniform { .. } => Distribution::Uniform,
        }
    }

    /// Applies the transform after checking every input is a finite value in [0, 1].
    pub fn apply(&self, uniform: &[f64]) -> Result<Vec<f64>> {
        if let Some((i, u)) = uniform.iter().enumerate().find(|(_, u)| !(0.0 ..= 1.0).contains(*u)) {
            return Err(Error::InvalidInput(format!("sample {} = {} is outside [0, 1]", i, u)));
        }
        let out = match *self {
            TransformParams::Normal { mean, std_dev } => {
                let mut z = box_muller(uniform)?;
                if mean != 0.0 || std_dev != 1.0 {
                    z.iter_mut().for_each(|x| *x = mean + std_dev * *x);
                }
                z
            }
            TransformParams::Exponential { lambda } => exponential(uniform, lambda),
            TransformParams::Poisson { lambda } => poisson(uniform, lambda),
            TransformParams::Binomial { n, p } => binomial(uniform, n, p),
            TransformParams::Gamma { alpha, beta } => gamma(uniform, alpha, beta)?,
            TransformParams::Beta { alpha, beta } => beta_ratio(uniform, alpha, beta),
            TransformParams::Uniform { low, high } => uniform.iter().map(|u| low + u * (high - low)).collect(),
        };
        trace!(distribution = self.distribution().tag(), inputs = uniform.len(), outputs = out.len(), "transformed sample");
        Ok(out)
    }
}

/// Box-Muller transform. Each pair (u1, u2) yields
/// z1 = sqrt(-2 ln u1) cos(2π u2) and z2 = sqrt(-2 ln u1) sin(2π u2).
/// u1 = 0 is treated as the smallest positive double.
pub fn box_muller(uniform: &[f64]) -> Result<Vec<f64>> {
    if uniform.len() < 2 {
        return Err(Error::InvalidInput(format!("Box-Muller needs at least 2 samples, got {}", uniform.len())));
    }
    let mut out = Vec::with_capacity(uniform.len() & !1);
    for pair in uniform.chunks_exact(2) {
        let r = (-2.0 * pair[0].max(f64::MIN_POSITIVE).ln()).sqrt();
        let (s, c) = (2.0 * PI * pair[1]).sin_cos();
        out.push(r * c);
        out.push(r * s);
    }
    Ok(out)
}

/// Inverse CDF of the exponential distribution, x = -ln(1 - u) / λ.
pub fn exponential(uniform: &[f64], lambda: f64) -> Vec<f64> {
    uniform.iter().map(|u| -(1.0 - u).max(f64::MIN_POSITIVE).ln() / lambda).collect()
}

/// Poisson by sequential CDF inversion: the smallest k with u <= F(k).
pub fn poisson(uniform: &[f64], lambda: f64) -> Vec<f64> {
    let p0 = (-lambda).exp();
    uniform.iter().map(|&u| {
        let mut k = 0u64;
        let mut p = p0;
        let mut f = p;
        // Once p underflows F cannot grow, which only happens for u within rounding of 1.
        while u > f && p > 0.0 {
            k += 1;
            p *= lambda / k as f64;
            f += p;
        }
        k as f64
    }).collect()
}

/// Binomial by PMF accumulation from (1 - p)^n, stopping at n.
pub fn binomial(uniform: &[f64], n: u64, p: f64) -> Vec<f64> {
    if p >= 1.0 {
        return vec![n as f64; uniform.len()];
    }
    let q = 1.0 - p;
    let ratio = p / q;
    let p0 = q.powf(n as f64);
    uniform.iter().map(|&u| {
        let mut k = 0u64;
        let mut pk = p0;
        let mut f = pk;
        while u > f && k < n {
            pk *= (n - k) as f64 / (k + 1) as f64 * ratio;
            k += 1;
            f += pk;
        }
        k as f64
    }).collect()
}

/// Gamma(α, β) for α >= 1 by pairwise rejection: with y = -ln u1 and
/// z = -ln(u2) / α, accept z β when y >= (α - 1)(z - ln z - 1).
pub fn gamma(uniform: &[f64], alpha: f64, beta: f64) -> Result<Vec<f64>> {
    if alpha < 1.0 {
        return Err(Error::parameter("alpha", format!("{} < 1 is not supported by the gamma sampler", alpha)));
    }
    Ok(uniform.chunks_exact(2).filter_map(|pair| {
        let y = -pair[0].ln();
        let z = -pair[1].ln() / alpha;
        let x = z * beta;
        // NaN comparisons reject pairs that hit ln(0).
        (y >= (alpha - 1.0) * (z - z.ln() - 1.0) && x.is_finite()).then_some(x)
    }).collect())
}

/// Beta(α, β) by pairwise rejection: x = u1^(1/α), y = u2^(1/β),
/// accept x / (x + y) when 0 < x + y <= 1.
pub fn beta_ratio(uniform: &[f64], alpha: f64, beta: f64) -> Vec<f64> {
    uniform.chunks_exact(2).filter_map(|pair| {
        let x = pair[0].powf(1.0 / alpha);
        let y = pair[1].powf(1.0 / beta);
        let s = x + y;
        (s > 0.0 && s <= 1.0).then(|| x / s)
    }).collect()
}

/// Parses `distribution` and `params` and applies the transform.
pub fn transform(distribution: &str, uniform: &[f64], params: &Params) -> Result<Vec<f64>> {
    let distribution: Distribution = distribution.parse()?;
    TransformParams::from_params(distribution, params)?.apply(uniform)
}
