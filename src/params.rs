//! Parameter maps and the typed views parsed from them.
//!
//! Callers pass parameters as a string-keyed map of numbers (or lists of
//! numbers, for LFSR taps). Each algorithm and transform pulls out only the
//! keys it understands, applies its defaults, and validates the values.

use std::collections::BTreeMap;
#[cfg(feature = "serde")] use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::uniform::Algorithm;

/// A single parameter value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Number(f64),
    List(Vec<f64>),
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Number(x)
    }
}

impl From<i64> for ParamValue {
    fn from(x: i64) -> Self {
        ParamValue::Number(x as f64)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(x: Vec<f64>) -> Self {
        ParamValue::List(x)
    }
}

impl From<&[u32]> for ParamValue {
    fn from(x: &[u32]) -> Self {
        ParamValue::List(x.iter().map(|&t| t as f64).collect())
    }
}

/// String-keyed parameter map.
pub type Params = BTreeMap<String, ParamValue>;

/// Builds a parameter map from `(key, value)` pairs.
///
/// ```
/// use rand_montecarlo::params::{params, ParamValue};
///
/// let p = params([("lambda", 2.0.into()), ("taps", vec![3.0, 2.0].into())]);
/// assert_eq!(Some(&ParamValue::Number(2.0)), p.get("lambda"));
/// ```
pub fn params<'a, I: IntoIterator<Item = (&'a str, ParamValue)>>(pairs: I) -> Params {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Looks up a scalar parameter. Lists are rejected.
pub(crate) fn number(params: &Params, name: &str) -> Result<Option<f64>> {
    match params.get(name) {
        None => Ok(None),
        Some(ParamValue::Number(x)) if x.is_finite() => Ok(Some(*x)),
        Some(ParamValue::Number(x)) => Err(Error::parameter(name, format!("{} is not finite", x))),
        Some(ParamValue::List(_)) => Err(Error::parameter(name, "expected a number, got a list")),
    }
}

/// Looks up a scalar parameter that must be a whole number in `[min, max]`.
pub(crate) fn integer(params: &Params, name: &str, default: u64, min: u64, max: u64) -> Result<u64> {
    let x = match number(params, name)? {
        None => return Ok(default),
        Some(x) => x,
    };
    if x.fract() != 0.0 || x < min as f64 || x > max as f64 {
        return Err(Error::parameter(name, format!("{} is not an integer in [{}, {}]", x, min, max)));
    }
    Ok(x as u64)
}

/// Looks up a scalar parameter that must be strictly positive.
pub(crate) fn positive(params: &Params, name: &str, default: Option<f64>) -> Result<f64> {
    match number(params, name)?.or(default) {
        None => Err(Error::parameter(name, "required")),
        Some(x) if x > 0.0 => Ok(x),
        Some(x) => Err(Error::parameter(name, format!("{} must be positive", x))),
    }
}

/// Logs keys that none of the given names consume.
pub(crate) fn trace_unused(params: &Params, known: &[&str]) {
    for key in params.keys().filter(|k| !known.contains(&k.as_str())) {
        trace!(key = key.as_str(), "ignoring unused parameter");
    }
}

/// Linear congruential constants. Defaults are the Numerical Recipes values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LcgParams {
    pub a: u64,
    pub c: u64,
    pub m: u64,
}

impl Default for LcgParams {
    fn default() -> Self {
        LcgParams { a: crate::LCG_A, c: crate::LCG_C, m: crate::LCG_M }
    }
}

impl LcgParams {
    /// Reads `a`, `c` and `m`. The modulus must be at least 2 and both
    /// constants must be below it; `a` must be nonzero.
    pub fn from_params(params: &Params) -> Result<Self> {
        let d = Self::default();
        let m = integer(params, "m", d.m, 2, u64::MAX)?;
        let a = integer(params, "a", d.a, 1, m - 1)?;
        let c = integer(params, "c", d.c.min(m - 1), 0, m - 1)?;
        trace_unused(params, &["a", "c", "m"]);
        Ok(LcgParams { a, c, m })
    }
}

/// LFSR tap positions, as bit indices into the state register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LfsrParams {
    pub taps: Vec<u32>,
}

impl Default for LfsrParams {
    fn default() -> Self {
        LfsrParams { taps: crate::LFSR_TAPS.to_vec() }
    }
}

impl LfsrParams {
    /// Reads `taps`: a non-empty list of bit positions below 64.
    /// A single number is accepted as a one-tap list.
    pub fn from_params(params: &Params) -> Result<Self> {
        let raw = match params.get("taps") {
            None => return Ok(Self::default()),
            Some(ParamValue::Number(x)) => vec![*x],
            Some(ParamValue::List(xs)) => xs.clone(),
        };
        if raw.is_empty() || raw.len() > 64 {
            return Err(Error::parameter("taps", format!("expected 1 to 64 positions, got {}", raw.len())));
        }
        let mut taps = Vec::with_capacity(raw.len());
        for x in raw {
            if x.fract() != 0.0 || !(0.0 .. 64.0).contains(&x) {
                return Err(Error::parameter("taps", format!("{} is not a bit position in [0, 63]", x)));
            }
            taps.push(x as u32);
        }
        trace_unused(params, &["taps"]);
        Ok(LfsrParams { taps })
    }
}

/// Second seed of the middle-product generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiddleProductParams {
    pub seed2: u64,
}

impl Default for MiddleProductParams {
    fn default() -> Self {
        MiddleProductParams { seed2: crate::MIDDLE_SECOND_SEED }
    }
}

impl MiddleProductParams {
    /// Reads `seed2`, a non-negative integer (reduced to 4 digits on use).
    pub fn from_params(params: &Params) -> Result<Self> {
        let seed2 = integer(params, "seed2", crate::MIDDLE_SECOND_SEED, 0, u32::MAX as u64)?;
        trace_unused(params, &["seed2"]);
        Ok(MiddleProductParams { seed2 })
    }
}

/// A complete generator request: algorithm, optional seed and parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub algorithm: Algorithm,
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Params,
}

impl GeneratorConfig {
    pub fn new(algorithm: Algorithm, seed: Option<i64>, params: Params) -> Self {
        GeneratorConfig { algorithm, seed, params }
    }

    /// Parses the algorithm tag and bundles the rest.
    pub fn parse(algorithm: &str, seed: Option<i64>, params: Params) -> Result<Self> {
        Ok(Self::new(algorithm.parse()?, seed, params))
    }
}

#[cfg(test)] mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test] fn lcg_defaults_and_overrides() {
        assert_eq!(LcgParams::default(), LcgParams::from_params(&Params::new()).unwrap());
        let p = LcgParams::from_params(&params([("a", 5.0.into()), ("c", 3.0.into()), ("m", 16.0.into())])).unwrap();
        assert_eq!(LcgParams { a: 5, c: 3, m: 16 }, p);
    }

    #[test] fn lcg_rejects_bad_constants() {
        for (k, v) in [("m", 1.0), ("a", 0.0), ("a", 1.5), ("m", -4.0), ("c", 4294967296.0)] {
            let err = LcgParams::from_params(&params([(k, v.into())])).unwrap_err();
            assert_eq!(ErrorKind::Configuration, err.kind(), "{} = {}", k, v);
        }
        let err = LcgParams::from_params(&params([("a", vec![1.0].into())])).unwrap_err();
        assert!(err.to_string().contains("list"));
    }

    #[test] fn lcg_small_modulus_clamps_default_increment() {
        let p = LcgParams::from_params(&params([("m", 100.0.into()), ("a", 21.0.into())])).unwrap();
        assert!(p.c < p.m);
    }

    #[test] fn lfsr_taps() {
        assert_eq!(vec![3, 2], LfsrParams::from_params(&Params::new()).unwrap().taps);
        let p = LfsrParams::from_params(&params([("taps", vec![7.0, 5.0, 0.0].into())])).unwrap();
        assert_eq!(vec![7, 5, 0], p.taps);
        assert_eq!(vec![4], LfsrParams::from_params(&params([("taps", 4.0.into())])).unwrap().taps);
        assert!(LfsrParams::from_params(&params([("taps", vec![64.0].into())])).is_err());
        assert!(LfsrParams::from_params(&params([("taps", Vec::<f64>::new().into())])).is_err());
        assert!(LfsrParams::from_params(&params([("taps", vec![1.5].into())])).is_err());
    }

    #[test] fn positive_requires_value() {
        let p = params([("lambda", 0.0.into())]);
        assert!(positive(&p, "lambda", None).is_err());
        assert!(positive(&Params::new(), "lambda", None).is_err());
        assert_eq!(1.0, positive(&Params::new(), "lambda", Some(1.0)).unwrap());
        assert!(number(&params([("x", f64::NAN.into())]), "x").is_err());
    }

    #[cfg(feature = "serde")]
    #[test] fn generator_config_from_json() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{"algorithm": "lcg_additive", "seed": 7, "params": {"a": 5, "c": 3, "m": 16, "taps": [7, 5]}}"#,
        ).unwrap();
        assert_eq!(Algorithm::LcgAdditive, config.algorithm);
        assert_eq!(Some(7), config.seed);
        assert_eq!(LcgParams { a: 5, c: 3, m: 16 }, LcgParams::from_params(&config.params).unwrap());
        assert_eq!(Some(&ParamValue::List(vec![7.0, 5.0])), config.params.get("taps"));
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(config, serde_json::from_str(&text).unwrap());

        let bare: GeneratorConfig = serde_json::from_str(r#"{"algorithm": "xorshift32"}"#).unwrap();
        assert_eq!(GeneratorConfig::new(Algorithm::Xorshift32, None, Params::new()), bare);
        assert!(serde_json::from_str::<GeneratorConfig>(r#"{"algorithm": "pcg64"}"#).is_err());
    }
}
