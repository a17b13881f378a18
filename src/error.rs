//! Error types for generation, transformation and integration.

use thiserror::Error;

/// Failure reported by an external expression evaluator.
///
/// The evaluator is supplied by the caller; this crate never interprets
/// expression text itself, it only carries the message back.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// The argument lies outside the function's domain (e.g. `ln(-1)`).
    #[error("domain error at x = {x}: {message}")]
    Domain {
        /// Point at which evaluation failed.
        x: f64,
        /// Description from the evaluator.
        message: String,
    },

    /// Division by zero during evaluation.
    #[error("division by zero at x = {x}")]
    DivisionByZero {
        /// Point at which evaluation failed.
        x: f64,
    },

    /// The evaluator produced NaN or an infinity.
    #[error("non-finite value {value} at x = {x}")]
    NonFinite {
        /// Point at which evaluation failed.
        x: f64,
        /// The offending value.
        value: f64,
    },

    /// Any other evaluator failure, including compilation of the expression text.
    #[error("{0}")]
    Other(String),
}

/// Coarse error category, for callers that only need to branch on the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidInput,
    InvalidRange,
    InvalidCount,
    Evaluation,
    Entropy,
}

/// Crate-wide error.
///
/// # Examples
/// ```
/// use rand_montecarlo::{Error, ErrorKind};
///
/// let err = Error::InvalidRange { a: 5.0, b: 5.0 };
/// assert_eq!(err.kind(), ErrorKind::InvalidRange);
/// assert!(err.to_string().contains("a < b"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Unknown algorithm or distribution key.
    #[error("unknown {what} '{key}', expected one of: {valid}")]
    Configuration {
        /// What was being looked up ("algorithm" or "distribution").
        what: &'static str,
        /// The key that was not recognised.
        key: String,
        /// Comma separated list of valid keys.
        valid: String,
    },

    /// A parameter is missing a required property (range, integrality, ...).
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The input sample cannot feed the requested transform.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Integration bounds with `a >= b`, or a non-finite bound or width.
    #[error("invalid integration range [{a}, {b}]: a < b is required")]
    InvalidRange {
        /// Lower bound.
        a: f64,
        /// Upper bound.
        b: f64,
    },

    /// A zero count of samples or integration points.
    #[error("invalid count {0}: at least one point is required")]
    InvalidCount(u64),

    /// The external evaluator failed; integration was aborted.
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    /// The operating system entropy source could not be read.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

impl Error {
    pub(crate) fn parameter(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter { name: name.to_string(), reason: reason.into() }
    }

    /// Returns the coarse category of this error.
    /// Invalid parameters count as configuration errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } | Error::InvalidParameter { .. } => ErrorKind::Configuration,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::InvalidCount(_) => ErrorKind::InvalidCount,
            Error::Evaluation(_) => ErrorKind::Evaluation,
            Error::Entropy(_) => ErrorKind::Entropy,
        }
    }
}

impl From<rand_core::Error> for Error {
    fn from(err: rand_core::Error) -> Self {
        Error::Entropy(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
