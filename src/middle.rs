use crate::params::MiddleProductParams;

// Von Neumann style generators working on 4-digit decimal numbers.

/// Numbers are kept to this many decimal digits.
const DIGITS: u32 = 4;
const SCALE: u64 = 10_000;
/// Products are zero-padded to at least this many digits.
const PADDED_DIGITS: u32 = 8;

/// Returns the number of decimal digits in x, counting 0 as one digit.
#[inline] fn decimal_len(x: u64) -> u32 {
    x.checked_ilog10().unwrap_or(0) + 1
}

/// Extracts the middle 4 digits of x written with at least 8 digits.
/// For odd lengths the extra digit goes to the right.
pub fn middle_digits(x: u64) -> u64 {
    let len = decimal_len(x).max(PADDED_DIGITS);
    let start = (len - DIGITS) / 2;
    let right = len - start - DIGITS;
    x / 10u64.pow(right) % SCALE
}

/// Middle-product generator: the middle digits of current * previous
/// become the new current value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MiddleProduct {
    current: u64,
    previous: u64,
}

impl MiddleProduct {

    /// Seeds are reduced to 4 digits.
    pub fn new(params: MiddleProductParams, seed: u64) -> Self {
        MiddleProduct { current: seed % SCALE, previous: params.seed2 % SCALE }
    }

    #[inline] pub fn current(&self) -> u64 {
        self.current
    }

    #[inline] pub fn is_stuck(&self) -> bool {
        self.current == 0 || self.previous == 0
    }

    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        let next = middle_digits(self.current * self.previous);
        self.previous = self.current;
        self.current = next;
        next
    }

    /// Returns the next value, current / 10000, in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_raw() as f64 / SCALE as f64
    }
}

/// Middle-square generator: the middle digits of current squared become
/// the new current value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuadraticResidue {
    current: u64,
}

impl QuadraticResidue {

    /// The seed is reduced to 4 digits.
    pub fn new(seed: u64) -> Self {
        QuadraticResidue { current: seed % SCALE }
    }

    #[inline] pub fn current(&self) -> u64 {
        self.current
    }

    #[inline] pub fn is_stuck(&self) -> bool {
        self.current == 0
    }

    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        self.current = middle_digits(self.current * self.current);
        self.current
    }

    /// Returns the next value, current / 10000, in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_raw() as f64 / SCALE as f64
    }
}
