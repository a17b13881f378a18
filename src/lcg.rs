use crate::params::LcgParams;

// This module contains the linear congruential generators
// and utility functions for jumping them around.

/// LCG iteration is state <- (state * a + c) mod m.
/// Returns the (a, c) pair that iterates by n steps at once.
pub fn get_jump(a: u128, c: u128, m: u128, n: u64) -> (u128, u128) {
    // Algorithm from Brown, F. B., "Random Number Generation with Arbitrary Stride",
    // Transactions of the American Nuclear Society, 1994.
    // All intermediate values stay below m <= 2**64, so products fit in 128 bits.
    let mut unit_a = a % m;
    let mut unit_c = c % m;
    let mut jump_a: u128 = 1 % m;
    let mut jump_c: u128 = 0;
    let mut delta = n;

    while delta > 0 {
        if delta & 1 == 1 {
            jump_a = jump_a * unit_a % m;
            jump_c = (jump_c * unit_a + unit_c) % m;
        }
        unit_c = (unit_a + 1) * unit_c % m;
        unit_a = unit_a * unit_a % m;
        delta >>= 1;
    }
    (jump_a, jump_c)
}

/// LCG iteration is state <- (state * a + c) mod m.
/// Returns state after the specified number of iterations from the origin state.
pub fn get_state(a: u128, c: u128, m: u128, origin: u128, iterations: u64) -> u128 {
    let (jump_a, jump_c) = get_jump(a, c, m, iterations);
    (origin % m * jump_a + jump_c) % m
}

fn gcd(mut x: u128, mut y: u128) -> u128 {
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x
}

/// Largest f64 below 1.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Linear congruential generator. The multiplicative variant is the same
/// recurrence with c = 0.
#[derive(Clone, Eq, PartialEq)]
pub struct LinearCongruential {
    a: u128,
    c: u128,
    m: u128,
    state: u128,
    seed: u64,
}

impl core::fmt::Debug for LinearCongruential {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "LinearCongruential {{ a: {}, c: {}, m: {} }}", self.a, self.c, self.m)
    }
}

impl LinearCongruential {

    /// Creates an additive LCG. The seed is reduced modulo m.
    pub fn new(params: LcgParams, seed: u64) -> Self {
        let m = params.m as u128;
        LinearCongruential { a: params.a as u128, c: params.c as u128, m, state: seed as u128 % m, seed }
    }

    /// Creates a multiplicative LCG, ignoring any increment in `params`.
    pub fn multiplicative(params: LcgParams, seed: u64) -> Self {
        Self::new(LcgParams { c: 0, ..params }, seed)
    }

    #[inline] pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline] pub fn modulus(&self) -> u128 {
        self.m
    }

    /// Returns true for the c = 0 variant.
    #[inline] pub fn is_multiplicative(&self) -> bool {
        self.c == 0
    }

    /// Returns true if a multiplicative generator will hit zero, after which
    /// it stays there. The state a^k s is divisible by m for some k exactly
    /// when every prime factor of m / gcd(m, s) also divides a.
    pub fn reaches_zero(&self) -> bool {
        if !self.is_multiplicative() {
            return false;
        }
        let mut rest = self.m / gcd(self.m, self.state);
        loop {
            let g = gcd(rest, self.a);
            if g == 1 {
                return rest == 1;
            }
            rest /= g;
        }
    }

    /// Advances the state and returns it.
    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        self.state = (self.a * self.state + self.c) % self.m;
        self.state as u64
    }

    /// Returns the next value in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        let x = self.next_raw() as f64 / self.m as f64;
        // Moduli above 2**53 can round state / m up to 1.
        if x < 1.0 { x } else { BELOW_ONE }
    }

    /// Jumps forward by the given number of steps.
    pub fn jump(&mut self, steps: u64) {
        self.state = get_state(self.a, self.c, self.m, self.state, steps);
    }
}
