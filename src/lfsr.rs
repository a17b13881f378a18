use tracing::warn;

use crate::params::LfsrParams;

/// Linear feedback shift register.
///
/// The register has no fixed width: every step measures the bit length of
/// the current state and uses it both to mask the shifted state and as the
/// output divisor. Because the top bit is shifted out, the width never grows
/// and can only shrink, so the effective modulus changes over time.
///
/// The register always collapses. Each time the top bit shifts out as 0 the
/// width drops, and a width that holds for `width` steps means every bit is 1.
/// The state therefore ends at zero or at an all-ones fixed point (for the
/// default taps, 0 or 0b111), usually within a few dozen steps and never
/// later than about 2100. From then on every output is the same value.
/// A warning is logged when that happens.
#[derive(Clone, Eq, PartialEq)]
pub struct Lfsr {
    state: u64,
    taps: Vec<u32>,
    seed: u64,
    settled: bool,
}

impl core::fmt::Debug for Lfsr {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Lfsr {{ taps: {:?} }}", self.taps)
    }
}

/// Returns the number of significant bits in x.
#[inline] fn bit_length(x: u64) -> u32 {
    64 - x.leading_zeros()
}

/// Mask with the low `bits` bits set.
#[inline] fn low_mask(bits: u32) -> u64 {
    if bits == 0 { 0 } else { u64::MAX >> (64 - bits) }
}

impl Lfsr {

    pub fn new(params: LfsrParams, seed: u64) -> Self {
        let mut lfsr = Lfsr { state: seed, taps: params.taps, seed, settled: false };
        lfsr.settled = lfsr.is_stuck();
        lfsr
    }

    #[inline] pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline] pub fn taps(&self) -> &[u32] {
        &self.taps
    }

    /// Current register width in bits.
    #[inline] pub fn width(&self) -> u32 {
        bit_length(self.state)
    }

    /// Returns true once the register has collapsed to a fixed point (zero
    /// or all ones), after which every output is the same.
    #[inline] pub fn is_stuck(&self) -> bool {
        self.shifted().0 == self.state
    }

    /// The state one shift ahead, with the width it was masked to.
    #[inline]
    fn shifted(&self) -> (u64, u32) {
        let bits = bit_length(self.state);
        let feedback = self.taps.iter().fold(0, |acc, &t| acc ^ ((self.state >> t) & 1));
        (((self.state << 1) | feedback) & low_mask(bits), bits)
    }

    /// Shifts one bit in. Returns the new state and the width it was masked to.
    #[inline]
    fn step(&mut self) -> (u64, u32) {
        let (state, bits) = self.shifted();
        if state == self.state && !self.settled {
            self.settled = true;
            warn!(seed = self.seed, state, "lfsr has collapsed, every further output repeats");
        }
        self.state = state;
        (state, bits)
    }

    /// Advances the register and returns its new contents.
    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        self.step().0
    }

    /// Returns the next value, state / 2**width, in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        let (state, bits) = self.step();
        // Keep at most 53 significant bits so the quotient cannot round up to 1.
        if bits > 53 {
            (state >> (bits - 53)) as f64 / (1u64 << 53) as f64
        } else {
            state as f64 / (1u64 << bits) as f64
        }
    }
}

#[cfg(test)] mod tests {
    use super::*;

    fn lfsr(taps: &[u32], seed: u64) -> Lfsr {
        Lfsr::new(LfsrParams { taps: taps.to_vec() }, seed)
    }

    #[test] fn shifts_feedback_into_bit_zero() {
        // 0b1011: bit 3 = 1, bit 2 = 0, feedback = 1.
        let mut r = lfsr(&[3, 2], 0b1011);
        assert_eq!(0b0111, r.next_raw());
        // Width has shrunk to 3 bits: bit 3 = 0, bit 2 = 1, feedback = 1.
        assert_eq!(3, r.width());
        let mut r = lfsr(&[3, 2], 0b0111);
        assert_eq!(0b111 & ((0b0111 << 1) | 1), r.next_raw());
    }

    #[test] fn divisor_follows_width() {
        let mut r = lfsr(&[3, 2], 0b1011);
        // Masked to the 4 bits the state had before the step.
        assert_eq!(7.0 / 16.0, r.next_f64());
        // State 0b111 has 3 bits.
        let next = r.clone().next_raw();
        assert_eq!(next as f64 / 8.0, r.next_f64());
    }

    #[test] fn zero_state_is_stuck() {
        let mut r = lfsr(&[3, 2], 0);
        assert!(r.is_stuck());
        for _ in 0 .. 10 { assert_eq!(0.0, r.next_f64()); }
    }

    #[test] fn default_taps_collapse_to_zero() {
        let mut r = lfsr(&crate::LFSR_TAPS, 123456789);
        let xs: Vec<f64> = (0 .. 64).map(|_| r.next_f64()).collect();
        assert!(r.is_stuck());
        assert_eq!(0, r.next_raw());
        // Nonzero up to the collapse, zero after it.
        assert!(xs[.. 32].iter().all(|&x| x > 0.0));
        assert!(xs[32 ..].iter().all(|&x| x == 0.0));
    }

    #[test] fn collapse_can_end_all_ones() {
        let mut r = lfsr(&crate::LFSR_TAPS, 0xdead_beef);
        assert!(!r.is_stuck());
        for _ in 0 .. 64 { r.next_raw(); }
        assert!(r.is_stuck());
        assert_eq!(0b111, r.next_raw());
        assert_eq!(7.0 / 8.0, r.next_f64());
        assert!(lfsr(&crate::LFSR_TAPS, 0b111).is_stuck());
    }

    #[test] fn wide_state_stays_below_one() {
        let mut r = lfsr(&[63, 62, 60, 59], u64::MAX);
        let mut nonzero = 0;
        for _ in 0 .. 200 {
            let x = r.next_f64();
            assert!((0.0 .. 1.0).contains(&x));
            if x > 0.0 { nonzero += 1; }
        }
        // 64-bit states are divided through their top 53 bits until the collapse.
        assert!(nonzero > 50);
        assert!(r.is_stuck());
    }
}
