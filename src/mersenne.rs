use wrapping_arithmetic::wrappit;
use rand_core::{impls, Error, RngCore, SeedableRng};

/// Number of 32-bit words in the state.
pub const MT_N: usize = 624;
const MT_M: usize = 397;
const MATRIX_A: u32 = 0x9908b0df;
const UPPER_MASK: u32 = 0x80000000;
const LOWER_MASK: u32 = 0x7fffffff;

/// Divisor applied to tempered output.
/// Kept at 2**32 - 1, so the top value 0xffffffff maps to exactly 1.0.
pub const MT_DIVISOR: f64 = 0xffffffffu32 as f64;

/// MT19937 Mersenne Twister. 32-bit output, 624-word state.
#[derive(Clone, Eq, PartialEq)]
pub struct MersenneTwister {
    mt: [u32; MT_N],
    /// Next word to extract. A twist happens when this reaches MT_N.
    index: usize,
    seed: u32,
}

// As with the other generators, Debug does not dump internal state.
impl core::fmt::Debug for MersenneTwister {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "MersenneTwister {{ seed: {}, index: {} }}", self.seed, self.index)
    }
}

impl MersenneTwister {

    /// Creates a new Mersenne Twister from a 32-bit seed.
    /// The first extraction triggers a twist, so output matches reference MT19937.
    #[wrappit]
    pub fn new(seed: u32) -> Self {
        let mut mt = [0u32; MT_N];
        mt[0] = seed;
        for i in 1 .. MT_N {
            let prev = mt[i - 1];
            let mixed = prev ^ prev >> 30;
            mt[i] = 1812433253u32 * mixed + i as u32;
        }
        MersenneTwister { mt, index: MT_N, seed }
    }

    /// Returns the seed this generator was created with.
    #[inline] pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the extraction index, always in [0, 624].
    #[inline] pub fn index(&self) -> usize {
        self.index
    }

    /// Regenerates all 624 words.
    fn twist(&mut self) {
        for i in 0 .. MT_N {
            let y = (self.mt[i] & UPPER_MASK) | (self.mt[(i + 1) % MT_N] & LOWER_MASK);
            let mag = if y & 1 == 1 { MATRIX_A } else { 0 };
            self.mt[i] = self.mt[(i + MT_M) % MT_N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }

    /// Returns the next tempered 32-bit word.
    #[inline]
    pub fn next_raw(&mut self) -> u32 {
        if self.index >= MT_N {
            self.twist();
        }
        let mut y = self.mt[self.index];
        self.index += 1;
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c5680;
        y ^= (y << 15) & 0xefc60000;
        y ^ (y >> 18)
    }

    /// Returns the next value in [0, 1].
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_raw() as f64 / MT_DIVISOR
    }
}

impl RngCore for MersenneTwister {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        // Always use Little-Endian.
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for MersenneTwister {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        // Always use Little-Endian.
        MersenneTwister::new(u32::from_le_bytes(seed))
    }
}
