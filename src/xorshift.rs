use rand_core::{impls, Error, RngCore, SeedableRng};

/// Marsaglia's 32-bit xorshift generator with the (13, 17, 5) triple.
/// Period 2**32 - 1. The zero state is a fixed point.
#[derive(Clone, Eq, PartialEq)]
pub struct Xorshift32 {
    state: u32,
}

impl core::fmt::Debug for Xorshift32 {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Xorshift32 {{}}")
    }
}

impl Xorshift32 {

    pub fn new(seed: u32) -> Self {
        Xorshift32 { state: seed }
    }

    #[inline] pub fn is_stuck(&self) -> bool {
        self.state == 0
    }

    #[inline]
    pub fn next_raw(&mut self) -> u32 {
        // Shifts on u32 already drop the bits that leave the word.
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns the next value, state / 2**32, in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_raw() as f64 / 4294967296.0
    }
}

impl RngCore for Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        // Always use Little-Endian.
        Xorshift32::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)] mod tests {
    use super::*;

    #[test] fn known_sequence() {
        let mut x = Xorshift32::new(1);
        assert_eq!(270369, x.next_raw());
        assert_eq!(67634689, x.next_raw());
        assert_eq!(2647435461, x.next_raw());
    }

    #[test] fn output_scaled_by_two_to_32() {
        let mut a = Xorshift32::new(2463534242);
        let mut b = a.clone();
        for _ in 0 .. 1000 {
            let x = a.next_f64();
            assert_eq!(b.next_u32() as f64 / 4294967296.0, x);
            assert!(x > 0.0 && x < 1.0);
        }
    }

    #[test] fn zero_is_fixed_point() {
        let mut x = Xorshift32::from_seed([0; 4]);
        assert!(x.is_stuck());
        assert_eq!(0, x.next_raw());
    }
}
