use rand_core::{OsRng, RngCore};

use crate::error::Result;

/// Reads uniform values straight from the operating system entropy source.
/// Not reproducible: there is no seed and no state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PhysicalNoise;

impl PhysicalNoise {

    pub fn new() -> Self {
        PhysicalNoise
    }

    /// Reads 4 bytes of entropy as a big-endian 32-bit word.
    pub fn next_raw(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Returns the next value, word / 2**32, in [0, 1).
    pub fn next_f64(&mut self) -> Result<f64> {
        Ok(self.next_raw()? as f64 / 4294967296.0)
    }
}

#[cfg(test)] mod tests {
    use super::*;

    #[test] fn values_in_unit_interval() {
        let mut noise = PhysicalNoise::new();
        let xs: Vec<f64> = (0 .. 256).map(|_| noise.next_f64().unwrap()).collect();
        assert!(xs.iter().all(|x| (0.0 .. 1.0).contains(x)));
        // 256 draws from 2**32 values are all equal with negligible probability.
        assert!(xs.iter().any(|&x| x != xs[0]));
    }
}
