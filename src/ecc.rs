//! Error-correction codeword strategies.
//!
//! A version-1 symbol carries 19 data codewords followed by 7 error-correction
//! codewords. The strategy producing those 7 codewords sits behind the
//! [`ErrorCorrection`] trait so the rest of the pipeline never depends on it.
//!
//! [`AlternatingPlaceholder`] is the default. It emits a fixed `1,0,1,0,…`
//! pattern regardless of the data, so symbols built with it are **not**
//! guaranteed to be readable by a standards-compliant scanner.
//! [`ReedSolomon`] computes the real level-L codewords.

use crate::qrcode::{DATA_CODEWORDS, ECC_CODEWORDS};

/// Produces the error-correction codewords for a block of data codewords.
pub trait ErrorCorrection: Send + Sync {
    /// Returns the codewords appended after `data`.
    fn ecc_codewords(&self, data: &[u8; DATA_CODEWORDS]) -> [u8; ECC_CODEWORDS];

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}

/// Fixed alternating bits in place of real error correction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlternatingPlaceholder;

const ALTERNATING: [u8; ECC_CODEWORDS] = [0b1010_1010; ECC_CODEWORDS];

impl ErrorCorrection for AlternatingPlaceholder {
    fn ecc_codewords(&self, _data: &[u8; DATA_CODEWORDS]) -> [u8; ECC_CODEWORDS] {
        ALTERNATING
    }

    fn name(&self) -> &'static str {
        "alternating-placeholder"
    }
}

/// Reed-Solomon codewords over GF(2^8/0x11D) for a single 1-L block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReedSolomon {
    divisor: [u8; ECC_CODEWORDS],
}

impl ReedSolomon {
    /// Builds the generator polynomial with roots α^0 through α^6.
    pub fn new() -> Self {
        let mut divisor = [0u8; ECC_CODEWORDS];
        let degree = divisor.len();
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Self::multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        Self { divisor }
    }

    /// Generator coefficients, highest degree first, leading 1 omitted.
    pub fn divisor(&self) -> &[u8; ECC_CODEWORDS] {
        &self.divisor
    }

    fn compute_remainder(&self, data: &[u8]) -> [u8; ECC_CODEWORDS] {
        let mut result = [0u8; ECC_CODEWORDS];
        for b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            result[ECC_CODEWORDS - 1] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
        result
    }

    /// Multiplication in GF(2^8/0x11D).
    pub fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

impl Default for ReedSolomon {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorCorrection for ReedSolomon {
    fn ecc_codewords(&self, data: &[u8; DATA_CODEWORDS]) -> [u8; ECC_CODEWORDS] {
        self.compute_remainder(data)
    }

    fn name(&self) -> &'static str {
        "reed-solomon"
    }
}
