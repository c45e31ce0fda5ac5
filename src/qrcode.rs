#![forbid(unsafe_code)]
//! QR symbol matrix construction.
//!
//! This module builds a fixed 21×21 (version 1) symbol in five stages over one grid:
//! function patterns, format information, data encoding, error-correction codewords,
//! then zigzag placement followed by the mask 0 pass. Every stage is exposed as a
//! method so the stages can be inspected one at a time.

use crate::ecc::{AlternatingPlaceholder, ErrorCorrection};
use crate::error::QrError;
use crate::segment::{encode_data, BitBuffer};
use log::{debug, trace};

/// Width and height of a version-1 symbol, in modules.
pub const SIZE: usize = 21;

/// Data codewords in a 1-L symbol.
pub const DATA_CODEWORDS: usize = 19;

/// Error-correction codewords in a 1-L symbol.
pub const ECC_CODEWORDS: usize = 7;

/// Bits available for mode, count, payload and padding.
pub const DATA_CAPACITY_BITS: usize = DATA_CODEWORDS * 8;

/// Length of the combined data and error-correction stream.
pub const TOTAL_BITS: usize = (DATA_CODEWORDS + ECC_CODEWORDS) * 8;

/// Position of the dark module, as `(row, col)`. Format placement later overwrites it.
pub const DARK_MODULE: (usize, usize) = (13, 8);

const FINDER_ORIGINS: [(usize, usize); 3] = [(0, 0), (0, SIZE - 7), (SIZE - 7, 0)];

/// The 15-bit format information word.
///
/// Always error-correction level L with mask 0, XORed with the standard format mask.
/// The value is a literal constant rather than a BCH computation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FormatWord(u16);

impl FormatWord {
    const ECL_LOW: u16 = 0b01;
    const MASK_ID: u16 = 0b000;
    const XOR_MASK: u16 = 0b101010000010010;

    /// The only format word this engine writes.
    pub const FIXED: FormatWord = FormatWord(((Self::ECL_LOW << 3) | Self::MASK_ID) ^ Self::XOR_MASK);

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns bit `i`, where bit 14 is the most significant.
    pub const fn bit(self, i: usize) -> bool {
        (self.0 >> i) & 1 != 0
    }
}

/// Returns whether `(row, col)` belongs to a function region.
///
/// Finder patterns with their separators and format corners, the timing row and column,
/// and the dark module are reserved. Everything else carries data. The result depends
/// only on the position, never on content.
pub const fn is_function_module(row: usize, col: usize) -> bool {
    let finder = (row < 9 && col < 9) || (row < 9 && col > SIZE - 9) || (row > SIZE - 9 && col < 9);
    let timing = row == 6 || col == 6;
    let dark = row == DARK_MODULE.0 && col == DARK_MODULE.1;
    let format = (row == 8 && col < 9) || (col == 8 && row < 9);
    finder || timing || dark || format
}

/// A version-1 QR symbol: a 21×21 grid of dark (`true`) and light (`false`) modules.
///
/// Modules are stored row-major with the origin at the top-left corner.
///
/// # Example
///
/// ```rust
/// use qrsymbol::qrcode::QrCode;
///
/// let qr = QrCode::encode_text("HI").unwrap();
/// assert_eq!(qr.size(), 21);
/// assert!(qr.get_module(0, 0)); // finder corner
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct QrCode {
    modules: [[bool; SIZE]; SIZE],
}

impl QrCode {
    /// Encodes text into a symbol, using the placeholder error-correction codewords.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::CapacityExceeded`] if the text needs more than 152 data bits.
    pub fn encode_text(text: &str) -> Result<Self, QrError> {
        Self::encode_text_with(text, &AlternatingPlaceholder)
    }

    /// Encodes UTF-8 bytes into a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidInput`] if `bytes` is not valid UTF-8, or
    /// [`QrError::CapacityExceeded`] if the text is too long.
    pub fn encode_utf8(bytes: &[u8]) -> Result<Self, QrError> {
        let text = core::str::from_utf8(bytes).map_err(|e| QrError::InvalidInput(e.to_string()))?;
        Self::encode_text(text)
    }

    /// Encodes text into a symbol with the given error-correction strategy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrsymbol::ecc::ReedSolomon;
    /// use qrsymbol::qrcode::QrCode;
    ///
    /// let qr = QrCode::encode_text_with("HELLO", &ReedSolomon::new()).unwrap();
    /// assert_eq!(qr.size(), 21);
    /// ```
    pub fn encode_text_with(text: &str, ecc: &dyn ErrorCorrection) -> Result<Self, QrError> {
        let mut result = Self::blank();
        result.draw_function_patterns();
        result.draw_format_bits();

        let mut bits: BitBuffer = encode_data(text)?;
        let ecc_codewords = ecc.ecc_codewords(&bits.to_codewords());
        bits.append_bytes(&ecc_codewords);
        debug_assert_eq!(bits.len(), TOTAL_BITS);
        debug!(
            "encoded {} chars into {} bits with {} error correction",
            text.chars().count(),
            bits.len(),
            ecc.name()
        );

        result.draw_codewords(&bits);
        result.apply_mask();
        Ok(result)
    }

    /// Returns an all-light grid.
    pub fn blank() -> Self {
        Self {
            modules: [[false; SIZE]; SIZE],
        }
    }

    /// Returns this symbol's size in modules, always 21.
    pub fn size(&self) -> i32 {
        SIZE as i32
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside
    /// the symbol return `false`.
    pub fn get_module(&self, row: i32, col: i32) -> bool {
        let range = 0..self.size();
        range.contains(&row) && range.contains(&col) && self.modules[row as usize][col as usize]
    }

    /// Returns the grid, row-major.
    pub fn modules(&self) -> &[[bool; SIZE]; SIZE] {
        &self.modules
    }

    /// Returns the grid as owned rows.
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.modules.iter().map(|row| row.to_vec()).collect()
    }

    fn set_module(&mut self, row: usize, col: usize, isdark: bool) {
        self.modules[row][col] = isdark;
    }

    fn fill_rectangle(&mut self, top: usize, left: usize, height: usize, width: usize, isdark: bool) {
        for row in top..top + height {
            for col in left..left + width {
                self.set_module(row, col, isdark);
            }
        }
    }

    /// Draws the three finder patterns, their separators, the timing patterns and the
    /// dark module.
    pub fn draw_function_patterns(&mut self) {
        for &(top, left) in &FINDER_ORIGINS {
            self.draw_finder_pattern(top, left);
        }

        // Separators on the inward sides of each finder
        self.fill_rectangle(7, 0, 1, 8, false);
        self.fill_rectangle(0, 7, 8, 1, false);
        self.fill_rectangle(7, SIZE - 8, 1, 8, false);
        self.fill_rectangle(0, SIZE - 8, 8, 1, false);
        self.fill_rectangle(SIZE - 8, 7, 8, 1, false);
        self.fill_rectangle(SIZE - 8, 0, 1, 8, false);

        for i in 8..SIZE - 8 {
            self.set_module(6, i, i % 2 == 0);
            self.set_module(i, 6, i % 2 == 0);
        }

        self.set_module(DARK_MODULE.0, DARK_MODULE.1, true);
    }

    fn draw_finder_pattern(&mut self, top: usize, left: usize) {
        for dy in 0..7usize {
            for dx in 0..7usize {
                let dist = dx.abs_diff(3).max(dy.abs_diff(3));
                self.set_module(top + dy, left + dx, dist != 2);
            }
        }
    }

    /// Writes [`FormatWord::FIXED`] next to the top-left finder.
    ///
    /// The horizontal run covers row 8 from column 7 rightward and the vertical run covers
    /// column 8 from rows 7 to 14. Module (8, 8) is written three times; the last write
    /// wins. The vertical run also covers the dark module: (13, 8) ends up holding bit 9
    /// and (14, 8) bit 8, both light for the fixed word, so the dark module does not
    /// survive into the finished symbol.
    pub fn draw_format_bits(&mut self) {
        let bits = FormatWord::FIXED;
        for i in 0..6 {
            self.set_module(8, 8 + i, bits.bit(14 - i));
        }
        self.set_module(8, 7, bits.bit(8));
        self.set_module(8, 8, bits.bit(7));
        for i in 0..7 {
            self.set_module(8 + i, 8, bits.bit(14 - i));
        }
        self.set_module(7, 8, bits.bit(8));
    }

    /// Fills the free modules with `data` in zigzag order.
    ///
    /// Column pairs are walked from the right edge leftward in steps of two, skipping the
    /// pair that starts on the timing column. Rows always run bottom to top; the right
    /// column of the pair is visited before the left one. Free modules visited after the
    /// stream runs out become light. Function modules are never touched.
    pub fn draw_codewords(&mut self, data: &BitBuffer) {
        let mut bits = data.bits();
        let mut visited: usize = 0;
        for right in (0..SIZE).rev().step_by(2) {
            if right == 6 {
                continue;
            }
            for row in (0..SIZE).rev() {
                for col in [Some(right), right.checked_sub(1)].into_iter().flatten() {
                    if is_function_module(row, col) {
                        continue;
                    }
                    self.set_module(row, col, bits.next().unwrap_or(false));
                    visited += 1;
                }
            }
        }
        trace!("zigzag visited {} modules for {} bits", visited, data.len());
    }

    /// XORs every free module with the mask 0 pattern `(row + col) % 2 == 0`.
    pub fn apply_mask(&mut self) {
        for row in 0..SIZE {
            for col in 0..SIZE {
                if is_function_module(row, col) {
                    continue;
                }
                self.modules[row][col] ^= (row + col) % 2 == 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned() -> QrCode {
        let mut qr = QrCode::blank();
        qr.draw_function_patterns();
        qr.draw_format_bits();
        qr
    }

    #[test]
    fn test_format_word() {
        assert_eq!(FormatWord::FIXED.value(), 0x541A);
        assert!(FormatWord::FIXED.bit(14));
        assert!(!FormatWord::FIXED.bit(0));
    }

    #[test]
    fn test_function_region_size() {
        let reserved = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| is_function_module(r, c))
            .count();
        assert_eq!(reserved, 233);
        assert_eq!(SIZE * SIZE - reserved, TOTAL_BITS);
    }

    #[test]
    fn test_finder_patterns() {
        let qr = patterned();
        for &(top, left) in &FINDER_ORIGINS {
            let top = top as i32;
            let left = left as i32;
            assert!(qr.get_module(top, left));
            assert!(qr.get_module(top + 6, left + 6));
            assert!(!qr.get_module(top + 1, left + 1));
            assert!(!qr.get_module(top + 5, left + 3));
            assert!(qr.get_module(top + 2, left + 2));
            assert!(qr.get_module(top + 3, left + 3));
            assert!(qr.get_module(top + 4, left + 4));
        }
    }

    #[test]
    fn test_separators_are_light() {
        let qr = patterned();
        for i in 0..8 {
            assert!(!qr.get_module(7, i));
            assert!(!qr.get_module(i, 7));
            assert!(!qr.get_module(7, 20 - i));
            assert!(!qr.get_module(i, 13));
            assert!(!qr.get_module(20 - i, 7));
            assert!(!qr.get_module(13, i));
        }
    }

    #[test]
    fn test_timing_and_dark_module() {
        let mut qr = QrCode::blank();
        qr.draw_function_patterns();
        for i in 8..13 {
            assert_eq!(qr.get_module(6, i), i % 2 == 0);
            assert_eq!(qr.get_module(i, 6), i % 2 == 0);
        }
        assert!(qr.get_module(13, 8));
    }

    #[test]
    fn test_format_bits_overwrite_dark_module() {
        let qr = patterned();
        let bits = FormatWord::FIXED;
        assert_eq!(qr.get_module(13, 8), bits.bit(9));
        assert_eq!(qr.get_module(14, 8), bits.bit(8));
        assert!(!qr.get_module(13, 8));
        assert!(!qr.get_module(14, 8));

        let encoded = QrCode::encode_text("HI").unwrap();
        assert!(!encoded.get_module(13, 8));
    }

    #[test]
    fn test_format_bits_layout() {
        let qr = patterned();
        let bits = FormatWord::FIXED;
        assert_eq!(qr.get_module(8, 8), bits.bit(14));
        assert_eq!(qr.get_module(8, 7), bits.bit(8));
        assert_eq!(qr.get_module(7, 8), bits.bit(8));
        for i in 1..6 {
            assert_eq!(qr.get_module(8, 8 + i), bits.bit(14 - i as usize));
        }
        for i in 1..7 {
            assert_eq!(qr.get_module(8 + i, 8), bits.bit(14 - i as usize));
        }
    }

    #[test]
    fn test_zigzag_order() {
        let mut qr = QrCode::blank();
        let mut bb = BitBuffer::new();
        bb.append_bits(0b11101, 5);
        qr.draw_codewords(&bb);
        assert!(qr.get_module(20, 20));
        assert!(qr.get_module(20, 19));
        assert!(qr.get_module(19, 20));
        assert!(!qr.get_module(19, 19));
        assert!(qr.get_module(18, 20));
        assert!(!qr.get_module(18, 19));
    }

    #[test]
    fn test_timing_column_pair_is_skipped() {
        let mut qr = QrCode::blank();
        let mut bb = BitBuffer::new();
        for _ in 0..TOTAL_BITS / 8 {
            bb.append_bits(0xFF, 8);
        }
        qr.draw_codewords(&bb);
        for row in 9..13 {
            assert!(!qr.get_module(row, 5));
            assert!(qr.get_module(row, 4));
            assert!(qr.get_module(row, 0));
        }
    }

    #[test]
    fn test_get_module_out_of_range() {
        let qr = QrCode::encode_text("HI").unwrap();
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, 21));
    }

    #[test]
    fn test_invalid_utf8() {
        let result = QrCode::encode_utf8(&[0x48, 0xFF]);
        assert!(matches!(result, Err(QrError::InvalidInput(_))));
        assert_eq!(QrCode::encode_utf8(b"HI"), QrCode::encode_text("HI"));
    }
}
