//! Byte-mode data encoding.
//!
//! Turns text into the 152-bit data codeword stream of a version-1 symbol:
//! mode indicator, character count, payload bytes, terminator, byte alignment
//! and the alternating pad bytes.

use crate::error::QrError;
use crate::qrcode::{DATA_CAPACITY_BITS, TOTAL_BITS};

/// Mode indicator for byte mode.
pub const MODE_BYTE: u32 = 0b0100;

/// Width of the character count field in byte mode for version 1.
pub const CHAR_COUNT_BITS: u8 = 8;

const PAD_BYTES: [u32; 2] = [0xEC, 0x11];

/// An appendable sequence of bits, packed MSB-first into bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity(bits.div_ceil(8)),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 31` or `val` does not fit in `len` bits.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "Value out of range");
        for i in (0..len).rev() {
            let shift: u8 = 7 - ((self.length as u8) & 7);
            let bit: u8 = ((val >> i) as u8) & 1;
            if shift == 7 {
                self.data.push(bit << shift);
            } else {
                self.data[self.length >> 3] |= bit << shift;
            }
            self.length += 1;
        }
    }

    /// Appends whole bytes.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.append_bits(u32::from(b), 8);
        }
    }

    /// Returns the bit at `index`. Indices past the end read as `false`.
    pub fn get(&self, index: usize) -> bool {
        index < self.length && (self.data[index >> 3] >> (7 - (index & 7))) & 1 != 0
    }

    /// Iterates the bits in append order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(move |i| self.get(i))
    }

    /// The packed bytes. A trailing partial byte is zero-filled.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies the first `N` packed bytes into an array, zero-filling any shortfall.
    pub fn to_codewords<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        for (dst, src) in out.iter_mut().zip(&self.data) {
            *dst = *src;
        }
        out
    }
}

/// Number of data bits the content needs before terminator and padding.
pub fn required_bits(text: &str) -> usize {
    4 + usize::from(CHAR_COUNT_BITS) + text.chars().count().saturating_mul(8)
}

/// Encodes `text` in byte mode into exactly [`DATA_CAPACITY_BITS`] bits.
///
/// Each character contributes its code point truncated to the low 8 bits.
///
/// # Errors
///
/// Returns [`QrError::CapacityExceeded`] when the header plus payload does not
/// fit in the data budget. At most 17 characters fit.
///
/// # Example
///
/// ```rust
/// use qrsymbol::segment::encode_data;
///
/// let bits = encode_data("HI").unwrap();
/// assert_eq!(bits.len(), 152);
/// assert_eq!(&bits.as_bytes()[..3], &[0x40, 0x24, 0x84]);
/// ```
pub fn encode_data(text: &str) -> Result<BitBuffer, QrError> {
    let needed = required_bits(text);
    if needed > DATA_CAPACITY_BITS {
        return Err(QrError::CapacityExceeded {
            needed,
            capacity: DATA_CAPACITY_BITS,
        });
    }
    let numchars = text.chars().count() as u32;

    let mut bb = BitBuffer::with_capacity(TOTAL_BITS);
    bb.append_bits(MODE_BYTE, 4);
    bb.append_bits(numchars, CHAR_COUNT_BITS);
    for c in text.chars() {
        bb.append_bits(u32::from(c) & 0xFF, 8);
    }

    // Terminator, never past the capacity or the next byte boundary
    let numzerobits: usize = core::cmp::min(4, DATA_CAPACITY_BITS - bb.len()).min(8 - bb.len() % 8);
    bb.append_bits(0, numzerobits as u8);
    let numzerobits: usize = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    // Pad bytes alternate by position, 0xEC on every 16-bit boundary
    while bb.len() < DATA_CAPACITY_BITS {
        bb.append_bits(PAD_BYTES[(bb.len() / 8) % 2], 8);
    }
    debug_assert_eq!(bb.len(), DATA_CAPACITY_BITS);
    Ok(bb)
}
