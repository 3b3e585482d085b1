//! Fixed width bit containers.
//!
//! Navigation message fields are addressed by bit offset from the start of the message, MSB
//! first, which is how the BDS ICD tabulates them. [BitBlock] keeps that addressing so the
//! layout tables in the decoder can be written exactly as documented.
use std::fmt;
use std::ops::{BitXor, Shl};
use std::str::FromStr;

use bitvec::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Widest [BitBlock] supported.
pub const MAX_BITS: usize = 320;
const WORDS: usize = MAX_BITS / 64;

type Storage = BitArray<[u64; WORDS], Msb0>;

/// An `N`-bit ordered sequence with the most significant bit at logical index 0.
///
/// The width is part of the type, so a block can never be resized. Sub-ranges are extracted
/// with [BitBlock::slice], which also fixes the width of the result at compile time.
///
/// # Example
/// ```
/// use beidou::BitBlock;
///
/// let block: BitBlock<11> = "11100010010".parse().unwrap();
/// assert_eq!(block.to_unsigned(), 1810);
/// assert_eq!(block.slice::<3>(0).to_unsigned(), 0b111);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBlock<const N: usize> {
    // Bits at index >= N are always zero.
    bits: Storage,
}

impl<const N: usize> BitBlock<N> {
    const VALID_WIDTH: () = assert!(N > 0 && N <= MAX_BITS, "unsupported BitBlock width");

    /// Width in bits.
    pub const LEN: usize = N;

    /// A block with every bit cleared.
    #[must_use]
    pub fn zeroed() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_WIDTH;
        BitBlock {
            bits: Storage::ZERO,
        }
    }

    /// Construct from the low `N` bits of `value`.
    ///
    /// # Panics
    /// If `N` is wider than 64 bits.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        assert!(N <= 64, "from_u64 requires a block of at most 64 bits");
        let mut block = Self::zeroed();
        block.bits[..N].store_be(value);
        block
    }

    /// Construct from bytes, MSB first. Bits past `N` in the last byte are ignored.
    ///
    /// # Errors
    /// [Error::NotEnoughData] if `dat` holds fewer than `N` bits.
    pub fn from_bytes(dat: &[u8]) -> Result<Self> {
        let minimum = (N + 7) / 8;
        if dat.len() < minimum {
            return Err(Error::NotEnoughData {
                actual: dat.len(),
                minimum,
            });
        }
        let mut block = Self::zeroed();
        block.bits[..N].clone_from_bitslice(&dat.view_bits::<Msb0>()[..N]);
        Ok(block)
    }

    /// Width in bits.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        N
    }

    /// # Panics
    /// If `idx` is not less than `N`.
    #[must_use]
    pub fn get(&self, idx: usize) -> bool {
        assert!(idx < N, "bit index {idx} out of range for {N}-bit block");
        self.bits[idx]
    }

    /// # Panics
    /// If `idx` is not less than `N`.
    pub fn set(&mut self, idx: usize, value: bool) {
        assert!(idx < N, "bit index {idx} out of range for {N}-bit block");
        self.bits.set(idx, value);
    }

    /// Extract bits `[start, start + L)` as a new block.
    ///
    /// # Panics
    /// If the range extends past `N`. Field offsets come from static layout tables so this is
    /// a programming error, not a data error.
    ///
    /// A zero width slice is rejected at compile time:
    /// ```compile_fail
    /// use beidou::BitBlock;
    ///
    /// let block = BitBlock::<30>::zeroed();
    /// let _ = block.slice::<0>(0);
    /// ```
    #[must_use]
    pub fn slice<const L: usize>(&self, start: usize) -> BitBlock<L> {
        assert!(
            L > 0 && start + L <= N,
            "slice [{start}, {}) out of range for {N}-bit block",
            start + L
        );
        let mut out = BitBlock::<L>::zeroed();
        out.bits[..L].copy_from_bitslice(&self.bits[start..start + L]);
        out
    }

    /// Overwrite bits `[start, start + L)` with `block`.
    ///
    /// # Panics
    /// If the range extends past `N`.
    pub fn insert<const L: usize>(&mut self, start: usize, block: &BitBlock<L>) {
        assert!(
            start + L <= N,
            "insert [{start}, {}) out of range for {N}-bit block",
            start + L
        );
        self.bits[start..start + L].copy_from_bitslice(&block.bits[..L]);
    }

    /// Shift toward index 0 by `n` bits, filling vacated low-order bits with 0.
    #[must_use]
    pub fn shift_left(&self, n: usize) -> Self {
        if n >= N {
            return Self::zeroed();
        }
        let mut out = *self;
        out.bits[..N].shift_left(n);
        out
    }

    /// Interpret the block as an unsigned integer, MSB first.
    ///
    /// # Panics
    /// If `N` is wider than 64 bits.
    #[must_use]
    pub fn to_unsigned(&self) -> u64 {
        assert!(N <= 64, "to_unsigned requires a block of at most 64 bits");
        self.bits[..N].load_be::<u64>()
    }

    /// Interpret the block as a two's complement integer.
    ///
    /// # Panics
    /// If `N` is wider than 64 bits.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_signed(&self) -> i64 {
        let raw = self.to_unsigned();
        let extension = if self.get(0) {
            u64::MAX.checked_shl(N as u32).unwrap_or(0)
        } else {
            0
        };
        (raw | extension) as i64
    }

    /// Two's complement value scaled by `2^exponent`, as used for the ICD fixed-point fields.
    ///
    /// # Panics
    /// If `N` is wider than 64 bits.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_scaled_float(&self, exponent: i32) -> f64 {
        self.to_signed() as f64 * 2f64.powi(exponent)
    }

    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }
}

impl<const N: usize> Default for BitBlock<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> BitXor for BitBlock<N> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        let mut words = self.bits.into_inner();
        for (word, other) in words.iter_mut().zip(rhs.bits.into_inner()) {
            *word ^= other;
        }
        BitBlock {
            bits: Storage::new(words),
        }
    }
}

impl<const N: usize> Shl<usize> for BitBlock<N> {
    type Output = Self;

    fn shl(self, n: usize) -> Self {
        self.shift_left(n)
    }
}

impl<const N: usize> fmt::Display for BitBlock<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits[..N].iter().by_vals() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for BitBlock<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBlock<{N}>({self})")
    }
}

/// Parses a string of `0` and `1` characters. Underscores may be used as separators.
impl<const N: usize> FromStr for BitBlock<N> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut block = Self::zeroed();
        let mut idx = 0;
        for c in s.chars().filter(|c| *c != '_') {
            let value = match c {
                '0' => false,
                '1' => true,
                _ => return Err(Error::InvalidBitString(format!("unexpected character {c:?}"))),
            };
            if idx >= N {
                return Err(Error::InvalidBitString(format!("more than {N} bits")));
            }
            block.set(idx, value);
            idx += 1;
        }
        if idx != N {
            return Err(Error::InvalidBitString(format!(
                "expected {N} bits, got {idx}"
            )));
        }
        Ok(block)
    }
}

impl<const N: usize> Serialize for BitBlock<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const N: usize> Deserialize<'de> for BitBlock<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
