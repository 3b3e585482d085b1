//! BCH(15,11,1) with generator polynomial `g(x) = x^4 + x + 1`.
//!
//! A codeword is 15 bits held in the low bits of a `u16`: 11 information bits (bits 14..4)
//! followed by 4 parity bits (bits 3..0). Bit 14 is transmitted first.
//!
//! # Example
//! ```
//! use beidou::integrity::bch;
//!
//! let codeword = bch::encode(0b011_0101_0100);
//! assert_eq!(bch::decode(codeword), 0);
//!
//! let damaged = codeword ^ (1 << 9);
//! assert_eq!(bch::correct(damaged), (codeword, true));
//! ```

/// Total codeword bits.
pub const CODEWORD_BITS: u32 = 15;
/// Information bits per codeword.
pub const INFO_BITS: u32 = 11;
/// Parity bits per codeword.
pub const PARITY_BITS: u32 = 4;

const CODEWORD_MASK: u16 = (1 << CODEWORD_BITS) - 1;
const INFO_MASK: u16 = (1 << INFO_BITS) - 1;

// Feedback taps for g(x) below the x^4 term.
const FEEDBACK: u8 = 0b0011;

// Error pattern for each syndrome; entry `s` is the single-bit error `x^p` where
// `x^p mod g(x) == s`.
const CORRECTION_TABLE: [u16; 16] = [
    0x0000, 0x0001, 0x0002, 0x0010, 0x0004, 0x0100, 0x0020, 0x0400, 0x0008, 0x4000, 0x0200,
    0x0080, 0x0040, 0x2000, 0x0800, 0x1000,
];

/// Clock `bits` bits of `value`, MSB first, through the 4 stage division register starting
/// from `reg`.
fn divide(mut reg: u8, value: u16, bits: u32) -> u8 {
    for idx in (0..bits).rev() {
        let bit = u8::from((value >> idx) & 1 == 1);
        let feedback = (reg >> 3) & 1;
        reg = ((reg << 1) & 0xf) | bit;
        if feedback == 1 {
            reg ^= FEEDBACK;
        }
    }
    reg
}

/// Syndrome of a 15-bit codeword. 0 means no error was detected, anything else is the key
/// for [correction_mask].
#[must_use]
pub fn decode(codeword: u16) -> u8 {
    divide(0, codeword & CODEWORD_MASK, CODEWORD_BITS)
}

/// Error pattern to XOR with a codeword that produced `syndrome`.
///
/// # Panics
/// If `syndrome` is not a 4-bit value.
#[must_use]
pub fn correction_mask(syndrome: u8) -> u16 {
    CORRECTION_TABLE[usize::from(syndrome)]
}

/// Encode 11 information bits into a 15-bit codeword. Bits of `info` above the low 11 are
/// ignored.
#[must_use]
pub fn encode(info: u16) -> u16 {
    let shifted = (info & INFO_MASK) << PARITY_BITS;
    shifted | u16::from(divide(0, shifted, CODEWORD_BITS))
}

/// Correct up to one bit error, returning the codeword and whether it was modified.
///
/// Two or more errors may be "corrected" to a different valid codeword; that is a property
/// of the code.
#[must_use]
pub fn correct(codeword: u16) -> (u16, bool) {
    let codeword = codeword & CODEWORD_MASK;
    let syndrome = decode(codeword);
    if syndrome == 0 {
        (codeword, false)
    } else {
        (codeword ^ correction_mask(syndrome), true)
    }
}
