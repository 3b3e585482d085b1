//! BDS data error correction.
//!
//! Every navigation message word is protected by BCH(15,11,1) codes. Words wider than 15 bits
//! carry several interleaved codewords; see [ErrorCorrectedWord].
pub mod bch;
mod word;

pub use word::*;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Integrity {
    /// Data did not require correction.
    Ok,
    /// At least one codeword was corrected.
    Corrected,
}
