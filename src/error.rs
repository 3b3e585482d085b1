#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Satellite PRN outside the BDS range.
    #[error("invalid BDS PRN {0}; expected 1..=37")]
    InvalidPrn(u32),

    #[error("frame id {0} out of range 1..=5")]
    FrameId(u32),

    #[error("page number {page} out of range 1..={max} for frame id {frame_id}")]
    PageNum { frame_id: u32, page: u32, max: u32 },

    #[error("seconds of week {0} out of range")]
    SecondsOfWeek(u32),

    /// Only produced when the decoder is configured with a strict preamble check.
    #[error("bad preamble {0:#013b}")]
    Preamble(u32),

    #[error("Not enough bytes")]
    NotEnoughData {
        /// Number of bytes we got
        actual: usize,
        /// Minimum number of expected bytes
        minimum: usize,
    },

    #[error("invalid bit string: {0}")]
    InvalidBitString(String),
}

pub type Result<T> = std::result::Result<T, Error>;
