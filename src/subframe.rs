//! Subframe decoding.
//!
//! A B1 navigation message is 300 bits: ten 30-bit words. Word one carries the preamble,
//! frame id and the high bits of the seconds of week, word two the low bits of the seconds of
//! week and, depending on the message structure, the page number.
use serde::{Deserialize, Serialize};
use tracing::{debug, span, warn, Level};
use typed_builder::TypedBuilder;

use crate::integrity::ErrorCorrectedWord;
use crate::{BitBlock, Error, MessageType, Result, SatelliteId};

/// 11-bit frame synchronization preamble, `11100010010`.
pub const PREAMBLE: u32 = 0b111_0001_0010;
/// Bits in one navigation message.
pub const MESSAGE_BITS: usize = 300;
/// Bits in one navigation message word.
pub const WORD_BITS: usize = 30;
/// Words in one navigation message.
pub const WORDS_PER_MESSAGE: usize = MESSAGE_BITS / WORD_BITS;
pub const SECONDS_PER_WEEK: u32 = 604_800;

/// Raw navigation message bits.
pub type MessageBits = BitBlock<MESSAGE_BITS>;

// Field offsets, in bits from the start of the message.
const PREAMBLE_AT: usize = 0;
const WORD_ONE_CHECKED_AT: usize = 15;
const FRAME_ID_AT: usize = 15;
const SOW_HIGH_AT: usize = 18;
const SOW_LOW_AT: usize = 30;
const SOW_LOW_BITS: u32 = 12;

/// A decoded navigation message.
///
/// Constructed by [SubframeDecoder] and immutable afterwards. Two subframes are equal when
/// they have the same transport time and the same raw bits.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "EncodedSubframe")]
pub struct Subframe {
    message_type: MessageType,
    raw_bits: MessageBits,
    time_of_week: u32,
    seconds_of_week: u32,
    frame_id: u32,
    page_num: u32,
    parity_fixed_count: u32,
}

impl Subframe {
    /// Decode with a default [SubframeDecoder].
    ///
    /// # Errors
    /// See [SubframeDecoder::decode_message].
    pub fn decode(message_type: MessageType, time_of_week: u32, bits: MessageBits) -> Result<Self> {
        SubframeDecoder::default().decode_message(message_type, time_of_week, bits)
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// The message bits exactly as received; word one correction is not applied here.
    #[must_use]
    pub fn bits(&self) -> &MessageBits {
        &self.raw_bits
    }

    /// Transport time tag supplied with the message.
    #[must_use]
    pub fn time_of_week(&self) -> u32 {
        self.time_of_week
    }

    /// SOW decoded from the message, `0..604800`.
    #[must_use]
    pub fn seconds_of_week(&self) -> u32 {
        self.seconds_of_week
    }

    /// Frame id, `1..=5`.
    #[must_use]
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Page number, or 0 where the frame has no page number.
    #[must_use]
    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    /// Number of 15-bit codewords corrected during decode.
    #[must_use]
    pub fn parity_fixed_count(&self) -> u32 {
        self.parity_fixed_count
    }

    #[must_use]
    pub fn has_preamble(&self) -> bool {
        read_preamble(&self.raw_bits) == PREAMBLE
    }

    /// Word `idx` (0-based) of the message.
    ///
    /// # Panics
    /// If `idx` is not less than [WORDS_PER_MESSAGE].
    #[must_use]
    pub fn word(&self, idx: usize) -> BitBlock<WORD_BITS> {
        assert!(idx < WORDS_PER_MESSAGE, "word index {idx} out of range");
        self.raw_bits.slice::<WORD_BITS>(idx * WORD_BITS)
    }
}

// Deserialized subframes are decoded again from their raw bits so the field range checks
// always apply.
#[derive(Deserialize)]
struct EncodedSubframe {
    message_type: MessageType,
    raw_bits: MessageBits,
    time_of_week: u32,
}

impl TryFrom<EncodedSubframe> for Subframe {
    type Error = Error;

    fn try_from(encoded: EncodedSubframe) -> Result<Self> {
        Subframe::decode(encoded.message_type, encoded.time_of_week, encoded.raw_bits)
    }
}

impl PartialEq for Subframe {
    fn eq(&self, other: &Self) -> bool {
        self.time_of_week == other.time_of_week && self.raw_bits == other.raw_bits
    }
}

impl Eq for Subframe {}

/// Decodes raw navigation messages into [Subframe]s.
///
/// # Example
/// ```
/// use beidou::{MessageBits, SatelliteId, SubframeDecoder};
///
/// let decoder = SubframeDecoder::builder().strict_preamble(true).build();
/// let sat = SatelliteId::new(7).unwrap();
/// // all zero bits have no preamble
/// assert!(decoder.decode(sat, 0, MessageBits::zeroed()).is_err());
/// ```
#[derive(TypedBuilder, Debug, Clone, Default)]
pub struct SubframeDecoder {
    /// Reject messages with a bad preamble rather than only warning.
    #[builder(default)]
    strict_preamble: bool,
}

impl SubframeDecoder {
    /// Decode a message received from `sat`, using the message structure of its satellite
    /// class.
    ///
    /// # Errors
    /// See [SubframeDecoder::decode_message].
    pub fn decode(&self, sat: SatelliteId, time_of_week: u32, bits: MessageBits) -> Result<Subframe> {
        let span = span!(Level::TRACE, "subframe", prn = sat.prn());
        let _guard = span.enter();
        self.decode_message(sat.message_type(), time_of_week, bits)
    }

    /// Decode a message with the given structure.
    ///
    /// A bad preamble is only a warning unless `strict_preamble` is set. Word one is BCH
    /// checked and any correction is counted, but fields are read from the bits as received.
    /// Words two through ten are not parity checked.
    ///
    /// # Errors
    /// [Error::FrameId], [Error::SecondsOfWeek] or [Error::PageNum] if a field is out of
    /// range, [Error::Preamble] for a bad preamble in strict mode.
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode_message(
        &self,
        message_type: MessageType,
        time_of_week: u32,
        bits: MessageBits,
    ) -> Result<Subframe> {
        let preamble = read_preamble(&bits);
        if preamble != PREAMBLE {
            if self.strict_preamble {
                return Err(Error::Preamble(preamble));
            }
            warn!(preamble, time_of_week, "preamble mismatch; decoding anyway");
        }

        let mut parity_fixed_count = 0;
        let word_one = ErrorCorrectedWord::new(bits.slice::<15>(WORD_ONE_CHECKED_AT));
        if word_one.is_modified() {
            debug!(time_of_week, "word one corrected");
            parity_fixed_count += word_one.num_corrected() as u32;
        }

        let frame_id = bits.slice::<3>(FRAME_ID_AT).to_unsigned() as u32;
        if !(1..=5).contains(&frame_id) {
            return Err(Error::FrameId(frame_id));
        }

        let seconds_of_week = ((bits.slice::<8>(SOW_HIGH_AT).to_unsigned() << SOW_LOW_BITS)
            | bits.slice::<12>(SOW_LOW_AT).to_unsigned()) as u32;
        if seconds_of_week >= SECONDS_PER_WEEK {
            return Err(Error::SecondsOfWeek(seconds_of_week));
        }

        let page_num = read_page_num(message_type, frame_id, &bits)?;

        Ok(Subframe {
            message_type,
            raw_bits: bits,
            time_of_week,
            seconds_of_week,
            frame_id,
            page_num,
            parity_fixed_count,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_preamble(bits: &MessageBits) -> u32 {
    bits.slice::<11>(PREAMBLE_AT).to_unsigned() as u32
}

/// Page number field for the message structure and frame id, validated against its range.
#[allow(clippy::cast_possible_truncation)]
fn read_page_num(message_type: MessageType, frame_id: u32, bits: &MessageBits) -> Result<u32> {
    let (page, max) = match (message_type, frame_id) {
        (MessageType::D1, 4 | 5) => (bits.slice::<7>(43).to_unsigned(), 24),
        (MessageType::D2, 1) => (bits.slice::<4>(42).to_unsigned(), 10),
        (MessageType::D2, 2) => (bits.slice::<4>(43).to_unsigned(), 6),
        (MessageType::D2, 5) => (bits.slice::<7>(43).to_unsigned(), 120),
        // D1 ephemeris frames and D2 integrity frames have no page number
        _ => return Ok(0),
    };
    let page = page as u32;
    if (1..=max).contains(&page) {
        Ok(page)
    } else {
        Err(Error::PageNum {
            frame_id,
            page,
            max,
        })
    }
}
