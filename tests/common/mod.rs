#![allow(dead_code)]

use beidou::integrity::ErrorCorrectedWord;
use beidou::subframe::PREAMBLE;
use beidou::{BitBlock, MessageBits, RawMessage, SatelliteId, SignalType};

/// Word one, bits 15..30, is one BCH codeword.
pub const WORD_ONE_CHECKED: std::ops::Range<usize> = 15..30;
/// Parity bits of the word one codeword.
pub const WORD_ONE_PARITY: std::ops::Range<usize> = 26..30;

/// Build the bits for a message with a valid preamble and word one parity.
pub fn message_bits(sat: SatelliteId, frame_id: u32, sow: u32, page: u32) -> MessageBits {
    let mut bits = MessageBits::zeroed();
    bits.insert(0, &BitBlock::<11>::from_u64(u64::from(PREAMBLE)));
    bits.insert(15, &BitBlock::<3>::from_u64(u64::from(frame_id)));
    bits.insert(18, &BitBlock::<8>::from_u64(u64::from(sow >> 12)));
    bits.insert(30, &BitBlock::<12>::from_u64(u64::from(sow)));
    match (sat.is_geo(), frame_id) {
        (false, 4 | 5) | (true, 5) => {
            bits.insert(43, &BitBlock::<7>::from_u64(u64::from(page)));
        }
        (true, 1) => bits.insert(42, &BitBlock::<4>::from_u64(u64::from(page))),
        (true, 2) => bits.insert(43, &BitBlock::<4>::from_u64(u64::from(page))),
        _ => {}
    }
    let word_one = ErrorCorrectedWord::<15>::with_parity(bits.slice::<15>(15));
    bits.insert(15, &word_one);
    bits
}

pub fn message(prn: u32, frame_id: u32, sow: u32, page: u32) -> RawMessage {
    let satellite = SatelliteId::new(prn).unwrap();
    RawMessage {
        satellite,
        time_of_week: sow,
        bits: message_bits(satellite, frame_id, sow, page),
        signal: SignalType::B1,
    }
}

/// D1 messages for `pages` consecutive 30 second frames of subframes 1 to 5, starting at
/// page 1. Pages wrap after 24, starting the next almanac.
pub fn d1_stream(prn: u32, start_sow: u32, pages: u32) -> Vec<RawMessage> {
    let mut sow = start_sow;
    let mut messages = Vec::new();
    for idx in 0..pages {
        let page = idx % 24 + 1;
        for frame_id in 1..=5 {
            let page = if frame_id > 3 { page } else { 0 };
            messages.push(message(prn, frame_id, sow, page));
            sow += 6;
        }
    }
    messages
}

/// D2 messages for `frames` consecutive 3 second frames, each subframes 1 to 5 sharing one
/// SOW, starting at page 1 of every paged frame.
pub fn d2_stream(prn: u32, start_sow: u32, frames: u32) -> Vec<RawMessage> {
    let mut messages = Vec::new();
    for idx in 0..frames {
        let sow = start_sow + 3 * idx;
        messages.push(message(prn, 1, sow, idx % 10 + 1));
        messages.push(message(prn, 2, sow, idx % 6 + 1));
        messages.push(message(prn, 3, sow, 0));
        messages.push(message(prn, 4, sow, 0));
        messages.push(message(prn, 5, sow, idx % 120 + 1));
    }
    messages
}
