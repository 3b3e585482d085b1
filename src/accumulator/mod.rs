//! Per-satellite reassembly of subframes into ephemeris and almanac datasets.
//!
//! Subframes are buffered in five frame slots, one per frame id. Timing continuity is checked
//! on every add and any in-progress dataset is discarded when it breaks; partial data is never
//! merged with a later, non-contiguous dataset. When the first page of a dataset arrives while
//! any of its slots already hold data, the stale partial dataset is dropped and collection
//! restarts.
mod d1;
mod d2;

pub use d1::D1State;
pub use d2::D2State;

use serde::{Deserialize, Serialize};

use crate::{MessageType, SatelliteId, Subframe};

/// Number of frame slots, one per frame id.
pub const SLOTS: usize = 5;

/// Layout of a [SubframeBatch], telling consumers which ICD structure to apply.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BatchKind {
    /// Frames 1, 2 and 3 of a D1 message, one subframe each.
    EphemerisD1,
    /// Frames 4 and 5 of a D1 message, 24 pages each.
    AlmanacD1,
    /// Frame 1 of a D2 message, 10 pages.
    EphemerisD2,
    /// Frame 5 of a D2 message, 120 pages.
    AlmanacD2,
}

impl BatchKind {
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            BatchKind::EphemerisD1 | BatchKind::AlmanacD1 => MessageType::D1,
            BatchKind::EphemerisD2 | BatchKind::AlmanacD2 => MessageType::D2,
        }
    }

    #[must_use]
    pub fn is_ephemeris(&self) -> bool {
        matches!(self, BatchKind::EphemerisD1 | BatchKind::EphemerisD2)
    }
}

/// Subframes of one dataset, flushed from an [Accumulator].
///
/// `frames` holds one sequence per frame slot of the dataset, in frame id order, each in
/// arrival order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubframeBatch {
    pub kind: BatchKind,
    pub frames: Vec<Vec<Subframe>>,
}

impl SubframeBatch {
    /// Total number of subframes in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate all subframes in frame order.
    pub fn subframes(&self) -> impl Iterator<Item = &Subframe> {
        self.frames.iter().flatten()
    }
}

/// What happened when a subframe was added.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Timing continuity was broken and in-progress datasets were discarded.
    pub discarded: bool,
    /// The page number did not follow the previous page in its slot. The subframe is still
    /// stored.
    pub page_discontinuity: bool,
    /// The subframe was stored. D2 integrity frames are only used for timing.
    pub stored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dataset {
    Ephemeris,
    Almanac,
}

/// Frame slots, indexed by `frame_id - 1`.
#[derive(Debug, Clone, Default)]
struct FrameSlots {
    slots: [Vec<Subframe>; SLOTS],
}

impl FrameSlots {
    fn len(&self, idx: usize) -> usize {
        self.slots[idx].len()
    }

    fn last(&self, idx: usize) -> Option<&Subframe> {
        self.slots[idx].last()
    }

    fn push(&mut self, idx: usize, subframe: Subframe) {
        self.slots[idx].push(subframe);
    }

    fn clear(&mut self, idxs: &[usize]) {
        for idx in idxs {
            self.slots[*idx].clear();
        }
    }

    fn take(&mut self, idxs: &[usize]) -> Vec<Vec<Subframe>> {
        idxs.iter()
            .map(|idx| std::mem::take(&mut self.slots[*idx]))
            .collect()
    }

    fn any(&self, idxs: &[usize]) -> bool {
        idxs.iter().any(|idx| !self.slots[*idx].is_empty())
    }

    fn has_data(&self) -> bool {
        self.slots.iter().any(|s| !s.is_empty())
    }
}

/// Slot index for a frame id.
///
/// # Panics
/// If `frame_id` is not in `1..=5`; decoded subframes always are.
fn slot_index(frame_id: u32) -> usize {
    assert!((1..=5).contains(&frame_id), "invalid frame id {frame_id}");
    frame_id as usize - 1
}

/// Per-satellite subframe accumulator, one variant per message structure.
///
/// # Example
/// ```
/// use beidou::{Accumulator, MessageType};
///
/// let mut acc = Accumulator::new(MessageType::D1);
/// assert!(!acc.has_incomplete_data());
/// assert!(!acc.is_ephemeris_complete());
/// ```
#[derive(Debug, Clone)]
pub enum Accumulator {
    D1(D1State),
    D2(D2State),
}

impl Accumulator {
    #[must_use]
    pub fn new(message_type: MessageType) -> Self {
        match message_type {
            MessageType::D1 => Accumulator::D1(D1State::default()),
            MessageType::D2 => Accumulator::D2(D2State::default()),
        }
    }

    /// Accumulator for the message structure used by `sat`.
    #[must_use]
    pub fn for_satellite(sat: SatelliteId) -> Self {
        Self::new(sat.message_type())
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Accumulator::D1(_) => MessageType::D1,
            Accumulator::D2(_) => MessageType::D2,
        }
    }

    pub fn add(&mut self, subframe: Subframe) -> AddOutcome {
        match self {
            Accumulator::D1(state) => state.add(subframe),
            Accumulator::D2(state) => state.add(subframe),
        }
    }

    #[must_use]
    pub fn is_ephemeris_complete(&self) -> bool {
        match self {
            Accumulator::D1(state) => state.is_ephemeris_complete(),
            Accumulator::D2(state) => state.is_ephemeris_complete(),
        }
    }

    #[must_use]
    pub fn is_almanac_complete(&self) -> bool {
        match self {
            Accumulator::D1(state) => state.is_almanac_complete(),
            Accumulator::D2(state) => state.is_almanac_complete(),
        }
    }

    /// Package the ephemeris slots into a batch and clear them. Completeness is not checked.
    pub fn flush_ephemeris(&mut self) -> SubframeBatch {
        match self {
            Accumulator::D1(state) => state.flush_ephemeris(),
            Accumulator::D2(state) => state.flush_ephemeris(),
        }
    }

    /// Package the almanac slots into a batch and clear them. Completeness is not checked.
    pub fn flush_almanac(&mut self) -> SubframeBatch {
        match self {
            Accumulator::D1(state) => state.flush_almanac(),
            Accumulator::D2(state) => state.flush_almanac(),
        }
    }

    pub fn clear_ephemeris(&mut self) {
        match self {
            Accumulator::D1(state) => state.clear_ephemeris(),
            Accumulator::D2(state) => state.clear_ephemeris(),
        }
    }

    pub fn clear_almanac(&mut self) {
        match self {
            Accumulator::D1(state) => state.clear_almanac(),
            Accumulator::D2(state) => state.clear_almanac(),
        }
    }

    /// True if any slot holds subframes.
    #[must_use]
    pub fn has_incomplete_data(&self) -> bool {
        match self {
            Accumulator::D1(state) => state.has_incomplete_data(),
            Accumulator::D2(state) => state.has_incomplete_data(),
        }
    }

    /// SOW of the last subframe added, 0 if none.
    #[must_use]
    pub fn last_sow(&self) -> u32 {
        match self {
            Accumulator::D1(state) => state.last_sow(),
            Accumulator::D2(state) => state.last_sow(),
        }
    }

    /// Number of subframes buffered for `frame_id`.
    ///
    /// # Panics
    /// If `frame_id` is not in `1..=5`.
    #[must_use]
    pub fn slot_len(&self, frame_id: u32) -> usize {
        match self {
            Accumulator::D1(state) => state.slot_len(frame_id),
            Accumulator::D2(state) => state.slot_len(frame_id),
        }
    }

    /// Flush every complete dataset, ephemeris first.
    pub fn take_complete(&mut self) -> Vec<SubframeBatch> {
        let mut batches = Vec::new();
        if self.is_ephemeris_complete() {
            batches.push(self.flush_ephemeris());
        }
        if self.is_almanac_complete() {
            batches.push(self.flush_almanac());
        }
        batches
    }
}
