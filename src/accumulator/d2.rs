use tracing::{debug, trace, warn};

use super::{slot_index, AddOutcome, BatchKind, Dataset, FrameSlots, SubframeBatch, SLOTS};
use crate::Subframe;

/// Subframes required per slot for a complete dataset. Only slots 0 and 4 are stored.
const FRAME_SIZES: [usize; SLOTS] = [10, 6, 6, 6, 120];
const EPHEMERIS_SLOTS: [usize; 1] = [0];
const ALMANAC_SLOTS: [usize; 1] = [4];

/// Accumulation state for the D2 (GEO) message structure.
///
/// Five subframes make up a 3 second frame and all carry the SOW of the frame's first
/// subframe. Ephemeris is 10 pages of frame 1, almanac is 120 pages of frame 5. Frames 2 to 4
/// carry integrity data which is not kept; they are still checked for timing.
#[derive(Debug, Clone, Default)]
pub struct D2State {
    slots: FrameSlots,
    last_sow: u32,
}

impl D2State {
    /// Seconds between consecutive frame 1 subframes.
    pub const FRAME_SECONDS: u32 = 3;

    pub fn add(&mut self, subframe: Subframe) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        let sow = subframe.seconds_of_week();
        let frame_id = subframe.frame_id();
        let page = subframe.page_num();

        if self.last_sow != 0 {
            let expected = if frame_id == 1 {
                self.last_sow + Self::FRAME_SECONDS
            } else {
                self.last_sow
            };
            if sow != expected {
                warn!(expected, sow, frame_id, "D2 timing mismatch; discarding partial datasets");
                self.clear_ephemeris();
                self.clear_almanac();
                outcome.discarded = true;
            }
        }
        self.last_sow = sow;

        if (2..=4).contains(&frame_id) {
            return outcome;
        }

        if let Some(dataset) = Self::starts_dataset(frame_id, page) {
            self.restart(dataset);
        }

        trace!(frame_id, page, sow, "D2 subframe stored");
        self.slots.push(slot_index(frame_id), subframe);
        outcome.stored = true;
        outcome
    }

    /// Dataset whose first subframe has this frame id and page.
    fn starts_dataset(frame_id: u32, page: u32) -> Option<Dataset> {
        match (frame_id, page) {
            (1, 1) => Some(Dataset::Ephemeris),
            (5, 1) => Some(Dataset::Almanac),
            _ => None,
        }
    }

    fn restart(&mut self, dataset: Dataset) {
        match dataset {
            Dataset::Ephemeris if self.slots.any(&EPHEMERIS_SLOTS) => {
                debug!("new D2 ephemeris; dropping partial");
                self.clear_ephemeris();
            }
            Dataset::Almanac if self.slots.any(&ALMANAC_SLOTS) => {
                debug!("new D2 almanac; dropping partial");
                self.clear_almanac();
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn is_ephemeris_complete(&self) -> bool {
        self.slots.len(0) == FRAME_SIZES[0]
    }

    #[must_use]
    pub fn is_almanac_complete(&self) -> bool {
        self.slots.len(4) == FRAME_SIZES[4]
    }

    pub fn flush_ephemeris(&mut self) -> SubframeBatch {
        SubframeBatch {
            kind: BatchKind::EphemerisD2,
            frames: self.slots.take(&EPHEMERIS_SLOTS),
        }
    }

    pub fn flush_almanac(&mut self) -> SubframeBatch {
        SubframeBatch {
            kind: BatchKind::AlmanacD2,
            frames: self.slots.take(&ALMANAC_SLOTS),
        }
    }

    pub fn clear_ephemeris(&mut self) {
        self.slots.clear(&EPHEMERIS_SLOTS);
    }

    pub fn clear_almanac(&mut self) {
        self.slots.clear(&ALMANAC_SLOTS);
    }

    #[must_use]
    pub fn has_incomplete_data(&self) -> bool {
        self.slots.has_data()
    }

    #[must_use]
    pub fn last_sow(&self) -> u32 {
        self.last_sow
    }

    /// # Panics
    /// If `frame_id` is not in `1..=5`.
    #[must_use]
    pub fn slot_len(&self, frame_id: u32) -> usize {
        self.slots.len(slot_index(frame_id))
    }
}
