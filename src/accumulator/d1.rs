use tracing::{debug, trace, warn};

use super::{slot_index, AddOutcome, BatchKind, Dataset, FrameSlots, SubframeBatch, SLOTS};
use crate::Subframe;

/// Subframes required per slot for a complete dataset.
const FRAME_SIZES: [usize; SLOTS] = [1, 1, 1, 24, 24];
const EPHEMERIS_SLOTS: [usize; 3] = [0, 1, 2];
const ALMANAC_SLOTS: [usize; 2] = [3, 4];

/// Accumulation state for the D1 (non-GEO) message structure.
///
/// Subframes arrive every 6 seconds. Ephemeris is frames 1 to 3, almanac is 24 pages each
/// of frames 4 and 5.
#[derive(Debug, Clone, Default)]
pub struct D1State {
    slots: FrameSlots,
    last_sow: u32,
}

impl D1State {
    /// Seconds between consecutive subframes.
    pub const SUBFRAME_SECONDS: u32 = 6;

    pub fn add(&mut self, subframe: Subframe) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        let sow = subframe.seconds_of_week();
        let frame_id = subframe.frame_id();
        let page = subframe.page_num();
        let idx = slot_index(frame_id);

        if self.last_sow != 0 && sow != self.last_sow + Self::SUBFRAME_SECONDS {
            warn!(
                expected = self.last_sow + Self::SUBFRAME_SECONDS,
                sow, "D1 data gap; discarding partial datasets"
            );
            self.clear_ephemeris();
            self.clear_almanac();
            outcome.discarded = true;
        }
        self.last_sow = sow;

        if let Some(dataset) = Self::starts_dataset(frame_id, page) {
            self.restart(dataset);
        }

        if frame_id > 3 {
            if let Some(prev) = self.slots.last(idx) {
                if page != prev.page_num() + 1 {
                    warn!(
                        frame_id,
                        previous = prev.page_num(),
                        page,
                        "D1 page discontinuity"
                    );
                    outcome.page_discontinuity = true;
                }
            }
        }

        trace!(frame_id, page, sow, "D1 subframe stored");
        self.slots.push(idx, subframe);
        outcome.stored = true;
        outcome
    }

    /// Dataset whose first subframe has this frame id and page.
    fn starts_dataset(frame_id: u32, page: u32) -> Option<Dataset> {
        match (frame_id, page) {
            (1, 0) => Some(Dataset::Ephemeris),
            (4, 1) => Some(Dataset::Almanac),
            _ => None,
        }
    }

    // Drop a stale partial dataset when its first subframe arrives again.
    fn restart(&mut self, dataset: Dataset) {
        match dataset {
            Dataset::Ephemeris if self.slots.any(&EPHEMERIS_SLOTS) => {
                debug!("new D1 ephemeris; dropping partial");
                self.clear_ephemeris();
            }
            Dataset::Almanac if self.slots.any(&ALMANAC_SLOTS) => {
                debug!("new D1 almanac; dropping partial");
                self.clear_almanac();
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn is_ephemeris_complete(&self) -> bool {
        EPHEMERIS_SLOTS
            .iter()
            .all(|idx| self.slots.len(*idx) == FRAME_SIZES[*idx])
    }

    #[must_use]
    pub fn is_almanac_complete(&self) -> bool {
        ALMANAC_SLOTS
            .iter()
            .all(|idx| self.slots.len(*idx) == FRAME_SIZES[*idx])
    }

    pub fn flush_ephemeris(&mut self) -> SubframeBatch {
        SubframeBatch {
            kind: BatchKind::EphemerisD1,
            frames: self.slots.take(&EPHEMERIS_SLOTS),
        }
    }

    pub fn flush_almanac(&mut self) -> SubframeBatch {
        SubframeBatch {
            kind: BatchKind::AlmanacD1,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subframe::fixtures::subframe;
    use crate::MessageType;

    fn d1(frame_id: u32, sow: u32, page: u32) -> Subframe {
        subframe(MessageType::D1, frame_id, sow, page)
    }

    /// Feed a full almanac, frames 4 and 5 alternating, starting at `sow`.
    fn feed_almanac(state: &mut D1State, mut sow: u32) -> u32 {
        for page in 1..=24 {
            for frame_id in [4, 5] {
                assert!(!state.add(d1(frame_id, sow, page)).discarded);
                sow += 6;
            }
        }
        sow
    }

    #[test]
    fn ephemeris_completes() {
        let mut state = D1State::default();
        state.add(d1(1, 600, 0));
        state.add(d1(2, 606, 0));
        assert!(!state.is_ephemeris_complete());
        state.add(d1(3, 612, 0));
        assert!(state.is_ephemeris_complete());
        assert!(!state.is_almanac_complete());

        let batch = state.flush_ephemeris();
        assert_eq!(batch.kind, BatchKind::EphemerisD1);
        assert_eq!(batch.frames.len(), 3);
        assert!(batch.frames.iter().all(|f| f.len() == 1));
        assert!(!state.has_incomplete_data());
        assert_eq!(state.last_sow(), 612);
    }

    #[test]
    fn almanac_completes() {
        let mut state = D1State::default();
        feed_almanac(&mut state, 1200);
        assert!(state.is_almanac_complete());
        assert!(!state.is_ephemeris_complete());

        let batch = state.flush_almanac();
        assert_eq!(batch.kind, BatchKind::AlmanacD1);
        assert_eq!(batch.frames.len(), 2);
        assert_eq!(batch.frames[0].len(), 24);
        assert_eq!(batch.frames[1].len(), 24);
        let pages: Vec<u32> = batch.frames[1].iter().map(Subframe::page_num).collect();
        assert_eq!(pages, (1..=24).collect::<Vec<_>>());
        assert!(!state.has_incomplete_data());
    }

    #[test]
    fn gap_discards_partial_ephemeris() {
        let mut state = D1State::default();
        state.add(d1(1, 600, 0));
        state.add(d1(2, 606, 0));

        let outcome = state.add(d1(3, 618, 0));
        assert!(outcome.discarded);
        assert!(outcome.stored);
        assert_eq!(state.slot_len(1), 0);
        assert_eq!(state.slot_len(2), 0);
        assert_eq!(state.slot_len(3), 1);
        assert!(state.has_incomplete_data());
        assert!(!state.is_ephemeris_complete());
    }

    #[test]
    fn gap_discards_partial_almanac() {
        let mut state = D1State::default();
        state.add(d1(4, 600, 1));
        state.add(d1(5, 606, 1));
        state.add(d1(1, 700, 0));
        assert_eq!(state.slot_len(4), 0);
        assert_eq!(state.slot_len(5), 0);
        assert_eq!(state.slot_len(1), 1);
    }

    #[test]
    fn first_subframe_sets_last_sow_without_gap() {
        let mut state = D1State::default();
        let outcome = state.add(d1(2, 345_600, 0));
        assert!(!outcome.discarded);
        assert_eq!(state.last_sow(), 345_600);
    }

    #[test]
    fn new_ephemeris_restarts_collection() {
        let mut state = D1State::default();
        state.add(d1(1, 600, 0));
        state.add(d1(2, 606, 0));
        state.add(d1(4, 612, 3));
        state.add(d1(1, 618, 0));
        assert_eq!(state.slot_len(1), 1);
        assert_eq!(state.slot_len(2), 0);
        // almanac untouched
        assert_eq!(state.slot_len(4), 1);
    }

    #[test]
    fn new_almanac_restarts_collection() {
        let mut state = D1State::default();
        state.add(d1(4, 600, 1));
        state.add(d1(5, 606, 1));
        state.add(d1(4, 612, 1));
        assert_eq!(state.slot_len(4), 1);
        assert_eq!(state.slot_len(5), 0);
    }

    fn sows(batch: &SubframeBatch) -> Vec<u32> {
        batch.subframes().map(Subframe::seconds_of_week).collect()
    }

    #[test]
    fn stale_frame_three_is_not_merged_into_next_ephemeris() {
        let mut state = D1State::default();
        state.add(d1(1, 600, 0));
        // frame 2 lost, frame 3 arrives after a gap
        assert!(state.add(d1(3, 612, 0)).discarded);
        assert_eq!(state.slot_len(3), 1);

        state.add(d1(4, 618, 1));
        state.add(d1(5, 624, 1));
        state.add(d1(1, 630, 0));
        assert_eq!(state.slot_len(3), 0);
        state.add(d1(2, 636, 0));
        assert!(!state.is_ephemeris_complete());
        state.add(d1(3, 642, 0));
        assert!(state.is_ephemeris_complete());
        assert_eq!(sows(&state.flush_ephemeris()), vec![630, 636, 642]);
    }

    #[test]
    fn stale_frame_five_is_not_merged_into_next_almanac() {
        let mut state = D1State::default();
        state.add(d1(3, 600, 0));
        // frame 4 page 24 lost
        assert!(state.add(d1(5, 612, 24)).discarded);
        assert_eq!(state.slot_len(4), 0);
        assert_eq!(state.slot_len(5), 1);

        feed_almanac(&mut state, 618);
        assert!(state.is_almanac_complete());
        let batch = state.flush_almanac();
        assert_eq!(batch.frames[1].len(), 24);
        assert!(batch.subframes().all(|sf| sf.seconds_of_week() >= 618));
    }

    #[test]
    fn page_discontinuity_is_stored() {
        let mut state = D1State::default();
        state.add(d1(4, 600, 1));
        let outcome = state.add(d1(4, 606, 3));
        assert!(outcome.page_discontinuity);
        assert!(outcome.stored);
        assert!(!outcome.discarded);
        assert_eq!(state.slot_len(4), 2);
    }

    #[test]
    fn flush_does_not_check_completeness() {
        let mut state = D1State::default();
        state.add(d1(2, 600, 0));
        let batch = state.flush_ephemeris();
        assert_eq!(batch.len(), 1);
        assert!(batch.frames[0].is_empty());
        assert!(!state.has_incomplete_data());
    }

    #[test]
    fn full_cycle_yields_both_datasets() {
        let mut state = D1State::default();
        let mut sow = 6;
        for frame_id in 1..=3 {
            state.add(d1(frame_id, sow, 0));
            sow += 6;
        }
        assert!(state.is_ephemeris_complete());
        state.flush_ephemeris();
        feed_almanac(&mut state, sow);
        assert!(state.is_almanac_complete());
    }
}
