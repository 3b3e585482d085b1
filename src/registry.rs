use std::collections::HashMap;

use tracing::trace;

use crate::accumulator::{Accumulator, AddOutcome, SubframeBatch};
use crate::{SatelliteId, Subframe};

/// Owns one [Accumulator] per satellite, created on the first subframe from that satellite
/// with the variant matching its message structure.
#[derive(Debug, Default)]
pub struct AccumulatorRegistry {
    accumulators: HashMap<SatelliteId, Accumulator>,
}

impl AccumulatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `subframe` to the accumulator for `sat`.
    pub fn add_subframe(&mut self, sat: SatelliteId, subframe: Subframe) -> AddOutcome {
        trace!(
            prn = sat.prn(),
            frame_id = subframe.frame_id(),
            page = subframe.page_num(),
            "routing subframe"
        );
        self.accumulators
            .entry(sat)
            .or_insert_with(|| Accumulator::for_satellite(sat))
            .add(subframe)
    }

    #[must_use]
    pub fn get(&self, sat: SatelliteId) -> Option<&Accumulator> {
        self.accumulators.get(&sat)
    }

    /// Flush every complete dataset for `sat`. Empty if the satellite has not been seen.
    pub fn take_complete(&mut self, sat: SatelliteId) -> Vec<SubframeBatch> {
        self.accumulators
            .get_mut(&sat)
            .map(Accumulator::take_complete)
            .unwrap_or_default()
    }

    /// True if any accumulator holds subframes not yet flushed.
    #[must_use]
    pub fn has_incomplete_data(&self) -> bool {
        self.accumulators.values().any(Accumulator::has_incomplete_data)
    }

    /// Satellites holding subframes not yet flushed, in PRN order.
    #[must_use]
    pub fn incomplete_satellites(&self) -> Vec<SatelliteId> {
        let mut sats: Vec<SatelliteId> = self
            .accumulators
            .iter()
            .filter(|(_, acc)| acc.has_incomplete_data())
            .map(|(sat, _)| *sat)
            .collect();
        sats.sort();
        sats
    }

    /// Number of satellites seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }
}
