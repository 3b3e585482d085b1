use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::accumulator::{AddOutcome, BatchKind, SubframeBatch};
use crate::{SatelliteId, Subframe};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteSummary {
    pub subframes: usize,
    pub rejected: usize,
    pub preamble_mismatches: usize,
    pub parity_fixed: usize,
    pub discarded: usize,
    pub page_discontinuities: usize,
    pub batches: usize,
}

/// Tracks stats on message decoding.
///
/// # Example
/// ```
/// use beidou::{SatelliteId, Summary};
///
/// let mut summary = Summary::default();
/// summary.add_rejected(SatelliteId::new(9).unwrap());
/// summary.add_skipped();
/// assert_eq!(summary.messages, 2);
/// assert_eq!(summary.satellites.len(), 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Every message seen, including skipped and rejected ones.
    pub messages: usize,
    /// Messages on a signal other than the one being decoded.
    pub skipped: usize,
    pub subframes: usize,
    pub rejected: usize,
    pub preamble_mismatches: usize,
    pub parity_fixed: usize,
    /// Number of times in-progress data was discarded for a timing violation.
    pub discarded: usize,
    pub page_discontinuities: usize,
    pub batches: BTreeMap<BatchKind, usize>,
    pub satellites: BTreeMap<SatelliteId, SatelliteSummary>,
}

impl Summary {
    pub fn add_skipped(&mut self) {
        self.messages += 1;
        self.skipped += 1;
    }

    pub fn add_rejected(&mut self, sat: SatelliteId) {
        self.messages += 1;
        self.rejected += 1;
        self.satellites.entry(sat).or_default().rejected += 1;
    }

    pub fn add_subframe(&mut self, sat: SatelliteId, subframe: &Subframe, outcome: &AddOutcome) {
        self.messages += 1;
        self.subframes += 1;
        let sat = self.satellites.entry(sat).or_default();
        sat.subframes += 1;

        if !subframe.has_preamble() {
            self.preamble_mismatches += 1;
            sat.preamble_mismatches += 1;
        }
        let fixed = subframe.parity_fixed_count() as usize;
        self.parity_fixed += fixed;
        sat.parity_fixed += fixed;
        if outcome.discarded {
            self.discarded += 1;
            sat.discarded += 1;
        }
        if outcome.page_discontinuity {
            self.page_discontinuities += 1;
            sat.page_discontinuities += 1;
        }
    }

    pub fn add_batch(&mut self, sat: SatelliteId, batch: &SubframeBatch) {
        *self.batches.entry(batch.kind).or_default() += 1;
        self.satellites.entry(sat).or_default().batches += 1;
    }

    /// Total batches of all kinds.
    #[must_use]
    pub fn total_batches(&self) -> usize {
        self.batches.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subframe::fixtures::subframe;
    use crate::MessageType;

    #[test]
    fn summary() {
        let c07 = SatelliteId::new(7).unwrap();
        let c01 = SatelliteId::new(1).unwrap();
        let mut summary = Summary::default();

        let sf = subframe(MessageType::D1, 1, 600, 0);
        summary.add_subframe(
            c07,
            &sf,
            &AddOutcome {
                discarded: true,
                page_discontinuity: false,
                stored: true,
            },
        );
        summary.add_rejected(c01);
        summary.add_skipped();
        summary.add_batch(
            c07,
            &SubframeBatch {
                kind: BatchKind::EphemerisD1,
                frames: vec![vec![sf]],
            },
        );

        assert_eq!(summary.messages, 3);
        assert_eq!(summary.subframes, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.preamble_mismatches, 0);
        assert_eq!(summary.total_batches(), 1);
        assert_eq!(summary.batches[&BatchKind::EphemerisD1], 1);
        assert_eq!(summary.satellites[&c07].subframes, 1);
        assert_eq!(summary.satellites[&c07].batches, 1);
        assert_eq!(summary.satellites[&c01].rejected, 1);
    }

    #[test]
    fn json_round_trip() {
        let mut summary = Summary::default();
        let sat = SatelliteId::new(12).unwrap();
        summary.add_rejected(sat);
        summary.batches.insert(BatchKind::AlmanacD2, 2);

        let json = serde_json::to_string(&summary).unwrap();
        let back: Summary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
