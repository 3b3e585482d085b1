//! Message stream decoding.
//!
//! Ties the decode stages together: each [RawMessage] is decoded into a [Subframe], routed
//! to its satellite's accumulator, and every dataset that completes is provided as a
//! [DecodedBatch].
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::accumulator::SubframeBatch;
use crate::{
    AccumulatorRegistry, MessageBits, Result, SatelliteId, SignalType, SubframeDecoder, Summary,
};

/// One navigation message as produced by an input adapter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub satellite: SatelliteId,
    /// Transport time tag.
    pub time_of_week: u32,
    pub bits: MessageBits,
    pub signal: SignalType,
}

/// A [SubframeBatch] with the satellite it was collected for.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBatch {
    pub satellite: SatelliteId,
    pub batch: SubframeBatch,
}

/// Decodes a sequence of [RawMessage]s into completed datasets.
///
/// # Example
/// ```
/// use beidou::{BatchDecoder, RawMessage, SignalType, SubframeDecoder};
///
/// let messages: Vec<RawMessage> = vec![];
/// let batches = BatchDecoder::builder()
///     .decoder(SubframeDecoder::builder().strict_preamble(true).build())
///     .signal(SignalType::B1)
///     .build()
///     .decode(messages)
///     .filter_map(Result::ok);
/// assert_eq!(batches.count(), 0);
/// ```
#[derive(TypedBuilder, Debug, Clone)]
pub struct BatchDecoder {
    #[builder(default)]
    decoder: SubframeDecoder,
    /// Only messages on this signal are decoded; others are skipped.
    #[builder(default = SignalType::B1)]
    signal: SignalType,
}

impl Default for BatchDecoder {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BatchDecoder {
    /// Returns an iterator that decodes `messages` in order.
    ///
    /// Rejected messages are provided as `Err` and decoding continues with the next message,
    /// so the caller decides whether to skip or stop.
    pub fn decode<I>(self, messages: I) -> BatchIter<I::IntoIter>
    where
        I: IntoIterator<Item = RawMessage>,
    {
        BatchIter {
            messages: messages.into_iter(),
            decoder: self.decoder,
            signal: self.signal,
            registry: AccumulatorRegistry::new(),
            ready: VecDeque::new(),
            summary: Summary::default(),
            done: false,
        }
    }
}

/// Decode `messages` with the default [BatchDecoder].
pub fn decode_batches<I>(messages: I) -> BatchIter<I::IntoIter>
where
    I: IntoIterator<Item = RawMessage>,
{
    BatchDecoder::default().decode(messages)
}

/// Provides [DecodedBatch]es based on configuration provided by the parent [BatchDecoder].
pub struct BatchIter<I>
where
    I: Iterator<Item = RawMessage>,
{
    messages: I,
    decoder: SubframeDecoder,
    signal: SignalType,
    registry: AccumulatorRegistry,
    // Batches completed but not yet provided.
    ready: VecDeque<DecodedBatch>,
    summary: Summary,
    done: bool,
}

impl<I> BatchIter<I>
where
    I: Iterator<Item = RawMessage>,
{
    /// Statistics for the messages consumed so far.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Accumulator state, e.g., to inspect partial datasets once the iterator is exhausted.
    pub fn registry(&self) -> &AccumulatorRegistry {
        &self.registry
    }

    fn finish(&mut self) {
        self.done = true;
        let leftover = self.registry.incomplete_satellites();
        if !leftover.is_empty() {
            let sats: Vec<String> = leftover.iter().map(ToString::to_string).collect();
            debug!(satellites = %sats.join(","), "partial datasets remain at end of stream");
        }
    }
}

impl<I> Iterator for BatchIter<I>
where
    I: Iterator<Item = RawMessage>,
{
    type Item = Result<DecodedBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(batch) = self.ready.pop_front() {
                return Some(Ok(batch));
            }
            if self.done {
                return None;
            }

            let Some(msg) = self.messages.next() else {
                self.finish();
                return None;
            };
            let sat = msg.satellite;

            if msg.signal != self.signal {
                debug!(prn = sat.prn(), signal = ?msg.signal, "skipping message");
                self.summary.add_skipped();
                continue;
            }

            let subframe = match self.decoder.decode(sat, msg.time_of_week, msg.bits) {
                Ok(subframe) => subframe,
                Err(err) => {
                    debug!(
                        prn = sat.prn(),
                        time_of_week = msg.time_of_week,
                        error = %err,
                        "rejected message"
                    );
                    self.summary.add_rejected(sat);
                    return Some(Err(err));
                }
            };

            let outcome = self.registry.add_subframe(sat, subframe.clone());
            self.summary.add_subframe(sat, &subframe, &outcome);

            for batch in self.registry.take_complete(sat) {
                trace!(prn = sat.prn(), kind = ?batch.kind, "dataset complete");
                self.summary.add_batch(sat, &batch);
                self.ready.push_back(DecodedBatch {
                    satellite: sat,
                    batch,
                });
            }
        }
    }
}
