#![doc = include_str!("../README.md")]

mod error;

pub mod accumulator;
pub mod bits;
pub mod integrity;
pub mod registry;
pub mod satellite;
pub mod stream;
pub mod subframe;
pub mod summary;

pub use accumulator::{Accumulator, AddOutcome, BatchKind, D1State, D2State, SubframeBatch};
pub use bits::BitBlock;
pub use error::{Error, Result};
pub use registry::AccumulatorRegistry;
pub use satellite::{MessageType, SatelliteId, SignalType};
pub use stream::{decode_batches, BatchDecoder, BatchIter, DecodedBatch, RawMessage};
pub use subframe::{MessageBits, Subframe, SubframeDecoder};
pub use summary::{SatelliteSummary, Summary};
