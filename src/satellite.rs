use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// BDS navigation message structure.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// MEO/IGSO satellites; 6 second subframes.
    D1,
    /// GEO satellites; 0.6 second subframes sharing one SOW per 3 second frame.
    D2,
}

/// Signal a message was received on. Only B1 is decoded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    B1,
    B2,
}

/// BDS satellite PRN, valid in `1..=37`.
///
/// # Example
/// ```
/// use beidou::{MessageType, SatelliteId};
///
/// let sat = SatelliteId::new(3).unwrap();
/// assert!(sat.is_geo());
/// assert_eq!(sat.message_type(), MessageType::D2);
/// assert_eq!(sat.to_string(), "C03");
/// assert!(SatelliteId::new(38).is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub struct SatelliteId(u8);

impl SatelliteId {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 37;
    /// Highest GEO PRN. GEO satellites use the D2 message structure.
    pub const MAX_GEO: u32 = 5;

    /// # Errors
    /// [Error::InvalidPrn] if `prn` is 0 or greater than [Self::MAX].
    pub fn new(prn: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&prn) {
            #[allow(clippy::cast_possible_truncation)]
            Ok(SatelliteId(prn as u8))
        } else {
            Err(Error::InvalidPrn(prn))
        }
    }

    #[must_use]
    pub fn prn(&self) -> u32 {
        u32::from(self.0)
    }

    #[must_use]
    pub fn is_geo(&self) -> bool {
        self.prn() <= Self::MAX_GEO
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        if self.is_geo() {
            MessageType::D2
        } else {
            MessageType::D1
        }
    }
}

impl TryFrom<u32> for SatelliteId {
    type Error = Error;

    fn try_from(prn: u32) -> Result<Self> {
        SatelliteId::new(prn)
    }
}

impl From<SatelliteId> for u32 {
    fn from(sat: SatelliteId) -> u32 {
        sat.prn()
    }
}

impl Display for SatelliteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{:02}", self.0)
    }
}
