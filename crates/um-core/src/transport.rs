//! Transportation modes shared across the workspace.
//!
//! The numeric [`encoding`](TransportMode::encoding) is stable: knowledge
//! stores persist it, so variants must never be renumbered.

use std::str::FromStr;

use crate::CoreError;

/// A means of transportation used in journey requests, itinerary legs and
/// travel experiences.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportMode {
    Walk,
    Car,
    Bus,
    Rail,
    CableCar,
    Bicycle,
    /// Any scheduled public transport; planners expand it to concrete modes.
    Transit,
    /// On-demand flexible bus.
    FlexiBus,
}

impl TransportMode {
    pub const ALL: [TransportMode; 8] = [
        TransportMode::Walk,
        TransportMode::Car,
        TransportMode::Bus,
        TransportMode::Rail,
        TransportMode::CableCar,
        TransportMode::Bicycle,
        TransportMode::Transit,
        TransportMode::FlexiBus,
    ];

    /// Stable numeric code.
    pub fn encoding(self) -> u8 {
        match self {
            TransportMode::Walk     => 0,
            TransportMode::Car      => 1,
            TransportMode::Bus      => 2,
            TransportMode::Rail     => 3,
            TransportMode::CableCar => 4,
            TransportMode::Bicycle  => 5,
            TransportMode::Transit  => 6,
            TransportMode::FlexiBus => 7,
        }
    }

    pub fn from_encoding(code: u8) -> Option<TransportMode> {
        TransportMode::ALL.into_iter().find(|m| m.encoding() == code)
    }

    /// `true` for timetabled modes served by an agency fleet.
    #[inline]
    pub fn is_scheduled_transit(self) -> bool {
        matches!(
            self,
            TransportMode::Bus | TransportMode::Rail | TransportMode::CableCar | TransportMode::Transit
        )
    }

    /// Label used in CSV output and planner queries.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Walk     => "WALK",
            TransportMode::Car      => "CAR",
            TransportMode::Bus      => "BUS",
            TransportMode::Rail     => "RAIL",
            TransportMode::CableCar => "CABLE_CAR",
            TransportMode::Bicycle  => "BICYCLE",
            TransportMode::Transit  => "TRANSIT",
            TransportMode::FlexiBus => "FLEXIBUS",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = CoreError;

    /// Case-insensitive; unknown names are a configuration error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransportMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownMode(s.to_owned()))
    }
}
