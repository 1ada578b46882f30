//! Immutable observation records.

use um_core::{GeoPoint, SegmentId, StopId, TransportMode, TripId};

/// One completed street segment.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelExperience {
    pub segment_id:          SegmentId,
    pub length_m:            f64,
    pub travel_time_secs:    f64,
    pub cost:                f64,
    pub mode:                TransportMode,
    /// Entry and exit time, ms since the Unix epoch.
    pub start_ms:            i64,
    pub end_ms:              i64,
    /// Motor vehicles on the segment when it was left.
    pub vehicles_on_segment: u32,
    /// Passengers / capacity for transit vehicles, otherwise 0.
    pub fill_level:          f64,
    pub trip_id:             Option<TripId>,
}

/// One dwell of a transit vehicle at a stop.
#[derive(Clone, Debug, PartialEq)]
pub struct StopExperience {
    pub stop_id:      StopId,
    pub position:     GeoPoint,
    pub passengers:   u32,
    pub arrival_ms:   i64,
    pub departure_ms: i64,
    pub trip_id:      TripId,
    /// Departure minus scheduled departure, seconds.
    pub delay_secs:   f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Experience {
    Travel(TravelExperience),
    Stop(StopExperience),
}

impl From<TravelExperience> for Experience {
    fn from(e: TravelExperience) -> Self {
        Experience::Travel(e)
    }
}

impl From<StopExperience> for Experience {
    fn from(e: StopExperience) -> Self {
        Experience::Stop(e)
    }
}
