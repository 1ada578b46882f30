//! Planner results: itineraries made of legs.

use chrono::NaiveDateTime;

use um_core::{GeoPoint, RequestId, StopId, TransportMode, TripId};
use um_world::{SegmentPath, path_length_m};

use crate::JourneyRequest;

/// How an itinerary was produced.  Taxi and experimental alternatives do
/// not contribute to the preference bounds during ranking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ItineraryKind {
    #[default]
    Regular,
    Taxi,
    Experimental,
}

/// One single-mode part of an itinerary.
#[derive(Clone, Debug)]
pub struct Leg {
    pub mode:          TransportMode,
    pub from:          GeoPoint,
    pub to:            GeoPoint,
    pub start_time:    NaiveDateTime,
    /// Planner estimate, seconds.  Adjusted by knowledge prediction.
    pub duration_secs: f64,
    pub distance_m:    f64,
    pub segments:      SegmentPath,

    /// Timetabled trip served on this leg, if any.
    pub trip_id:     Option<TripId>,
    pub board_stop:  Option<StopId>,
    pub alight_stop: Option<StopId>,
}

impl Leg {
    /// A leg along `segments`.  `distance_m` is the path length.
    pub fn new(
        mode:          TransportMode,
        from:          GeoPoint,
        to:            GeoPoint,
        start_time:    NaiveDateTime,
        duration_secs: f64,
        segments:      SegmentPath,
    ) -> Self {
        Self {
            mode,
            from,
            to,
            start_time,
            duration_secs,
            distance_m: path_length_m(&segments),
            segments,
            trip_id: None,
            board_stop: None,
            alight_stop: None,
        }
    }

    /// Attach the timetabled trip and the stops the rider uses.
    pub fn with_trip(mut self, trip: TripId, board: StopId, alight: StopId) -> Self {
        self.trip_id = Some(trip);
        self.board_stop = Some(board);
        self.alight_stop = Some(alight);
        self
    }

    #[inline]
    pub fn is_transit(&self) -> bool {
        self.mode.is_scheduled_transit() || self.mode == TransportMode::FlexiBus
    }
}

/// A candidate journey returned by a planner.
#[derive(Clone, Debug)]
pub struct Itinerary {
    pub req_id:          RequestId,
    pub req_number:      u32,
    pub from:            GeoPoint,
    pub to:              GeoPoint,
    pub start_time:      NaiveDateTime,
    pub legs:            Vec<Leg>,
    pub duration_secs:   f64,
    pub cost:            f64,
    pub walk_distance_m: f64,
    pub transfers:       u32,
    /// Expected occupancy of the transit vehicles used, `0.0..=1.0`.
    pub fill_level:      f64,
    pub kind:            ItineraryKind,
}

impl Itinerary {
    /// Assemble an itinerary answering `request`.  Duration, walk distance
    /// and transfer count are derived from the legs.
    pub fn new(request: &JourneyRequest, legs: Vec<Leg>, cost: f64, kind: ItineraryKind) -> Self {
        let duration_secs = legs.iter().map(|l| l.duration_secs).sum();
        let walk_distance_m = legs
            .iter()
            .filter(|l| l.mode == TransportMode::Walk)
            .map(|l| l.distance_m)
            .sum();
        let transfers = (legs.iter().filter(|l| l.is_transit()).count() as u32).saturating_sub(1);
        Self {
            req_id: request.req_id,
            req_number: request.req_number,
            from: request.from,
            to: request.to,
            start_time: request.departure,
            legs,
            duration_secs,
            cost,
            walk_distance_m,
            transfers,
            fill_level: 0.0,
            kind,
        }
    }

    /// `true` when following this itinerary means driving one's own car.
    pub fn uses_private_car(&self) -> bool {
        self.kind != ItineraryKind::Taxi && self.legs.iter().any(|l| l.mode == TransportMode::Car)
    }

    /// Taxi and experimental alternatives do not shape preference bounds.
    #[inline]
    pub fn excluded_from_bounds(&self) -> bool {
        matches!(self.kind, ItineraryKind::Taxi | ItineraryKind::Experimental)
    }
}
