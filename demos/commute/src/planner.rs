//! A timetable-aware planner for the corridor.
//!
//! Street legs follow the corridor between the snapped end nodes; the bus
//! leg boards the first line-3 trip that serves both stops in the right
//! order after the requested departure.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use um_core::{GeoPoint, NodeId, TransportMode};
use um_planner::{Itinerary, ItineraryKind, JourneyRequest, Leg, Planner, PlannerError, PlannerResult};
use um_transit::Trip;
use um_world::{SegmentPath, StreetMap, path_length_m};

const CAR_COST_PER_M:  f64 = 0.00025;
const TAXI_BASE_FARE:  f64 = 3.0;
const TAXI_COST_PER_M: f64 = 0.0004;
const BUS_FARE:        f64 = 1.2;

/// Ranking and walking to the stop take a few ticks; never offer a bus
/// that leaves sooner than this.
const BOARDING_MARGIN_SECS: i64 = 180;

/// Longest walk offered as a whole journey, metres.
const MAX_WALK_M: f64 = 2_500.0;

pub struct CorridorPlanner {
    map:   Arc<StreetMap>,
    trips: Vec<Arc<Trip>>,
}

impl CorridorPlanner {
    pub fn new(map: Arc<StreetMap>, trips: Vec<Arc<Trip>>) -> Self {
        Self { map, trips }
    }

    /// Segments between the nodes nearest to `from` and `to`.
    fn street_path(&self, from: GeoPoint, to: GeoPoint) -> PlannerResult<SegmentPath> {
        let snap = |p| self.map.snap_to_node(p).ok_or_else(|| PlannerError::Unavailable("empty street map".into()));
        let (a, b) = (snap(from)?.0, snap(to)?.0);
        let nodes: Vec<NodeId> = if a <= b {
            (a..=b).map(NodeId).collect()
        } else {
            (b..=a).rev().map(NodeId).collect()
        };
        self.map
            .path_through(&nodes)
            .map_err(|e| PlannerError::Unavailable(e.to_string()))
    }

    fn car(&self, req: &JourneyRequest) -> PlannerResult<Itinerary> {
        let path = self.street_path(req.from, req.to)?;
        let secs: f64 = path.iter().map(|s| s.length_m / s.driving_speed()).sum();
        let len = path_length_m(&path);
        let (cost, kind) = if req.is_taxi {
            (TAXI_BASE_FARE + len * TAXI_COST_PER_M, ItineraryKind::Taxi)
        } else {
            (len * CAR_COST_PER_M, ItineraryKind::Regular)
        };
        let leg = Leg::new(TransportMode::Car, req.from, req.to, req.departure, secs, path);
        Ok(Itinerary::new(req, vec![leg], cost, kind))
    }

    fn walk(&self, req: &JourneyRequest) -> PlannerResult<Option<Itinerary>> {
        let path = self.street_path(req.from, req.to)?;
        if path_length_m(&path) > MAX_WALK_M {
            return Ok(None);
        }
        let secs: f64 = path.iter().map(|s| s.length_m / s.walking_speed()).sum();
        let leg = Leg::new(TransportMode::Walk, req.from, req.to, req.departure, secs, path);
        Ok(Some(Itinerary::new(req, vec![leg], 0.0, ItineraryKind::Regular)))
    }

    fn bus(&self, req: &JourneyRequest) -> Option<Itinerary> {
        let date = req.departure.date();
        let earliest = (req.departure + Duration::seconds(BOARDING_MARGIN_SECS)).time();
        let (trip, board, alight) = self
            .trips
            .iter()
            .filter(|t| t.is_valid_on(date))
            .filter_map(|t| {
                let board = nearest_stop(t, req.from)?;
                let alight = nearest_stop(t, req.to)?;
                (board < alight && t.stop_times[board] >= earliest).then_some((t, board, alight))
            })
            .min_by_key(|(t, board, _)| t.stop_times[*board])?;

        let departs = date.and_time(trip.stop_times[board]);
        let arrives = date.and_time(trip.stop_times[alight]);
        let segments: SegmentPath = trip.traces[board..alight].iter().flatten().cloned().collect();
        let ride = Leg::new(
            TransportMode::Bus,
            trip.stops[board].position,
            trip.stops[alight].position,
            departs,
            seconds_between(departs, arrives),
            segments,
        )
        .with_trip(trip.id.clone(), trip.stops[board].id.clone(), trip.stops[alight].id.clone());

        let mut legs = Vec::with_capacity(2);
        let wait = seconds_between(req.departure, departs);
        if wait > 0.0 {
            // Standing at the stop counts towards the journey time.
            legs.push(Leg::new(TransportMode::Walk, req.from, ride.from, req.departure, wait, Vec::new()));
        }
        legs.push(ride);
        Some(Itinerary::new(req, legs, BUS_FARE, ItineraryKind::Regular))
    }
}

impl Planner for CorridorPlanner {
    fn request_single_journey(
        &self,
        request: &JourneyRequest,
        out:     &mut Vec<Itinerary>,
    ) -> PlannerResult<Option<usize>> {
        let found = if request.allows(TransportMode::Car) {
            Some(self.car(request)?)
        } else if request.allows(TransportMode::Transit) || request.allows(TransportMode::Bus) {
            self.bus(request)
        } else if request.allows(TransportMode::Walk) {
            self.walk(request)?
        } else {
            None
        };
        Ok(found.map(|it| {
            out.push(it);
            1
        }))
    }
}

/// Index of the trip stop within 50 m of `pos`.
fn nearest_stop(trip: &Trip, pos: GeoPoint) -> Option<usize> {
    trip.stops.iter().position(|s| s.position.distance_m(pos) < 50.0)
}

fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds().max(0) as f64
}

