//! Timetabled trips.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use um_core::{RouteId, TripId};
use um_world::SegmentPath;

use crate::{Stop, TransitError, TransitResult};

/// One scheduled run of a route: the stops in order, the departure time at
/// each stop, and the street trace between consecutive stops.
///
/// A well-formed trip has `stops.len() == stop_times.len() == traces.len() + 1`.
/// Construction does not enforce this; [`validate`](Self::validate) does, and
/// is called before a vehicle is sent out.
#[derive(Debug)]
pub struct Trip {
    pub id:         TripId,
    pub route_id:   RouteId,
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
    /// Dates inside the window on which the trip does not run.
    pub exceptions: BTreeSet<NaiveDate>,
    pub stops:      Vec<Arc<Stop>>,
    pub stop_times: Vec<NaiveTime>,
    pub traces:     Vec<SegmentPath>,
}

impl Trip {
    /// A trip valid on every date.
    pub fn new(
        id:         TripId,
        route_id:   RouteId,
        stops:      Vec<Arc<Stop>>,
        stop_times: Vec<NaiveTime>,
        traces:     Vec<SegmentPath>,
    ) -> Self {
        Self {
            id,
            route_id,
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MAX,
            exceptions: BTreeSet::new(),
            stops,
            stop_times,
            traces,
        }
    }

    /// Restrict service to `start..=end`.
    pub fn with_validity(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_exception(mut self, date: NaiveDate) -> Self {
        self.exceptions.insert(date);
        self
    }

    /// Departure time at the first stop.
    pub fn starting_time(&self) -> Option<NaiveTime> {
        self.stop_times.first().copied()
    }

    /// `true` if the trip runs on `day`.
    pub fn is_valid_on(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date && !self.exceptions.contains(&day)
    }

    pub fn validate(&self) -> TransitResult<()> {
        let (s, t, r) = (self.stops.len(), self.stop_times.len(), self.traces.len());
        if s == 0 || s != t || s != r + 1 {
            return Err(TransitError::InconsistentTrip {
                trip:   self.id.clone(),
                detail: format!("{s} stops, {t} stop times, {r} traces"),
            });
        }
        Ok(())
    }
}
