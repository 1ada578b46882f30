//! Routes and their weekday trip queues.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};

use um_core::{RouteId, TripId};

use crate::Trip;

/// A route's trips, bucketed by weekday (Monday = 0) in departure order.
///
/// Each bucket is a rotating queue: trips due now are popped from the head
/// and pushed back at the tail, so the head is always the next departure of
/// that weekday.
#[derive(Debug)]
pub struct Route {
    pub id: RouteId,
    days:   [VecDeque<Arc<Trip>>; 7],
    index:  HashMap<TripId, Arc<Trip>>,
}

impl Route {
    pub fn new(id: RouteId) -> Self {
        Self { id, days: Default::default(), index: HashMap::new() }
    }

    /// Append `trip` to the queue of `weekday` (0 = Monday).  Trips must be
    /// added in departure order.
    pub fn add_trip(&mut self, weekday: usize, trip: Arc<Trip>) {
        self.index.entry(trip.id.clone()).or_insert_with(|| Arc::clone(&trip));
        self.days[weekday % 7].push_back(trip);
    }

    pub fn trip(&self, id: &TripId) -> Option<&Arc<Trip>> {
        self.index.get(id)
    }

    pub fn trip_count(&self) -> usize {
        self.index.len()
    }

    /// Trips of today's bucket departing at `now`'s hour and minute that run
    /// on `now`'s date.  Every examined trip moves to the tail of the queue,
    /// valid or not; at most one full rotation happens per call.
    pub fn next_trips(&mut self, now: NaiveDateTime) -> Vec<Arc<Trip>> {
        let queue = &mut self.days[now.weekday().num_days_from_monday() as usize];
        let mut due = Vec::new();
        for _ in 0..queue.len() {
            let departs_now = queue
                .front()
                .and_then(|t| t.starting_time())
                .is_some_and(|t| t.hour() == now.hour() && t.minute() == now.minute());
            if !departs_now {
                break;
            }
            let Some(trip) = queue.pop_front() else { break };
            if trip.is_valid_on(now.date()) {
                due.push(Arc::clone(&trip));
            }
            queue.push_back(trip);
        }
        due
    }
}
