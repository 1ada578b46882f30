//! Agency and vehicle activities that run timetabled service.
//!
//! An agency runs [`StartNextTrips`] forever.  Each trip due now gets a
//! vehicle from the fleet, and the vehicle is handed a [`PrepareTrip`]
//! through an [`Effect`].  `PrepareTrip` expands into the whole run:
//!
//! ```text
//! PickUpAndWait(s0) → DriveToNextStop(t0) → PickUpAndWait(s1) → … → ReturnToAgency → Learn
//! ```

use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};

use um_agent::EntityKind;
use um_core::TransportMode;
use um_knowledge::{Experience, StopExperience};
use um_transit::{Stop, Trip, WaitingVehicle, agency_ensemble_name};

use crate::{Activity, ActivityCtx, Effect, FlowError, FlowResult, Learn, MoveMode, Movement};

// ── StartNextTrips ────────────────────────────────────────────────────────────

/// Dispatch vehicles to every trip departing this minute.  Never finishes.
#[derive(Debug, Default)]
pub struct StartNextTrips {
    /// Minute last scanned; short ticks must not dispatch a trip twice.
    last_minute: Option<NaiveDateTime>,
}

impl StartNextTrips {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn execute(&mut self, _dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        let now = ctx.now();
        let minute = now.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now);
        if self.last_minute == Some(minute) {
            return Ok(0.0);
        }
        if self.last_minute.is_none() {
            let name = ctx.entity.agency_mut()?.ensemble_name();
            ctx.sim.ensembles.create(&name, ctx.entity.id);
        }
        self.last_minute = Some(minute);

        let agency = ctx.entity.agency_mut()?;
        let mut assigned = Vec::new();
        for trip in agency.trips_to_schedule(now) {
            let vehicle = agency.schedule_trip(&trip)?;
            assigned.push((vehicle, trip));
        }
        for (target, trip) in assigned {
            ctx.effect(Effect::Assign { target, activity: Activity::PrepareTrip(PrepareTrip::new(trip)) });
        }
        Ok(0.0)
    }
}

// ── PrepareTrip ───────────────────────────────────────────────────────────────

/// Set a vehicle up for `trip` and queue the run.
#[derive(Debug)]
pub struct PrepareTrip {
    pub trip: Arc<Trip>,
    finished: bool,
}

impl PrepareTrip {
    pub fn new(trip: Arc<Trip>) -> Self {
        Self { trip, finished: false }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Departure datetimes of the trip's stops when expanded at `now`.
    /// A stop time earlier than its predecessor belongs to the next day.
    pub fn schedule(&self, now: NaiveDateTime) -> Vec<NaiveDateTime> {
        let mut day = now.date();
        let mut prev: Option<NaiveDateTime> = None;
        self.trip
            .stop_times
            .iter()
            .map(|&t| {
                let mut at = day.and_time(t);
                if prev.is_some_and(|p| at < p) {
                    day = day.succ_opt().unwrap_or(day);
                    at = day.and_time(t);
                }
                prev = Some(at);
                at
            })
            .collect()
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        self.trip.validate()?;

        let mode = match ctx.entity.kind {
            EntityKind::Train => TransportMode::Rail,
            _ => TransportMode::Bus,
        };
        let id = ctx.entity.id;
        let vehicle = ctx.entity.vehicle_mut()?;
        vehicle.current_trip = Some(Arc::clone(&self.trip));
        vehicle.delay_secs = 0.0;
        ctx.sim.ensembles.join(&agency_ensemble_name(&vehicle.fleet.agency_id), id);
        ctx.sim.ensembles.create(self.trip.id.as_str(), id);

        let times = self.schedule(ctx.now());
        let mut stops = self.trip.stops.iter().zip(times);
        if let Some((stop, at)) = stops.next() {
            ctx.follow_up(Activity::PickUpAndWait(PickUpAndWait::new(Arc::clone(stop), at)));
        }
        for ((stop, at), trace) in stops.zip(&self.trip.traces) {
            let drive = Movement::new(MoveMode::DriveToNextStop { mode }, trace.clone());
            ctx.follow_up(Activity::Move(drive));
            ctx.follow_up(Activity::PickUpAndWait(PickUpAndWait::new(Arc::clone(stop), at)));
        }
        ctx.follow_up(Activity::ReturnToAgency(ReturnToAgency::new()));
        ctx.follow_up(Activity::Learn(Learn::new()));

        log::trace!("{id}: prepared trip {} with {} stops", self.trip.id, self.trip.stops.len());
        self.finished = true;
        Ok(dt)
    }
}

// ── PickUpAndWait ─────────────────────────────────────────────────────────────

/// Park at a stop, let riders off and on, and leave once the scheduled
/// departure has passed.
#[derive(Debug)]
pub struct PickUpAndWait {
    pub stop:      Arc<Stop>,
    pub scheduled: NaiveDateTime,
    arrived_ms: Option<i64>,
    finished:   bool,
}

impl PickUpAndWait {
    pub fn new(stop: Arc<Stop>, scheduled: NaiveDateTime) -> Self {
        Self { stop, scheduled, arrived_ms: None, finished: false }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn arrive(&mut self, ctx: &mut ActivityCtx<'_>) -> FlowResult<()> {
        let id = ctx.entity.id;
        let now_ms = ctx.now_ms();
        let pos = self.stop.position;
        ctx.entity.position = pos;

        let vehicle = ctx.entity.vehicle_mut()?;
        let trip = vehicle.current_trip.as_ref().ok_or(FlowError::NoCurrentTrip(id))?;
        vehicle.current_stop = Some(Arc::clone(&self.stop));
        vehicle.cabin.set_position(pos);

        let off = vehicle.cabin.alight_at(&self.stop.id);
        if !off.is_empty() {
            log::debug!("{id}: {} rider(s) alighted at {}", off.len(), self.stop.id);
        }
        self.stop.add_waiting_vehicle(WaitingVehicle {
            vehicle: id,
            trip:    trip.id.clone(),
            cabin:   Arc::clone(&vehicle.cabin),
        });
        self.arrived_ms = Some(now_ms);
        Ok(())
    }

    pub(crate) fn execute(&mut self, _dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        let Some(arrived_ms) = self.arrived_ms else {
            self.arrive(ctx)?;
            return Ok(0.0);
        };

        let now = ctx.now();
        if now <= self.scheduled {
            return Ok(0.0);
        }

        let id = ctx.entity.id;
        let departure_ms = ctx.now_ms();
        let delay_secs = (now - self.scheduled).num_milliseconds() as f64 / 1000.0;
        self.stop.remove_waiting_vehicle(id);

        let vehicle = ctx.entity.vehicle_mut()?;
        vehicle.current_stop = None;
        vehicle.delay_secs = delay_secs;
        let trip_id = vehicle.current_trip.as_ref().map(|t| t.id.clone()).ok_or(FlowError::NoCurrentTrip(id))?;
        let experience = StopExperience {
            stop_id: self.stop.id.clone(),
            position: self.stop.position,
            passengers: vehicle.cabin.passenger_count() as u32,
            arrival_ms: arrived_ms,
            departure_ms,
            trip_id,
            delay_secs,
        };
        ctx.entity.knowledge.collect(Experience::Stop(experience));
        self.finished = true;
        Ok(0.0)
    }
}

// ── ReturnToAgency ────────────────────────────────────────────────────────────

/// Hand the vehicle back to its fleet after the last stop.
#[derive(Debug, Default)]
pub struct ReturnToAgency {
    finished: bool,
}

impl ReturnToAgency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        let id = ctx.entity.id;
        let vehicle = ctx.entity.vehicle_mut()?;
        let trip = vehicle.current_trip.take().ok_or(FlowError::NoCurrentTrip(id))?;
        vehicle.current_stop = None;
        let left_on_board = vehicle.cabin.alight_all();
        if !left_on_board.is_empty() {
            log::debug!("{id}: {} riders let off at the end of trip {}", left_on_board.len(), trip.id);
        }
        vehicle.fleet.finish_trip(&trip.id, id)?;

        ctx.sim.ensembles.leave(&agency_ensemble_name(&vehicle.fleet.agency_id), id);
        ctx.sim.ensembles.destroy(trip.id.as_str());
        log::trace!("{id}: finished trip {}", trip.id);
        self.finished = true;
        Ok(dt)
    }
}

