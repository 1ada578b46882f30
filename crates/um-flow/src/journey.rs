//! A person's journey: plan, rank, expand, arrive, learn.

use um_core::{GeoPoint, TransportMode};
use um_planner::{Itinerary, ItineraryKind, JourneyRequest, Preferences};

use crate::{Activity, ActivityCtx, FlowResult, MoveMode, Movement, RideTransit};

/// Preference bounds set at the start of every journey.
const JOURNEY_TMAX_SECS: f64 = 1500.0;
const JOURNEY_CMAX: f64 = 2.5;
const JOURNEY_WMAX_M: f64 = 1000.0;

// ── PlanJourney ───────────────────────────────────────────────────────────────

/// Ask the planners for alternatives and wait for them without blocking the
/// clock.
#[derive(Debug)]
pub struct PlanJourney {
    pub start:       Option<GeoPoint>,
    pub destination: GeoPoint,
    request_sent:       bool,
    flexibus_requested: bool,
    finished:           bool,
}

impl PlanJourney {
    /// Plan from wherever the entity is when the activity first runs.
    pub fn new(destination: GeoPoint) -> Self {
        Self { start: None, destination, request_sent: false, flexibus_requested: false, finished: false }
    }

    pub fn between(start: GeoPoint, destination: GeoPoint) -> Self {
        Self { start: Some(start), ..Self::new(destination) }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn request_sent(&self) -> bool {
        self.request_sent
    }

    fn send_requests(&mut self, ctx: &mut ActivityCtx<'_>) -> FlowResult<()> {
        let start = *self.start.get_or_insert(ctx.entity.position);
        let distance = start.distance_m(self.destination);
        ctx.entity.preferences = Preferences {
            tmax: JOURNEY_TMAX_SECS,
            cmax: JOURNEY_CMAX,
            wmax: distance.min(JOURNEY_WMAX_M),
            ..ctx.entity.preferences.clone()
        };

        let at_home = ctx.entity.is_at_home();
        let id = ctx.entity.id;
        let traveller = ctx.entity.traveller()?;
        let req_id = ctx.sim.planning.next_request_id();
        let departure = ctx.now();

        let destination = self.destination;
        let new_request = |n: u32, modes: Vec<TransportMode>| {
            JourneyRequest::new(id, req_id, n, start, destination, departure, modes)
        };

        // Without a car at hand the car request stands in for a taxi.
        let taxi = !traveller.has_car || (!at_home && !traveller.used_car);
        let mut requests = vec![new_request(0, vec![TransportMode::Car, TransportMode::Walk]).with_taxi(taxi)];
        if !traveller.used_car {
            requests.push(new_request(1, vec![TransportMode::Transit, TransportMode::Walk]));
            requests.push(new_request(2, vec![TransportMode::Walk]));
            if traveller.use_flexibus {
                requests.push(new_request(3, vec![TransportMode::FlexiBus]));
                self.flexibus_requested = true;
            }
        }

        log::trace!("{id}: {} journey request(s), round {req_id}", requests.len());
        ctx.sim.planning.submit(requests, traveller.request_buffer.clone());
        self.request_sent = true;
        Ok(())
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        if !self.request_sent {
            self.send_requests(ctx)?;
            return Ok(0.0);
        }

        let traveller = ctx.entity.traveller()?;
        if !traveller.request_buffer.is_processed() {
            return Ok(0.0);
        }

        let itineraries = traveller.request_buffer.take();
        self.finished = true;

        if itineraries.is_empty() {
            log::debug!("{}: no itinerary found, moving straight to destination", ctx.entity.id);
            ctx.entity.position = self.destination;
            return Ok(dt);
        }
        if self.flexibus_requested {
            ctx.sim.planning.unregister_flexibus(ctx.entity.id);
        }
        ctx.follow_up(Activity::RankAlternatives(RankAlternatives::new(itineraries)));
        Ok(dt)
    }
}

// ── RankAlternatives ──────────────────────────────────────────────────────────

/// Two passes: update bounds and predict on the first tick, rank and choose
/// on the next.
#[derive(Debug)]
pub struct RankAlternatives {
    candidates: Vec<Itinerary>,
    predicted:  bool,
    finished:   bool,
}

impl RankAlternatives {
    pub fn new(candidates: Vec<Itinerary>) -> Self {
        Self { candidates, predicted: false, finished: false }
    }

    pub fn candidates(&self) -> &[Itinerary] {
        &self.candidates
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        if !self.predicted {
            ctx.entity.preferences.update_bounds(&self.candidates);
            ctx.entity.knowledge.predict(&mut self.candidates);
            self.predicted = true;
            return Ok(0.0);
        }

        let ranked = ctx.entity.utility.rank(&ctx.entity.preferences, std::mem::take(&mut self.candidates));
        if let Some(best) = ranked.into_iter().next() {
            log::trace!("{}: chose alternative {} of round {}", ctx.entity.id, best.req_number, best.req_id);
            ctx.follow_up(Activity::PrepareJourney(PrepareJourney::new(best)));
        }
        self.finished = true;
        Ok(dt)
    }
}

// ── PrepareJourney ────────────────────────────────────────────────────────────

/// Expand the chosen itinerary into movement activities.
#[derive(Debug)]
pub struct PrepareJourney {
    itinerary: Option<Itinerary>,
}

impl PrepareJourney {
    pub fn new(itinerary: Itinerary) -> Self {
        Self { itinerary: Some(itinerary) }
    }

    pub fn is_finished(&self) -> bool {
        self.itinerary.is_none()
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        let Some(itinerary) = self.itinerary.take() else {
            return Ok(dt);
        };
        let taxi = itinerary.kind == ItineraryKind::Taxi;

        for leg in &itinerary.legs {
            let activity = match leg.mode {
                TransportMode::Walk => Activity::Move(Movement::new(MoveMode::Walk, leg.segments.clone())),
                TransportMode::Car => {
                    Activity::Move(Movement::new(MoveMode::Drive { taxi }, leg.segments.clone()))
                }
                TransportMode::Bicycle => Activity::Move(Movement::new(MoveMode::Cycle, leg.segments.clone())),
                mode if mode.is_scheduled_transit() && leg.trip_id.is_some() => {
                    Activity::RideTransit(RideTransit::new(leg.clone()))
                }
                mode => Activity::Move(
                    Movement::new(MoveMode::Bus { mode }, leg.segments.clone())
                        .with_fill_level(itinerary.fill_level),
                ),
            };
            ctx.follow_up(activity);
        }
        ctx.follow_up(Activity::CorrectPosition(CorrectPosition::new(itinerary.to)));
        ctx.follow_up(Activity::Learn(Learn::new()));

        let traveller = ctx.entity.traveller_mut()?;
        if itinerary.uses_private_car() {
            traveller.used_car = true;
        }
        traveller.current_itinerary = Some(itinerary);
        Ok(dt)
    }
}

// ── CorrectPosition ───────────────────────────────────────────────────────────

/// Snap the entity onto the journey's exact destination.
#[derive(Debug)]
pub struct CorrectPosition {
    pub destination: GeoPoint,
    finished: bool,
}

impl CorrectPosition {
    pub fn new(destination: GeoPoint) -> Self {
        Self { destination, finished: false }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        ctx.entity.position = self.destination;
        if ctx.entity.is_at_home() {
            if let Some(t) = ctx.entity.traveller.as_mut() {
                t.used_car = false;
            }
        }
        self.finished = true;
        Ok(dt)
    }
}

// ── Learn ─────────────────────────────────────────────────────────────────────

/// Hand everything collected on the way to the knowledge store.
#[derive(Debug, Default)]
pub struct Learn {
    finished: bool,
}

impl Learn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        ctx.entity.knowledge.flush();
        if let Some(t) = ctx.entity.traveller.as_mut() {
            t.current_itinerary = None;
        }
        self.finished = true;
        Ok(dt)
    }
}
