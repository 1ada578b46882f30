//! Riding a timetabled vehicle.

use std::sync::Arc;

use chrono::TimeDelta;

use um_planner::Leg;
use um_transit::{Cabin, Passenger, RideTicket, Stop};

use crate::{ActivityCtx, FlowResult};

/// How long a rider waits past the leg's scheduled start before giving up.
pub const BOARDING_TIMEOUT_MINS: i64 = 30;

/// Wait at the boarding stop, board the vehicle serving the leg's trip, and
/// ride until it lets us off.
#[derive(Debug)]
pub struct RideTransit {
    pub leg:  Leg,
    waiting:  bool,
    ticket:   Option<Arc<RideTicket>>,
    cabin:    Option<Arc<Cabin>>,
    finished: bool,
}

impl RideTransit {
    pub fn new(leg: Leg) -> Self {
        Self { leg, waiting: false, ticket: None, cabin: None, finished: false }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_on_board(&self) -> bool {
        self.ticket.is_some()
    }

    /// Give up on the vehicle and continue from the leg's end.
    fn skip_to_leg_end(&mut self, ctx: &mut ActivityCtx<'_>, stop: Option<&Arc<Stop>>) {
        if let Some(stop) = stop {
            stop.remove_waiting_person(ctx.entity.id);
        }
        ctx.entity.position = self.leg.to;
        self.finished = true;
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        if let (Some(ticket), Some(cabin)) = (&self.ticket, &self.cabin) {
            if ticket.is_alighted() {
                ctx.entity.position = self.leg.to;
                self.finished = true;
                return Ok(dt);
            }
            ctx.entity.position = cabin.position();
            return Ok(0.0);
        }

        let sim = ctx.sim;
        let (Some(stop), Some(trip), Some(alight_at)) = (
            self.leg.board_stop.as_ref().and_then(|id| sim.stop(id)),
            self.leg.trip_id.clone(),
            self.leg.alight_stop.clone(),
        ) else {
            log::debug!("{}: transit leg without a known stop, skipping ahead", ctx.entity.id);
            self.skip_to_leg_end(ctx, None);
            return Ok(dt);
        };

        if !self.waiting {
            stop.add_waiting_person(ctx.entity.id);
            ctx.entity.position = stop.position;
            self.waiting = true;
        }

        if let Some(cabin) = stop.vehicle_for_trip(&trip) {
            let ticket = RideTicket::new();
            let passenger = Passenger {
                entity:    ctx.entity.id,
                knowledge: Arc::clone(&ctx.entity.knowledge),
                alight_at,
                ticket:    Arc::clone(&ticket),
            };
            if cabin.board(passenger) {
                log::debug!("{} boarded trip {} at {}", ctx.entity.id, trip, stop.id);
                stop.remove_waiting_person(ctx.entity.id);
                self.ticket = Some(ticket);
                self.cabin = Some(cabin);
                return Ok(0.0);
            }
        }

        if ctx.now() > self.leg.start_time + TimeDelta::minutes(BOARDING_TIMEOUT_MINS) {
            log::debug!("{}: no seat on trip {} at {}, skipping ahead", ctx.entity.id, trip, stop.id);
            self.skip_to_leg_end(ctx, Some(stop));
            return Ok(dt);
        }
        Ok(0.0)
    }
}
