//! The `Activity` tagged variant.

use crate::{
    ActivityCtx, CorrectPosition, FlowResult, Learn, MoveMode, Movement, PickUpAndWait, PlanJourney,
    PrepareJourney, PrepareTrip, RankAlternatives, ReturnToAgency, RideTransit, StartNextTrips,
};

/// One unit of entity behaviour.
///
/// `execute(dt, ctx)` spends at most `dt` seconds and returns the part it
/// did not use.  Once `is_finished()` is `true` the flow pops the activity
/// and never executes it again.
#[derive(Debug)]
pub enum Activity {
    PlanJourney(PlanJourney),
    RankAlternatives(RankAlternatives),
    PrepareJourney(PrepareJourney),
    Move(Movement),
    RideTransit(RideTransit),
    CorrectPosition(CorrectPosition),
    PrepareTrip(PrepareTrip),
    PickUpAndWait(PickUpAndWait),
    ReturnToAgency(ReturnToAgency),
    Learn(Learn),
    StartNextTrips(StartNextTrips),
}

impl Activity {
    pub fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        match self {
            Activity::PlanJourney(a) => a.execute(dt, ctx),
            Activity::RankAlternatives(a) => a.execute(dt, ctx),
            Activity::PrepareJourney(a) => a.execute(dt, ctx),
            Activity::Move(a) => a.execute(dt, ctx),
            Activity::RideTransit(a) => a.execute(dt, ctx),
            Activity::CorrectPosition(a) => a.execute(dt, ctx),
            Activity::PrepareTrip(a) => a.execute(dt, ctx),
            Activity::PickUpAndWait(a) => a.execute(dt, ctx),
            Activity::ReturnToAgency(a) => a.execute(dt, ctx),
            Activity::Learn(a) => a.execute(dt, ctx),
            Activity::StartNextTrips(a) => a.execute(dt, ctx),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            Activity::PlanJourney(a) => a.is_finished(),
            Activity::RankAlternatives(a) => a.is_finished(),
            Activity::PrepareJourney(a) => a.is_finished(),
            Activity::Move(a) => a.is_finished(),
            Activity::RideTransit(a) => a.is_finished(),
            Activity::CorrectPosition(a) => a.is_finished(),
            Activity::PrepareTrip(a) => a.is_finished(),
            Activity::PickUpAndWait(a) => a.is_finished(),
            Activity::ReturnToAgency(a) => a.is_finished(),
            Activity::Learn(a) => a.is_finished(),
            Activity::StartNextTrips(_) => false,
        }
    }

    /// Upper-case name, as written to output files.
    pub fn name(&self) -> &'static str {
        match self {
            Activity::PlanJourney(_) => "PLAN_JOURNEY",
            Activity::RankAlternatives(_) => "RANK_ALTERNATIVES",
            Activity::PrepareJourney(_) => "PREPARE_JOURNEY",
            Activity::Move(m) => match m.mode {
                MoveMode::Drive { .. } => "DRIVE",
                MoveMode::Cycle => "CYCLE",
                MoveMode::Walk => "WALK",
                MoveMode::Bus { .. } => "USE_BUS",
                MoveMode::DriveToNextStop { .. } => "DRIVE_TO_NEXT_STOP",
            },
            Activity::RideTransit(_) => "RIDE_TRANSIT",
            Activity::CorrectPosition(_) => "CORRECT_POSITION",
            Activity::PrepareTrip(_) => "PREPARE_TRIP",
            Activity::PickUpAndWait(_) => "PICKUP_AND_WAIT",
            Activity::ReturnToAgency(_) => "RETURN_TO_AGENCY",
            Activity::Learn(_) => "LEARN",
            Activity::StartNextTrips(_) => "START_NEXT_TRIPS",
        }
    }
}
