//! `um-flow`: what entities do, tick by tick.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`activity`] | `Activity` tagged variant: `execute`, `is_finished`, `name`     |
//! | [`flow`]     | `Flow`: per-entity FIFO with carry-over of unused tick time     |
//! | [`context`]  | `SimContext` (shared services), `ActivityCtx`, `Effect`         |
//! | [`movement`] | `SegmentWalker`, `MovementProfile`, `MoveMode`, `Movement`      |
//! | [`journey`]  | `PlanJourney`, `RankAlternatives`, `PrepareJourney`, `CorrectPosition`, `Learn` |
//! | [`ride`]     | `RideTransit`: wait, board, ride, alight                        |
//! | [`service`]  | `StartNextTrips`, `PrepareTrip`, `PickUpAndWait`, `ReturnToAgency` |
//! | [`schedule`] | `DailySchedule`: activities released at a given time            |
//! | [`error`]    | `FlowError`, `FlowResult<T>`                                    |
//!
//! # Design notes
//!
//! Activities only ever mutate their own entity.  Work for another entity
//! is expressed as an [`Effect`] and applied by the driver once the
//! producing entity's step is over; state two entities genuinely share
//! (stops, cabins, fleets, request buffers) sits behind `Arc` + `Mutex`.
//!
//! Expected trouble (no path, no itinerary, no seat) finishes the activity
//! with a fallback.  Only configuration-class problems come back as `Err`.

pub mod activity;
pub mod context;
pub mod error;
pub mod flow;
pub mod journey;
pub mod movement;
pub mod ride;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use activity::Activity;
pub use context::{ActivityCtx, Effect, SimContext};
pub use error::{FlowError, FlowResult};
pub use flow::Flow;
pub use journey::{CorrectPosition, Learn, PlanJourney, PrepareJourney, RankAlternatives};
pub use movement::{MoveMode, Movement, MovementProfile, SegmentWalker};
pub use ride::{BOARDING_TIMEOUT_MINS, RideTransit};
pub use schedule::DailySchedule;
pub use service::{PickUpAndWait, PrepareTrip, ReturnToAgency, StartNextTrips};
