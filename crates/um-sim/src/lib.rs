//! `um-sim`: tick driver for the urban mobility simulation.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Release:   DailySchedule entries due by now join their entity's flow.
//!   ② Step:      Flow::step(Δt) for every busy entity, ascending EntityId;
//!                 effects (e.g. Assign PrepareTrip → vehicle) are applied
//!                 right after the producing entity's step.
//!   ③ Dispatch:  planning rounds queued by PlanJourney go to the pool;
//!                 the entities poll their buffers on later ticks.
//!   ④ Congest:   segment driving speeds follow occupancy.
//!   ⑤ Advance:   clock += Δt.
//! ```
//!
//! Fatal activity errors (pool exhaustion, inconsistent trips, missing
//! capabilities) stop the run: `step` logs them at `error` and returns
//! `Err`.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use um_agent::{EntityStoreBuilder, PersonSpec};
//! use um_sim::{NoopObserver, SimBuilder};
//!
//! let mut b = EntityStoreBuilder::new();
//! b.add_person(PersonSpec::new(home).with_car());
//! let mut sim = SimBuilder::new(config, b.build(), planning).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickStats};
pub use sim::Simulation;
