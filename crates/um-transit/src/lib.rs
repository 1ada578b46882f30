//! `um-transit`: public transport supply.
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`stop`]   | `Stop` with its waiting vehicles and persons                  |
//! | [`cabin`]  | `Cabin`: capacity-bounded passenger list shared with riders   |
//! | [`trip`]   | `Trip`: stops, stop times, traces, validity window            |
//! | [`route`]  | `Route`: weekday-bucketed rotating trip queues                |
//! | [`fleet`]  | `Fleet`: vehicle pool and live trip → vehicle map             |
//! | [`agency`] | `TransportAgency`: routes plus fleet                          |
//! | [`error`]  | `TransitError`, `TransitResult<T>`                            |
//!
//! Everything a rider and a vehicle both touch (`Stop`, `Cabin`, `Fleet`) is
//! shared through `Arc` and guarded by a `Mutex`, so the simulation can hand
//! the same stop to a waiting person and to the bus that picks them up.

pub mod agency;
pub mod cabin;
pub mod error;
pub mod fleet;
pub mod route;
pub mod stop;
pub mod trip;


pub use agency::{TransportAgency, agency_ensemble_name};
pub use cabin::{Cabin, Passenger, RideTicket};
pub use error::{TransitError, TransitResult};
pub use fleet::Fleet;
pub use route::Route;
pub use stop::{Stop, WaitingVehicle};
pub use trip::Trip;
