//! `um-core`: foundational types for the urban mobility simulation.
//!
//! Every other `um-*` crate depends on this one.  It has no `um-*`
//! dependencies and only a handful of external ones (`chrono`, `rand`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `NodeId`, `SegmentId`, `RequestId`, `TripId`, `RouteId`, `StopId`, `AgencyId` |
//! | [`geo`]         | `GeoPoint`, haversine distance, interpolation              |
//! | [`time`]        | `Tick`, `SimClock` (Δt + calendar time), `SimConfig`       |
//! | [`rng`]         | `EntityRng`, seeded per entity for scenario builders       |
//! | [`transport`]   | `TransportMode` with its stable wire encoding              |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;
pub mod transport;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{AgencyId, EntityId, NodeId, RequestId, RouteId, SegmentId, StopId, TripId};
pub use rng::EntityRng;
pub use time::{MAX_TICK_SECS, SimClock, SimConfig, Tick};
pub use transport::TransportMode;
