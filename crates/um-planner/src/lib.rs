//! `um-planner`: journey planning for the urban mobility simulation.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`request`]      | `JourneyRequest`, `RouteType`                              |
//! | [`itinerary`]    | `Itinerary`, `Leg`, `ItineraryKind`                        |
//! | [`buffer`]       | `RequestBuffer`: per-entity result mailbox                 |
//! | [`planner`]      | `Planner` / `FlexiBusPlanner` traits, `dispatch_round`     |
//! | [`latch`]        | `CountDownLatch`                                           |
//! | [`orchestrator`] | `PlanningOrchestrator`, `PlanningConfig`, `BatchHandle`    |
//! | [`ranking`]      | `Preferences`, `UtilityStrategy`, `WeightedUtility`        |
//! | [`error`]        | `PlannerError`, `PlannerResult<T>`                         |
//!
//! # Handoff
//!
//! ```text
//! PlanJourney ──submit()──▶ pending rounds ──dispatch_pending()──▶ rayon pool
//!      ▲                                                             │
//!      └──── polls RequestBuffer::is_processed() ◀── dispatch_round ─┘
//! ```
//!
//! The simulation thread never blocks on a planning round.  Each round writes
//! exactly one `RequestBuffer` and publishes it with a Release store.

pub mod buffer;
pub mod error;
pub mod itinerary;
pub mod latch;
pub mod orchestrator;
pub mod planner;
pub mod ranking;
pub mod request;


pub use buffer::RequestBuffer;
pub use error::{PlannerError, PlannerResult};
pub use itinerary::{Itinerary, ItineraryKind, Leg};
pub use latch::CountDownLatch;
pub use orchestrator::{BatchHandle, PlanningConfig, PlanningOrchestrator};
pub use planner::{FlexiBusPlanner, MAX_ATTEMPTS, Planner, dispatch_round};
pub use ranking::{Preferences, UtilityStrategy, WeightedUtility};
pub use request::{JourneyRequest, RouteType};
