//! `um-agent`: the simulated entities.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`entity`]   | `Entity`, `EntityKind`, capabilities `Traveller` / `Vehicle` |
//! | [`ensemble`] | `EnsembleRegistry`: named entity groups                      |
//! | [`store`]    | `EntityStore`: entities indexed by `EntityId`                |
//! | [`builder`]  | `EntityStoreBuilder`, `PersonSpec`, `FleetSpec`              |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                               |
//!
//! An entity is one struct with optional capabilities rather than a type
//! hierarchy: a person has a `Traveller`, a bus has a `Vehicle`, an agency
//! owns a `TransportAgency`.  Activities ask for the capability they need and
//! fail with [`AgentError::MissingCapability`] when it is absent.

pub mod builder;
pub mod ensemble;
pub mod entity;
pub mod error;
pub mod store;


pub use builder::{EntityStoreBuilder, FleetSpec, PersonSpec};
pub use ensemble::{Ensemble, EnsembleRegistry};
pub use entity::{Entity, EntityKind, Traveller, Vehicle};
pub use error::{AgentError, AgentResult};
pub use store::EntityStore;
