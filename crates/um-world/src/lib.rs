//! `um-world`: the street network the simulation moves over.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`segment`] | `StreetSegment` (occupancy counter, mode speeds), `SegmentPath` |
//! | [`map`]     | `StreetMap` (CSR + R-tree), `StreetMapBuilder`                 |
//! | [`path`]    | `PathService` trait: coordinates → ordered segments            |
//! | [`error`]   | `WorldError`, `WorldResult<T>`                                 |
//!
//! Segments are shared as `Arc<StreetSegment>`: itineraries produced on
//! planner worker threads hold them, and movement activities bump their
//! occupancy counters from the simulation thread.  All mutable segment state
//! is atomic for that reason.
//!
//! Route finding is not done here.  [`PathService`] turns a polyline the
//! planner already computed into the segments it runs along.

pub mod error;
pub mod map;
pub mod path;
pub mod segment;


pub use error::{WorldError, WorldResult};
pub use map::{StreetMap, StreetMapBuilder};
pub use path::PathService;
pub use segment::{SegmentPath, StreetSegment, path_length_m};
