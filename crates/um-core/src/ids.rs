//! Strongly typed identifier wrappers.
//!
//! Two families:
//!
//! - **Index ids** (`EntityId`, `NodeId`, `SegmentId`, `RequestId`) wrap a
//!   primitive integer.  They are `Copy` and index directly into `Vec`s via
//!   `.index()`.
//! - **Named ids** (`TripId`, `RouteId`, `StopId`, `AgencyId`) wrap an
//!   `Arc<str>` because timetable data identifies these by string.  Cloning
//!   is a reference-count bump.

use std::fmt;
use std::sync::Arc;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

/// Generate a string-keyed ID wrapper around `Arc<str>`.
macro_rules! named_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }
    };
}

typed_id! {
    /// Index of an entity (person, vehicle, agency) in the entity store.
    pub struct EntityId(u32);
}

typed_id! {
    /// Index of a street-network node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed street segment.
    pub struct SegmentId(u32);
}

typed_id! {
    /// Identifies the requests of one planning round.  All requests built by
    /// a single `PlanJourney` share one `RequestId`.
    pub struct RequestId(u64);
}

named_id! {
    /// Timetable trip identifier.
    pub struct TripId;
}

named_id! {
    /// Timetable route identifier.  Routes are iterated in `Ord` order.
    pub struct RouteId;
}

named_id! {
    /// Public-transport stop identifier.
    pub struct StopId;
}

named_id! {
    /// Transport agency identifier.
    pub struct AgencyId;
}
