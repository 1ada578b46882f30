//! Journey requests sent to planner backends.

use chrono::NaiveDateTime;

use um_core::{EntityId, GeoPoint, RequestId, TransportMode};

/// What a planner backend should optimise a route for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum RouteType {
    #[default]
    Quick,
    Safe,
    Flat,
    Greenways,
    Transfers,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Quick     => "QUICK",
            RouteType::Safe      => "SAFE",
            RouteType::Flat      => "FLAT",
            RouteType::Greenways => "GREENWAYS",
            RouteType::Transfers => "TRANSFERS",
        }
    }
}

/// One alternative-mode request of a planning round.
///
/// All requests built by a single `PlanJourney` share `req_id` and are
/// numbered `0..` by `req_number` in the order they were built.
#[derive(Clone, Debug, PartialEq)]
pub struct JourneyRequest {
    pub entity:                EntityId,
    pub req_id:                RequestId,
    pub req_number:            u32,
    pub from:                  GeoPoint,
    pub to:                    GeoPoint,
    pub departure:             NaiveDateTime,
    pub modes:                 Vec<TransportMode>,
    pub route_type:            RouteType,
    pub results_number:        u32,
    pub maximum_costs:         f64,
    pub maximum_walk_distance: u32,
    /// Emulate a taxi ride instead of a private car.
    pub is_taxi:               bool,
}

impl JourneyRequest {
    pub const DEFAULT_MAXIMUM_COSTS: f64 = 25.0;
    pub const DEFAULT_MAXIMUM_WALK_DISTANCE: u32 = 1000;

    /// A request with the default bounds, route type and result count.
    pub fn new(
        entity:     EntityId,
        req_id:     RequestId,
        req_number: u32,
        from:       GeoPoint,
        to:         GeoPoint,
        departure:  NaiveDateTime,
        modes:      Vec<TransportMode>,
    ) -> Self {
        Self {
            entity,
            req_id,
            req_number,
            from,
            to,
            departure,
            modes,
            route_type: RouteType::Quick,
            results_number: 1,
            maximum_costs: Self::DEFAULT_MAXIMUM_COSTS,
            maximum_walk_distance: Self::DEFAULT_MAXIMUM_WALK_DISTANCE,
            is_taxi: false,
        }
    }

    pub fn with_taxi(mut self, is_taxi: bool) -> Self {
        self.is_taxi = is_taxi;
        self
    }

    /// Requests for the flexible bus go to the dedicated planner.
    #[inline]
    pub fn targets_flexibus(&self) -> bool {
        self.modes.contains(&TransportMode::FlexiBus)
    }

    #[inline]
    pub fn allows(&self, mode: TransportMode) -> bool {
        self.modes.contains(&mode)
    }
}
