//! A transport agency: its routes, its fleet, and which trips are due.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use um_core::{AgencyId, EntityId, RouteId};

use crate::{Fleet, Route, TransitResult, Trip};

/// Name of the ensemble every vehicle of agency `id` joins while on duty.
pub fn agency_ensemble_name(id: &AgencyId) -> String {
    format!("TransportAgency{id}Ensemble")
}

/// A transport agency: its routes, in route-id order, and its fleet.
pub struct TransportAgency {
    pub id:     AgencyId,
    pub routes: BTreeMap<RouteId, Route>,
    pub fleet:  Arc<Fleet>,
}

impl TransportAgency {
    pub fn new(id: AgencyId, fleet: Arc<Fleet>) -> Self {
        Self { id, routes: BTreeMap::new(), fleet }
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.insert(route.id.clone(), route);
    }

    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn ensemble_name(&self) -> String {
        agency_ensemble_name(&self.id)
    }

    /// Trips of all routes departing at `now`, route by route in id order.
    pub fn trips_to_schedule(&mut self, now: NaiveDateTime) -> Vec<Arc<Trip>> {
        self.routes.values_mut().flat_map(|r| r.next_trips(now)).collect()
    }

    pub fn schedule_trip(&self, trip: &Trip) -> TransitResult<EntityId> {
        let vehicle = self.fleet.schedule_trip(&trip.id)?;
        log::debug!("agency {}: trip {} → vehicle {}", self.id, trip.id, vehicle);
        Ok(vehicle)
    }
}
