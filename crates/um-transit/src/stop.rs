//! Public-transport stops.

use std::sync::{Arc, Mutex, PoisonError};

use um_core::{EntityId, GeoPoint, StopId, TripId};

use crate::Cabin;

/// A vehicle parked at a stop, serving `trip`.
#[derive(Clone)]
pub struct WaitingVehicle {
    pub vehicle: EntityId,
    pub trip:    TripId,
    pub cabin:   Arc<Cabin>,
}

/// A stop where vehicles wait and persons board.
pub struct Stop {
    pub id:       StopId,
    pub name:     String,
    pub position: GeoPoint,

    waiting_vehicles: Mutex<Vec<WaitingVehicle>>,
    waiting_persons:  Mutex<Vec<EntityId>>,
}

impl Stop {
    pub fn new(id: StopId, name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            waiting_vehicles: Mutex::new(Vec::new()),
            waiting_persons: Mutex::new(Vec::new()),
        }
    }

    pub fn add_waiting_vehicle(&self, waiting: WaitingVehicle) {
        self.waiting_vehicles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(waiting);
    }

    pub fn remove_waiting_vehicle(&self, vehicle: EntityId) {
        self.waiting_vehicles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|w| w.vehicle != vehicle);
    }

    /// Cabin of the vehicle currently parked here serving `trip`.
    pub fn vehicle_for_trip(&self, trip: &TripId) -> Option<Arc<Cabin>> {
        self.waiting_vehicles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|w| &w.trip == trip)
            .map(|w| Arc::clone(&w.cabin))
    }

    pub fn has_waiting_vehicle(&self) -> bool {
        !self.waiting_vehicles.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    pub fn add_waiting_person(&self, person: EntityId) {
        let mut persons = self.waiting_persons.lock().unwrap_or_else(PoisonError::into_inner);
        if !persons.contains(&person) {
            persons.push(person);
        }
    }

    pub fn remove_waiting_person(&self, person: EntityId) {
        self.waiting_persons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|&p| p != person);
    }

    pub fn waiting_person_count(&self) -> usize {
        self.waiting_persons.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl std::fmt::Debug for Stop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stop")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
