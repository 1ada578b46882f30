//! An agency's vehicle pool.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use um_core::{AgencyId, EntityId, TripId};

use crate::{TransitError, TransitResult};

#[derive(Default)]
struct FleetState {
    pool: VecDeque<EntityId>,
    live: HashMap<TripId, EntityId>,
}

/// Idle vehicles (FIFO) and the vehicle serving each running trip.
///
/// Both live under one lock.  Every vehicle is in exactly one of them, so
/// `available() + live() == size()` holds between calls.
pub struct Fleet {
    pub agency_id: AgencyId,
    size:          usize,
    state:         Mutex<FleetState>,
}

impl Fleet {
    pub fn new(agency_id: AgencyId, vehicles: impl IntoIterator<Item = EntityId>) -> Self {
        let pool: VecDeque<EntityId> = vehicles.into_iter().collect();
        Self {
            agency_id,
            size: pool.len(),
            state: Mutex::new(FleetState { pool, live: HashMap::new() }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FleetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.lock().pool.len()
    }

    pub fn live(&self) -> usize {
        self.lock().live.len()
    }

    pub fn vehicle_for_trip(&self, trip: &TripId) -> Option<EntityId> {
        self.lock().live.get(trip).copied()
    }

    /// Take the longest-idle vehicle for `trip`.
    pub fn schedule_trip(&self, trip: &TripId) -> TransitResult<EntityId> {
        let mut state = self.lock();
        if state.live.contains_key(trip) {
            return Err(TransitError::InconsistentTrip {
                trip:   trip.clone(),
                detail: "already running".into(),
            });
        }
        let vehicle = state.pool.pop_front().ok_or_else(|| TransitError::PoolExhausted {
            agency: self.agency_id.clone(),
            trip:   trip.clone(),
        })?;
        state.live.insert(trip.clone(), vehicle);
        Ok(vehicle)
    }

    /// Return `vehicle` to the pool tail.  `trip` must currently be served
    /// by `vehicle`.
    pub fn finish_trip(&self, trip: &TripId, vehicle: EntityId) -> TransitResult<()> {
        let mut state = self.lock();
        if state.live.get(trip) != Some(&vehicle) {
            return Err(TransitError::UnknownTrip { trip: trip.clone(), vehicle });
        }
        state.live.remove(trip);
        state.pool.push_back(vehicle);
        Ok(())
    }

    /// Every vehicle is either idle or live, never both.
    pub fn is_consistent(&self) -> bool {
        let state = self.lock();
        state.pool.len() + state.live.len() == self.size
            && state.live.values().all(|v| !state.pool.contains(v))
    }
}
