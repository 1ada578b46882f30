//! A vehicle's passenger compartment.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use um_core::{EntityId, GeoPoint, StopId};
use um_knowledge::KnowledgeHandle;

use crate::{TransitError, TransitResult};

/// Shared between a rider and the cabin; tells the rider when it is on
/// board and when it has been let off.
#[derive(Debug, Default)]
pub struct RideTicket {
    boarded:  AtomicBool,
    alighted: AtomicBool,
}

impl RideTicket {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_boarded(&self) -> bool {
        self.boarded.load(Ordering::Acquire)
    }

    pub fn is_alighted(&self) -> bool {
        self.alighted.load(Ordering::Acquire)
    }
}

/// A rider on board.
pub struct Passenger {
    pub entity:    EntityId,
    /// Receives the vehicle's travel experiences while riding.
    pub knowledge: KnowledgeHandle,
    pub alight_at: StopId,
    pub ticket:    Arc<RideTicket>,
}

/// Capacity-bounded passenger list plus the vehicle position riders follow.
pub struct Cabin {
    capacity:   u32,
    passengers: Mutex<Vec<Passenger>>,
    position:   Mutex<GeoPoint>,
}

impl Cabin {
    pub fn new(capacity: u32, position: GeoPoint) -> TransitResult<Self> {
        if capacity == 0 {
            return Err(TransitError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            passengers: Mutex::new(Vec::new()),
            position: Mutex::new(position),
        })
    }

    fn riders(&self) -> MutexGuard<'_, Vec<Passenger>> {
        self.passengers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Add `passenger` if there is room.  Check and insert happen under one
    /// lock, so concurrent boarders never exceed the capacity.
    pub fn board(&self, passenger: Passenger) -> bool {
        let mut riders = self.riders();
        if riders.len() >= self.capacity as usize {
            return false;
        }
        passenger.ticket.boarded.store(true, Ordering::Release);
        riders.push(passenger);
        true
    }

    /// Let off every rider whose destination is `stop`.
    pub fn alight_at(&self, stop: &StopId) -> Vec<EntityId> {
        let mut riders = self.riders();
        let mut off = Vec::new();
        riders.retain(|p| {
            if &p.alight_at == stop {
                p.ticket.alighted.store(true, Ordering::Release);
                off.push(p.entity);
                false
            } else {
                true
            }
        });
        off
    }

    /// Let off everyone still on board, e.g. when the vehicle ends its trip.
    pub fn alight_all(&self) -> Vec<EntityId> {
        self.riders()
            .drain(..)
            .map(|p| {
                p.ticket.alighted.store(true, Ordering::Release);
                p.entity
            })
            .collect()
    }

    pub fn passenger_count(&self) -> usize {
        self.riders().len()
    }

    pub fn is_empty(&self) -> bool {
        self.passenger_count() == 0
    }

    /// Passengers / capacity.
    pub fn fill_level(&self) -> f64 {
        self.passenger_count() as f64 / self.capacity as f64
    }

    /// Knowledge handles of everyone on board.
    pub fn rider_knowledge(&self) -> Vec<KnowledgeHandle> {
        self.riders().iter().map(|p| p.knowledge.clone()).collect()
    }

    pub fn position(&self) -> GeoPoint {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_position(&self, pos: GeoPoint) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = pos;
    }
}

impl std::fmt::Debug for Cabin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cabin")
            .field("capacity", &self.capacity)
            .field("passengers", &self.passenger_count())
            .finish_non_exhaustive()
    }
}
