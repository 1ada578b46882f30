use thiserror::Error;

use um_core::{AgencyId, EntityId, TripId};

#[derive(Debug, Error)]
pub enum TransitError {
    /// Every vehicle of the agency is already serving a trip.
    #[error("agency {agency}: no vehicle left to schedule trip {trip}")]
    PoolExhausted { agency: AgencyId, trip: TripId },

    #[error("trip {trip} is inconsistent: {detail}")]
    InconsistentTrip { trip: TripId, detail: String },

    #[error("trip {trip} is not served by vehicle {vehicle}")]
    UnknownTrip { trip: TripId, vehicle: EntityId },

    #[error("cabin capacity must be positive, got {0}")]
    InvalidCapacity(u32),
}

pub type TransitResult<T> = Result<T, TransitError>;
