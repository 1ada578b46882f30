use thiserror::Error;

use um_agent::AgentError;
use um_core::EntityId;
use um_transit::TransitError;

#[derive(Debug, Error)]
pub enum FlowError {
    /// Includes activities run on an entity lacking the capability they
    /// need (`AgentError::MissingCapability`).
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Transit(#[from] TransitError),

    /// A trip activity ran on a vehicle that is not serving a trip.
    #[error("vehicle {0} has no current trip")]
    NoCurrentTrip(EntityId),
}

pub type FlowResult<T> = Result<T, FlowError>;
