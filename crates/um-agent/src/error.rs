use thiserror::Error;

use um_core::{CoreError, EntityId};
use um_transit::TransitError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An activity needs a capability the entity was not built with.
    #[error("entity {entity} has no {capability} capability")]
    MissingCapability { entity: EntityId, capability: &'static str },

    #[error(transparent)]
    Transit(#[from] TransitError),
}

pub type AgentResult<T> = Result<T, AgentError>;
