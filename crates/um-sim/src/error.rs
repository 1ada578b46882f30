use thiserror::Error;

use um_core::EntityId;
use um_flow::FlowError;
use um_knowledge::KnowledgeError;
use um_planner::PlannerError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match entity count {expected}")]
    EntityCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    /// An effect addressed an entity that does not exist.
    #[error("no entity {0}")]
    UnknownEntity(EntityId),

    #[error("activity failed: {0}")]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

pub type SimResult<T> = Result<T, SimError>;
