//! Street-network error type.

use thiserror::Error;

use um_core::NodeId;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("no segment from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("node {0} not found in street map")]
    NodeNotFound(NodeId),

    #[error("street map has no nodes")]
    EmptyMap,
}

pub type WorldResult<T> = Result<T, WorldError>;
