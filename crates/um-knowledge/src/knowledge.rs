//! The knowledge seam between entities and experience stores.

use std::str::FromStr;
use std::sync::Arc;

use um_core::EntityId;
use um_planner::Itinerary;

use crate::{
    Experience, ExperienceStore, KnowledgeError, KnowledgeExchange, KnowledgeScope, LocalKnowledge,
};

/// An entity's knowledge collaborator.
///
/// `collect` is called from the simulation thread and must not block on
/// I/O; implementations buffer and write out on [`flush`](Self::flush).
pub trait Knowledge: Send + Sync {
    fn collect(&self, experience: Experience);

    /// Adjust estimated durations and fill levels in place.
    fn predict(&self, itineraries: &mut [Itinerary]);

    /// Hand buffered experiences to persistent storage.
    fn flush(&self) {}
}

/// Shared handle; transit vehicles hold their riders' handles while riding.
pub type KnowledgeHandle = Arc<dyn Knowledge>;

/// Knowledge that learns nothing and predicts nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoKnowledge;

impl Knowledge for NoKnowledge {
    fn collect(&self, _experience: Experience) {}
    fn predict(&self, _itineraries: &mut [Itinerary]) {}
}

/// Which knowledge an entity is given.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KnowledgeModel {
    /// No collection, no prediction.
    Without,
    /// Every entity learns only from its own experiences.
    Local,
    /// All entities share one pool of experiences.
    Global,
}

impl KnowledgeModel {
    /// Build the knowledge handle for `entity` under this model.
    pub fn handle(
        self,
        entity:   EntityId,
        store:    &Arc<dyn ExperienceStore>,
        exchange: &Arc<KnowledgeExchange>,
    ) -> KnowledgeHandle {
        let scope = match self {
            KnowledgeModel::Without => return Arc::new(NoKnowledge),
            KnowledgeModel::Local   => KnowledgeScope::Entity(entity),
            KnowledgeModel::Global  => KnowledgeScope::Global,
        };
        Arc::new(LocalKnowledge::new(scope, Arc::clone(store), Arc::clone(exchange)))
    }
}

impl FromStr for KnowledgeModel {
    type Err = KnowledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "without" => Ok(KnowledgeModel::Without),
            "local"   => Ok(KnowledgeModel::Local),
            "global"  => Ok(KnowledgeModel::Global),
            _ => Err(KnowledgeError::UnknownModel(s.to_string())),
        }
    }
}
