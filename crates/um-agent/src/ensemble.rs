//! Named groups of entities.
//!
//! Vehicles on duty join their agency's ensemble and each running trip gets
//! an ensemble of its own.  The registry only does the bookkeeping; nothing
//! here coordinates behaviour.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use um_core::EntityId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ensemble {
    pub name:    String,
    pub creator: EntityId,
    pub members: BTreeSet<EntityId>,
}

#[derive(Default)]
pub struct EnsembleRegistry {
    ensembles: Mutex<BTreeMap<String, Ensemble>>,
}

impl EnsembleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Ensemble>> {
        self.ensembles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get-or-create.  Returns `true` if the ensemble is new; an existing
    /// ensemble keeps its original creator.
    pub fn create(&self, name: &str, creator: EntityId) -> bool {
        let mut map = self.lock();
        if map.contains_key(name) {
            return false;
        }
        map.insert(name.to_string(), Ensemble {
            name: name.to_string(),
            creator,
            members: BTreeSet::new(),
        });
        true
    }

    /// Add `entity` to `name`, creating the ensemble with `entity` as creator
    /// if it does not exist yet.
    pub fn join(&self, name: &str, entity: EntityId) {
        self.lock()
            .entry(name.to_string())
            .or_insert_with(|| Ensemble {
                name: name.to_string(),
                creator: entity,
                members: BTreeSet::new(),
            })
            .members
            .insert(entity);
    }

    pub fn leave(&self, name: &str, entity: EntityId) {
        if let Some(e) = self.lock().get_mut(name) {
            e.members.remove(&entity);
        }
    }

    pub fn destroy(&self, name: &str) -> Option<Ensemble> {
        self.lock().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Ensemble> {
        self.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Members of `name` in id order; empty if it does not exist.
    pub fn members(&self, name: &str) -> Vec<EntityId> {
        self.lock()
            .get(name)
            .map(|e| e.members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
