//! Fluent construction of an [`EntityStore`].
//!
//! Ids are handed out in insertion order, so the store can index by id.
//! Agencies create their own vehicles: `add_agency` reserves the agency id
//! followed by one id per vehicle and wires them to a shared `Fleet`.
//!
//! # Usage
//!
//! ```rust
//! use um_agent::{EntityStoreBuilder, PersonSpec};
//! use um_core::GeoPoint;
//!
//! let mut b = EntityStoreBuilder::new();
//! let alice = b.add_person(PersonSpec::new(GeoPoint::new(46.07, 11.12)).with_car());
//! let store = b.build();
//!
//! assert_eq!(store.len(), 1);
//! assert!(store.get(alice).unwrap().traveller.as_ref().unwrap().has_car);
//! ```

use std::sync::Arc;

use um_core::{AgencyId, EntityId, GeoPoint};
use um_knowledge::{KnowledgeHandle, NoKnowledge};
use um_planner::{UtilityStrategy, WeightedUtility};
use um_transit::{Cabin, Fleet, Route, TransportAgency};

use crate::{AgentResult, Entity, EntityKind, EntityStore, Traveller, Vehicle};

/// Static description of a person.
#[derive(Clone, Debug)]
pub struct PersonSpec {
    pub home:         GeoPoint,
    pub has_car:      bool,
    pub has_bike:     bool,
    pub use_flexibus: bool,
}

impl PersonSpec {
    pub fn new(home: GeoPoint) -> Self {
        Self { home, has_car: false, has_bike: false, use_flexibus: false }
    }

    pub fn with_car(mut self) -> Self {
        self.has_car = true;
        self
    }

    pub fn with_bike(mut self) -> Self {
        self.has_bike = true;
        self
    }

    pub fn with_flexibus(mut self) -> Self {
        self.use_flexibus = true;
        self
    }
}

/// The vehicles an agency starts with.
#[derive(Clone, Debug)]
pub struct FleetSpec {
    pub kind:     EntityKind,
    pub count:    usize,
    pub capacity: u32,
    /// Where idle vehicles wait.
    pub depot:    GeoPoint,
}

type KnowledgeFactory = Box<dyn Fn(EntityId) -> KnowledgeHandle>;

pub struct EntityStoreBuilder {
    entities:  Vec<Entity>,
    knowledge: KnowledgeFactory,
    utility:   Arc<dyn UtilityStrategy>,
}

impl EntityStoreBuilder {
    /// No knowledge, [`WeightedUtility`] ranking.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            knowledge: Box::new(|_| Arc::new(NoKnowledge)),
            utility: Arc::new(WeightedUtility),
        }
    }

    /// Knowledge handle for each entity added from now on.
    pub fn with_knowledge(mut self, factory: impl Fn(EntityId) -> KnowledgeHandle + 'static) -> Self {
        self.knowledge = Box::new(factory);
        self
    }

    pub fn with_utility(mut self, utility: Arc<dyn UtilityStrategy>) -> Self {
        self.utility = utility;
        self
    }

    fn next_id(&self) -> EntityId {
        EntityId(self.entities.len() as u32)
    }

    fn entity(&self, kind: EntityKind, position: GeoPoint) -> Entity {
        let id = self.next_id();
        Entity::new(id, kind, position, (self.knowledge)(id), Arc::clone(&self.utility))
    }

    /// Add a person standing at home.
    pub fn add_person(&mut self, spec: PersonSpec) -> EntityId {
        let mut e = self.entity(EntityKind::Person, spec.home);
        e.traveller = Some(Traveller::new(spec.home, spec.has_car, spec.has_bike, spec.use_flexibus));
        let id = e.id;
        self.entities.push(e);
        id
    }

    /// Add an agency serving `routes` and the vehicles of its fleet.
    /// Returns the agency id; vehicle ids follow it consecutively.
    pub fn add_agency(
        &mut self,
        agency_id: AgencyId,
        kind:      EntityKind,
        routes:    Vec<Route>,
        fleet:     &FleetSpec,
    ) -> AgentResult<EntityId> {
        let agency_entity = self.next_id();
        let vehicle_ids: Vec<EntityId> =
            (1..=fleet.count).map(|i| EntityId(agency_entity.0 + i as u32)).collect();
        let shared_fleet = Arc::new(Fleet::new(agency_id.clone(), vehicle_ids.iter().copied()));

        let mut agency = TransportAgency::new(agency_id, Arc::clone(&shared_fleet));
        for route in routes {
            agency.add_route(route);
        }
        let mut e = self.entity(kind, fleet.depot);
        e.agency = Some(agency);
        self.entities.push(e);

        for _ in &vehicle_ids {
            let cabin = Arc::new(Cabin::new(fleet.capacity, fleet.depot)?);
            let mut v = self.entity(fleet.kind, fleet.depot);
            v.vehicle = Some(Vehicle::new(Arc::clone(&shared_fleet), cabin));
            self.entities.push(v);
        }
        log::debug!(
            "agency {} ({}): {} vehicles of capacity {}",
            shared_fleet.agency_id,
            agency_entity,
            fleet.count,
            fleet.capacity
        );
        Ok(agency_entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn build(self) -> EntityStore {
        EntityStore::new(self.entities)
    }
}

impl Default for EntityStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
