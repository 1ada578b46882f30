//! Entities and their capabilities.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use um_core::{CoreError, EntityId, GeoPoint};
use um_knowledge::KnowledgeHandle;
use um_planner::{Itinerary, Preferences, RequestBuffer, UtilityStrategy};
use um_transit::{Cabin, Fleet, Stop, TransportAgency, Trip};

use crate::{AgentError, AgentResult};

/// Distance under which a person counts as being at home, metres.
const AT_HOME_M: f64 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Bus,
    FlexiBus,
    Train,
    PublicTransportAgency,
    FlexiBusAgency,
    CarPoolingAgency,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Person                => "PERSON",
            EntityKind::Bus                   => "BUS",
            EntityKind::FlexiBus              => "FLEXIBUS",
            EntityKind::Train                 => "TRAIN",
            EntityKind::PublicTransportAgency => "PUBLICTRANSPORTAGENCY",
            EntityKind::FlexiBusAgency        => "FLEXIBUSAGENCY",
            EntityKind::CarPoolingAgency      => "CARPOOLINGAGENCY",
        }
    }

    #[inline]
    pub fn is_agency(self) -> bool {
        matches!(
            self,
            EntityKind::PublicTransportAgency | EntityKind::FlexiBusAgency | EntityKind::CarPoolingAgency
        )
    }

    #[inline]
    pub fn is_vehicle(self) -> bool {
        matches!(self, EntityKind::Bus | EntityKind::FlexiBus | EntityKind::Train)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        [
            EntityKind::Person,
            EntityKind::Bus,
            EntityKind::FlexiBus,
            EntityKind::Train,
            EntityKind::PublicTransportAgency,
            EntityKind::FlexiBusAgency,
            EntityKind::CarPoolingAgency,
        ]
        .into_iter()
        .find(|k| k.as_str() == upper)
        .ok_or_else(|| CoreError::UnknownEntityKind(s.to_string()))
    }
}

/// A person who plans and makes journeys.
pub struct Traveller {
    pub home:              GeoPoint,
    pub has_car:           bool,
    pub has_bike:          bool,
    pub use_flexibus:      bool,
    /// Set when the person drove off in their own car; cleared on return
    /// home.  While set, the car is not at home for the next journey.
    pub used_car:          bool,
    pub request_buffer:    Arc<RequestBuffer>,
    pub current_itinerary: Option<Itinerary>,
}

impl Traveller {
    pub fn new(home: GeoPoint, has_car: bool, has_bike: bool, use_flexibus: bool) -> Self {
        Self {
            home,
            has_car,
            has_bike,
            use_flexibus,
            used_car: false,
            request_buffer: Arc::new(RequestBuffer::new()),
            current_itinerary: None,
        }
    }

    pub fn is_at_home(&self, position: GeoPoint) -> bool {
        self.home.distance_m(position) < AT_HOME_M
    }
}

/// A fleet vehicle serving timetabled trips.
pub struct Vehicle {
    pub fleet:        Arc<Fleet>,
    pub cabin:        Arc<Cabin>,
    pub current_trip: Option<Arc<Trip>>,
    pub current_stop: Option<Arc<Stop>>,
    /// Departure delay at the last stop, seconds.
    pub delay_secs:   f64,
}

impl std::fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vehicle")
            .field("current_trip", &self.current_trip)
            .field("delay_secs", &self.delay_secs)
            .finish_non_exhaustive()
    }
}

impl Vehicle {
    pub fn new(fleet: Arc<Fleet>, cabin: Arc<Cabin>) -> Self {
        Self { fleet, cabin, current_trip: None, current_stop: None, delay_secs: 0.0 }
    }
}

/// One simulated entity.
pub struct Entity {
    pub id:          EntityId,
    pub kind:        EntityKind,
    pub position:    GeoPoint,
    pub knowledge:   KnowledgeHandle,
    pub utility:     Arc<dyn UtilityStrategy>,
    pub preferences: Preferences,

    pub traveller: Option<Traveller>,
    pub vehicle:   Option<Vehicle>,
    pub agency:    Option<TransportAgency>,
}

impl Entity {
    pub fn new(
        id:        EntityId,
        kind:      EntityKind,
        position:  GeoPoint,
        knowledge: KnowledgeHandle,
        utility:   Arc<dyn UtilityStrategy>,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            knowledge,
            utility,
            preferences: Preferences::default(),
            traveller: None,
            vehicle: None,
            agency: None,
        }
    }

    /// Where the entity is right now.  Renderers and output writers poll
    /// this instead of being notified of moves.
    #[inline]
    pub fn current_position(&self) -> GeoPoint {
        self.position
    }

    fn missing(&self, capability: &'static str) -> AgentError {
        AgentError::MissingCapability { entity: self.id, capability }
    }

    pub fn traveller(&self) -> AgentResult<&Traveller> {
        self.traveller.as_ref().ok_or_else(|| self.missing("traveller"))
    }

    pub fn traveller_mut(&mut self) -> AgentResult<&mut Traveller> {
        let id = self.id;
        self.traveller
            .as_mut()
            .ok_or(AgentError::MissingCapability { entity: id, capability: "traveller" })
    }

    pub fn vehicle(&self) -> AgentResult<&Vehicle> {
        self.vehicle.as_ref().ok_or_else(|| self.missing("vehicle"))
    }

    pub fn vehicle_mut(&mut self) -> AgentResult<&mut Vehicle> {
        let id = self.id;
        self.vehicle
            .as_mut()
            .ok_or(AgentError::MissingCapability { entity: id, capability: "vehicle" })
    }

    pub fn agency_mut(&mut self) -> AgentResult<&mut TransportAgency> {
        let id = self.id;
        self.agency
            .as_mut()
            .ok_or(AgentError::MissingCapability { entity: id, capability: "agency" })
    }

    /// `true` if the entity is a person standing at their home.
    pub fn is_at_home(&self) -> bool {
        self.traveller.as_ref().is_some_and(|t| t.is_at_home(self.position))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
