//! What an activity sees while it executes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};

use um_agent::{Entity, EnsembleRegistry};
use um_core::{EntityId, SimClock, StopId};
use um_planner::PlanningOrchestrator;
use um_transit::Stop;
use um_world::StreetMap;

use crate::Activity;

/// Shared simulation services, owned by the driver.
///
/// Activities borrow it immutably; the only mutation during a tick goes
/// through the interior locks of the orchestrator, the ensemble registry
/// and the stops.
pub struct SimContext {
    pub clock:     SimClock,
    pub planning:  Arc<PlanningOrchestrator>,
    pub ensembles: EnsembleRegistry,
    pub stops:     HashMap<StopId, Arc<Stop>>,
    pub map:       Option<Arc<StreetMap>>,
}

impl SimContext {
    pub fn new(clock: SimClock, planning: Arc<PlanningOrchestrator>) -> Self {
        Self {
            clock,
            planning,
            ensembles: EnsembleRegistry::new(),
            stops: HashMap::new(),
            map: None,
        }
    }

    pub fn with_map(mut self, map: Arc<StreetMap>) -> Self {
        self.map = Some(map);
        self
    }

    pub fn add_stop(&mut self, stop: Arc<Stop>) {
        self.stops.insert(stop.id.clone(), stop);
    }

    pub fn stop(&self, id: &StopId) -> Option<&Arc<Stop>> {
        self.stops.get(id)
    }
}

/// A command for another entity, applied by the driver after the
/// producing entity's step.
#[derive(Debug)]
pub enum Effect {
    /// Append `activity` to `target`'s flow.
    Assign { target: EntityId, activity: Activity },
}

/// Per-execution view: the entity being stepped, the shared services and
/// the outputs collected along the way.
pub struct ActivityCtx<'a> {
    pub entity: &'a mut Entity,
    pub sim:    &'a SimContext,
    /// Seconds of the current tick already used by earlier activities.
    pub offset_secs: f64,

    follow_ups: Vec<Activity>,
    effects:    Vec<Effect>,
}

impl<'a> ActivityCtx<'a> {
    pub fn new(entity: &'a mut Entity, sim: &'a SimContext) -> Self {
        Self { entity, sim, offset_secs: 0.0, follow_ups: Vec::new(), effects: Vec::new() }
    }

    /// Simulated time at this point of the tick.
    pub fn now(&self) -> NaiveDateTime {
        self.sim.clock.now() + TimeDelta::milliseconds((self.offset_secs * 1000.0) as i64)
    }

    pub fn now_ms(&self) -> i64 {
        self.now().and_utc().timestamp_millis()
    }

    /// Queue an activity behind the entity's current ones.
    pub fn follow_up(&mut self, activity: Activity) {
        self.follow_ups.push(activity);
    }

    pub fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub(crate) fn take_follow_ups(&mut self) -> Vec<Activity> {
        std::mem::take(&mut self.follow_ups)
    }

    /// Cross-entity commands produced so far.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}
