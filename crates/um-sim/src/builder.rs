//! Fluent builder for constructing a [`Simulation`].

use std::sync::Arc;

use um_agent::EntityStore;
use um_core::SimConfig;
use um_flow::{Activity, DailySchedule, Flow, SimContext, StartNextTrips};
use um_knowledge::KnowledgeExchange;
use um_planner::PlanningOrchestrator;
use um_transit::Stop;
use um_world::StreetMap;

use crate::{SimError, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Required inputs
///
/// - [`SimConfig`]: start time, Δt, total ticks, …
/// - [`EntityStore`]: from [`um_agent::EntityStoreBuilder`]
/// - [`PlanningOrchestrator`]: planner backends and the planning pool
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                          |
/// |---------------------------|----------------------------------|
/// | `.schedules(v)`           | All-empty `DailySchedule`s       |
/// | `.flows(v)`               | All-idle `Flow`s                 |
/// | `.map(m)`                 | No street map, no congestion     |
/// | `.stops(iter)`            | No stops: transit legs are skipped |
/// | `.exchange(x)`            | Nothing to wait for at the end   |
/// | `.blocking_planning(b)`   | `false`                          |
///
/// Every agency entity gets a `StartNextTrips` at the head of its flow.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, store, Arc::new(planning))
///     .schedules(schedules)
///     .map(map)
///     .stops(stops)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    entities:  EntityStore,
    planning:  Arc<PlanningOrchestrator>,
    schedules: Option<Vec<DailySchedule>>,
    flows:     Option<Vec<Flow>>,
    map:       Option<Arc<StreetMap>>,
    stops:     Vec<Arc<Stop>>,
    exchange:  Option<Arc<KnowledgeExchange>>,
    blocking_planning: bool,
}

impl SimBuilder {
    pub fn new(config: SimConfig, entities: EntityStore, planning: Arc<PlanningOrchestrator>) -> Self {
        Self {
            config,
            entities,
            planning,
            schedules: None,
            flows: None,
            map: None,
            stops: Vec::new(),
            exchange: None,
            blocking_planning: false,
        }
    }

    /// Per-entity daily schedules (must be length `entity_count`).
    pub fn schedules(mut self, schedules: Vec<DailySchedule>) -> Self {
        self.schedules = Some(schedules);
        self
    }

    /// Per-entity initial flows (must be length `entity_count`).
    pub fn flows(mut self, flows: Vec<Flow>) -> Self {
        self.flows = Some(flows);
        self
    }

    /// Street map whose segment speeds are updated after every tick.
    pub fn map(mut self, map: Arc<StreetMap>) -> Self {
        self.map = Some(map);
        self
    }

    /// Stops riders can board at.
    pub fn stops(mut self, stops: impl IntoIterator<Item = Arc<Stop>>) -> Self {
        self.stops.extend(stops);
        self
    }

    /// Exchange pool the knowledge handles write through; `finish` waits
    /// for it.
    pub fn exchange(mut self, exchange: Arc<KnowledgeExchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    /// Wait for each tick's planning batch before the clock advances.
    /// Runs become reproducible; planner latency becomes tick latency.
    pub fn blocking_planning(mut self, blocking: bool) -> Self {
        self.blocking_planning = blocking;
        self
    }

    /// Validate inputs, start the agencies and return a ready-to-run
    /// [`Simulation`].
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate().map_err(|e| SimError::Config(e.to_string()))?;
        let entity_count = self.entities.len();

        let schedules = match self.schedules {
            Some(s) => {
                if s.len() != entity_count {
                    return Err(SimError::EntityCountMismatch {
                        expected: entity_count,
                        got:      s.len(),
                        what:     "daily schedules",
                    });
                }
                s
            }
            None => (0..entity_count).map(|_| DailySchedule::new()).collect(),
        };

        let mut flows = match self.flows {
            Some(f) => {
                if f.len() != entity_count {
                    return Err(SimError::EntityCountMismatch {
                        expected: entity_count,
                        got:      f.len(),
                        what:     "flows",
                    });
                }
                f
            }
            None => (0..entity_count).map(|_| Flow::new()).collect(),
        };

        // ── Agencies scan their timetables every tick ─────────────────────
        let mut agencies = 0;
        for (entity, flow) in self.entities.iter().zip(&mut flows) {
            if entity.agency.is_some() {
                flow.push(Activity::StartNextTrips(StartNextTrips::new()));
                agencies += 1;
            }
        }

        let mut ctx = SimContext::new(self.config.make_clock(), self.planning);
        if let Some(map) = self.map {
            ctx = ctx.with_map(map);
        }
        for stop in self.stops {
            ctx.add_stop(stop);
        }
        log::info!(
            "built simulation: {entity_count} entities, {agencies} agencies, {} stops",
            ctx.stops.len()
        );

        Ok(Simulation {
            config: self.config,
            ctx,
            entities: self.entities,
            flows,
            schedules,
            exchange: self.exchange,
            batches: Vec::new(),
            blocking_planning: self.blocking_planning,
        })
    }
}
