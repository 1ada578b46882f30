//! The `Simulation` struct and its tick loop.

use std::sync::Arc;

use um_agent::EntityStore;
use um_core::{EntityId, SimConfig, Tick};
use um_flow::{ActivityCtx, DailySchedule, Effect, Flow, SimContext};
use um_knowledge::KnowledgeExchange;
use um_planner::BatchHandle;

use crate::{SimError, SimObserver, SimResult, TickStats};

/// The simulation driver.
///
/// Each tick runs five phases:
///
/// 1. **Release**: activities due by now leave each entity's
///    [`DailySchedule`] and join the tail of its flow.
/// 2. **Step**: every non-idle flow runs for Δt, in ascending `EntityId`
///    order.  Effects an entity produces are applied right after its own
///    step, so a target with a higher id acts on them in the same tick.
/// 3. **Dispatch**: planning rounds submitted during the step phase go to
///    the planning pool.
/// 4. **Congestion**: segment driving speeds are recomputed from occupancy.
/// 5. **Advance** the clock.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    pub config: SimConfig,

    /// Clock, orchestrator, ensembles, stops and street map.
    pub ctx: SimContext,

    pub entities: EntityStore,

    /// One flow per entity, indexed by `EntityId`.
    pub flows: Vec<Flow>,

    /// One schedule per entity, indexed by `EntityId`.
    pub schedules: Vec<DailySchedule>,

    pub(crate) exchange: Option<Arc<KnowledgeExchange>>,

    /// Planning batches that may still be running.
    pub(crate) batches: Vec<BatchHandle>,

    /// Wait for each tick's planning batch before moving on.
    pub(crate) blocking_planning: bool,
}

impl Simulation {
    // ── Public API ────────────────────────────────────────────────────────

    #[inline]
    pub fn tick(&self) -> Tick {
        self.ctx.clock.current_tick
    }

    /// Run from the current tick to `config.end_tick()`, then wait for
    /// outstanding background work.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        log::info!(
            "simulation start: {} entities, {} ticks of {}s from {}",
            self.entities.len(),
            self.config.total_ticks,
            self.config.tick_duration_secs,
            self.ctx.clock.now()
        );
        while self.tick() < self.config.end_tick() {
            self.observed_step(observer)?;
        }
        self.finish();
        observer.on_sim_end(self.tick());
        log::info!("simulation end at {} ({})", self.ctx.clock.now(), self.tick());
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_step(observer)?;
        }
        Ok(())
    }

    /// One tick without observer callbacks.
    pub fn step(&mut self) -> SimResult<TickStats> {
        match self.process_tick() {
            Ok(stats) => {
                self.ctx.clock.advance();
                Ok(stats)
            }
            Err(e) => {
                log::error!("aborting at {} ({}): {e}", self.ctx.clock.now(), self.tick());
                Err(e)
            }
        }
    }

    /// Block until every planning batch and every knowledge write handed
    /// out so far has completed.
    pub fn finish(&mut self) {
        self.wait_for_planning();
        if let Some(exchange) = &self.exchange {
            exchange.wait_idle();
        }
    }

    /// Block until every dispatched planning batch is done.
    pub fn wait_for_planning(&mut self) {
        for batch in self.batches.drain(..) {
            batch.wait();
        }
    }

    /// Entities whose flow is not idle.
    pub fn active_entities(&self) -> usize {
        self.flows.iter().filter(|f| !f.is_idle()).count()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn observed_step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let tick = self.tick();
        let now = self.ctx.clock.now();
        observer.on_tick_start(tick, now);
        let stats = self.step()?;
        observer.on_tick_end(tick, now, &stats);
        if self.config.output_interval_ticks > 0 && tick.0.is_multiple_of(self.config.output_interval_ticks) {
            observer.on_snapshot(tick, now, &self.entities, &self.flows);
        }
        Ok(())
    }

    fn process_tick(&mut self) -> SimResult<TickStats> {
        let now = self.ctx.clock.now();
        let dt = self.ctx.clock.delta_t();
        let mut stats = TickStats::default();

        // ── Phase 1: release scheduled activities ─────────────────────────
        for (flow, schedule) in self.flows.iter_mut().zip(&mut self.schedules) {
            for activity in schedule.pop_due(now) {
                flow.push(activity);
                stats.released += 1;
            }
        }

        // ── Phase 2: step flows in id order ───────────────────────────────
        for i in 0..self.flows.len() {
            if self.flows[i].is_idle() {
                continue;
            }
            stats.active += 1;
            let id = EntityId(i as u32);
            let entity = self.entities.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
            let mut ctx = ActivityCtx::new(entity, &self.ctx);
            self.flows[i].step(dt, &mut ctx)?;
            let effects = ctx.take_effects();

            for effect in effects {
                match effect {
                    Effect::Assign { target, activity } => {
                        log::trace!("{id} → {target}: {}", activity.name());
                        self.flows
                            .get_mut(target.index())
                            .ok_or(SimError::UnknownEntity(target))?
                            .push(activity);
                    }
                }
                stats.effects += 1;
            }
        }

        // ── Phase 3: hand planning rounds to the pool ─────────────────────
        self.batches.retain(|b| !b.is_done());
        if let Some(batch) = self.ctx.planning.dispatch_pending() {
            stats.planning_rounds = batch.len();
            if self.blocking_planning {
                batch.wait();
            } else {
                self.batches.push(batch);
            }
        }

        // ── Phase 4: congestion ───────────────────────────────────────────
        if let Some(map) = &self.ctx.map {
            map.update_segment_speeds();
            stats.occupancy = map.total_occupancy();
        }

        Ok(stats)
    }
}
