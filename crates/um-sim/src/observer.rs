//! Simulation observer trait for progress reporting and data collection.

use chrono::NaiveDateTime;

use um_agent::EntityStore;
use um_core::Tick;
use um_flow::Flow;

/// What happened during one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Entities whose flow had something to do.
    pub active:          usize,
    /// Activities released from daily schedules.
    pub released:        usize,
    /// Cross-entity effects applied.
    pub effects:         usize,
    /// Planning rounds handed to the pool.
    pub planning_rounds: usize,
    /// Vehicles on street segments once every entity was stepped.
    pub occupancy:       u64,
}

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress { interval: u64 }
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, tick: Tick, now: NaiveDateTime, stats: &TickStats) {
///         if tick.0 % self.interval == 0 {
///             println!("{now}: {} active", stats.active);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick, _now: NaiveDateTime) {}

    /// Called once every entity has been stepped and planning dispatched.
    fn on_tick_end(&mut self, _tick: Tick, _now: NaiveDateTime, _stats: &TickStats) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks).  Positions are pulled with `Entity::current_position`; the
    /// flows tell what each entity is doing.
    fn on_snapshot(
        &mut self,
        _tick:     Tick,
        _now:      NaiveDateTime,
        _entities: &EntityStore,
        _flows:    &[Flow],
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
