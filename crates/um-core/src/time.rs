//! Simulation time model.
//!
//! # Design
//!
//! Time advances in fixed steps.  The canonical counter is an integer `Tick`;
//! the mapping to calendar time is held in `SimClock`:
//!
//!   now = start + tick * tick_duration_secs
//!
//! Activities receive the step length as a floating-point `Δt` in seconds
//! ([`SimClock::delta_t`]) and report how much of it they did not consume.
//! Timetables are calendar-based (weekday buckets, validity windows, minute
//! matching) and read the current tick's `chrono` time through
//! [`SimClock::now`].

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and calendar time.
///
/// During a tick the clock reads the tick's *start* time; the driver calls
/// [`advance`](Self::advance) after every entity has been stepped.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Calendar time of tick 0.
    pub start: NaiveDateTime,
    /// Simulated seconds per tick (Δt).
    pub tick_duration_secs: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start: NaiveDateTime, tick_duration_secs: u32) -> Self {
        Self {
            start,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Step length in seconds, as handed to `Activity::execute`.
    #[inline]
    pub fn delta_t(&self) -> f64 {
        self.tick_duration_secs as f64
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Calendar time at the start of the current tick.
    #[inline]
    pub fn now(&self) -> NaiveDateTime {
        self.start + TimeDelta::seconds(self.elapsed_secs())
    }

    /// `now()` as milliseconds since the Unix epoch (UTC).
    #[inline]
    pub fn timestamp_ms(&self) -> i64 {
        self.now().and_utc().timestamp_millis()
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let now = self.now();
        write!(
            f,
            "{} ({} {:02}:{:02}:{:02})",
            self.current_tick,
            now.date(),
            now.hour(),
            now.minute(),
            now.second()
        )
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Agencies match departures by minute: a longer step jumps over some
/// minutes and their departures are never started.
pub const MAX_TICK_SECS: u32 = 60;

/// Top-level simulation configuration.
///
/// Typically deserialised (feature `serde`) or assembled by the application
/// crate and passed to `um_sim::SimBuilder`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Calendar time of tick 0.
    pub start: NaiveDateTime,

    /// Seconds per tick (Δt), at most [`MAX_TICK_SECS`].
    pub tick_duration_secs: u32,

    /// Total ticks to simulate.  One day at 30 s: 2_880.
    pub total_ticks: u64,

    /// Master RNG seed.
    pub seed: u64,

    /// Emit an entity snapshot every N ticks (0 disables snapshots).
    pub output_interval_ticks: u64,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start, self.tick_duration_secs)
    }

    /// Reject configurations the tick loop cannot run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(CoreError::Config("tick_duration_secs must be > 0".into()));
        }
        if self.tick_duration_secs > MAX_TICK_SECS {
            return Err(CoreError::Config(format!(
                "tick_duration_secs {} exceeds {MAX_TICK_SECS}: timetabled departures would be skipped",
                self.tick_duration_secs
            )));
        }
        Ok(())
    }
}
