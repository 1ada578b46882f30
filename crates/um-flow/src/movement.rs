//! Time-stepped traversal of segment paths.
//!
//! Every mode moves the same way: [`SegmentWalker`] spends the tick budget
//! along the path, emitting one [`TravelExperience`] per completed segment.
//! What differs between driving, cycling, walking and transit is captured
//! by a [`MovementProfile`]: the speed on a segment, the cost of crossing
//! it, the mode tag, and whether the mover counts as a vehicle for
//! congestion.
//!
//! ```text
//!   seg 0          seg 1              seg 2
//! ●────────────●──────────────────●──────────●
//!          ▲ progress_m             entered: occupancy held
//!          └ position after this tick
//! ```

use std::sync::Arc;

use um_core::{GeoPoint, TransportMode, TripId};
use um_knowledge::{Experience, TravelExperience};
use um_world::{SegmentPath, StreetSegment};

use crate::{ActivityCtx, FlowResult};

// ── Cost constants ────────────────────────────────────────────────────────────

pub const CAR_COST_PER_M: f64 = 0.00035;
pub const TAXI_BASE_FARE: f64 = 3.0;
pub const TAXI_COST_PER_M: f64 = 0.0004;
pub const BICYCLE_COST_PER_M: f64 = 0.000005;
pub const BUS_COST_PER_M: f64 = 0.0008;

/// Mode-specific parameters of a traversal.
pub trait MovementProfile {
    /// Mode tag written into travel experiences.
    fn mode(&self) -> TransportMode;

    /// Speed on `segment`, m/s.
    fn speed(&self, segment: &StreetSegment) -> f64;

    /// Cost of crossing `segment` as part of a path of `path_len` segments.
    fn cost(&self, segment: &StreetSegment, path_len: usize) -> f64;

    /// Motor vehicles hold the occupancy counter of the segment they are on.
    fn holds_occupancy(&self) -> bool;
}

/// How a movement activity travels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveMode {
    Drive { taxi: bool },
    Cycle,
    Walk,
    /// A person on a flexible bus or an untimetabled transit leg.
    Bus { mode: TransportMode },
    /// A transit vehicle driving its trip between two stops.
    DriveToNextStop { mode: TransportMode },
}

impl MovementProfile for MoveMode {
    fn mode(&self) -> TransportMode {
        match *self {
            MoveMode::Drive { .. } => TransportMode::Car,
            MoveMode::Cycle => TransportMode::Bicycle,
            MoveMode::Walk => TransportMode::Walk,
            MoveMode::Bus { mode } | MoveMode::DriveToNextStop { mode } => mode,
        }
    }

    fn speed(&self, segment: &StreetSegment) -> f64 {
        match self {
            MoveMode::Cycle => segment.cycling_speed(),
            MoveMode::Walk => segment.walking_speed(),
            _ => segment.driving_speed(),
        }
    }

    fn cost(&self, segment: &StreetSegment, path_len: usize) -> f64 {
        let len = segment.length_m;
        match self {
            MoveMode::Drive { taxi: false } => len * CAR_COST_PER_M,
            MoveMode::Drive { taxi: true } => {
                TAXI_BASE_FARE / path_len.max(1) as f64 + len * TAXI_COST_PER_M
            }
            MoveMode::Cycle => len * BICYCLE_COST_PER_M,
            MoveMode::Walk => 0.0,
            MoveMode::Bus { .. } | MoveMode::DriveToNextStop { .. } => len * BUS_COST_PER_M,
        }
    }

    fn holds_occupancy(&self) -> bool {
        matches!(
            self,
            MoveMode::Drive { .. } | MoveMode::Bus { .. } | MoveMode::DriveToNextStop { .. }
        )
    }
}

// ── SegmentWalker ─────────────────────────────────────────────────────────────

/// Progress along a segment path.
#[derive(Debug)]
pub struct SegmentWalker {
    path:  SegmentPath,
    index: usize,
    /// Metres covered on `path[index]`.
    progress_m: f64,
    /// Seconds spent on `path[index]` so far.
    segment_secs: f64,
    segment_start_ms: i64,
    /// Index of the segment whose occupancy counter we hold.
    holding: Option<usize>,
    started: bool,
    position: Option<GeoPoint>,
    finished: bool,
    experiences: Vec<TravelExperience>,
}

impl SegmentWalker {
    pub fn new(path: SegmentPath) -> Self {
        let position = path.first().map(|s| s.start);
        Self {
            path,
            index: 0,
            progress_m: 0.0,
            segment_secs: 0.0,
            segment_start_ms: 0,
            holding: None,
            started: false,
            position,
            finished: false,
            experiences: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current position; `None` for an empty path.
    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    pub fn path(&self) -> &[Arc<StreetSegment>] {
        &self.path
    }

    /// Experiences of the segments completed so far.
    pub fn take_experiences(&mut self) -> Vec<TravelExperience> {
        std::mem::take(&mut self.experiences)
    }

    fn enter(&mut self, profile: &impl MovementProfile, now_ms: i64) {
        self.segment_start_ms = now_ms;
        if profile.holds_occupancy() && self.holding != Some(self.index) {
            self.path[self.index].enter();
            self.holding = Some(self.index);
        }
    }

    fn release(&mut self) {
        if let Some(i) = self.holding.take() {
            self.path[i].leave();
        }
    }

    /// Spend up to `budget` seconds moving.  `now_ms` is the time at which
    /// this budget starts.  Returns the seconds left over, which is non-zero
    /// only when the path end was reached.
    pub fn advance(
        &mut self,
        profile:    &impl MovementProfile,
        budget:     f64,
        now_ms:     i64,
        fill_level: f64,
        trip_id:    Option<&TripId>,
    ) -> f64 {
        if self.finished {
            return budget;
        }
        if self.index >= self.path.len() {
            self.finished = true;
            return budget;
        }
        if !self.started {
            self.started = true;
            self.enter(profile, now_ms);
        }

        let mut elapsed = 0.0;
        while elapsed < budget {
            let seg = Arc::clone(&self.path[self.index]);
            let speed = profile.speed(&seg);
            let here = seg.point_at(self.progress_m);
            let to_end = here.distance_m(seg.end);
            let coverable = speed * (budget - elapsed);

            if coverable >= to_end {
                let needed = if to_end > 0.0 { to_end / speed } else { 0.0 };
                elapsed += needed;
                self.segment_secs += needed;
                let end_ms = now_ms + (elapsed * 1000.0) as i64;
                self.experiences.push(TravelExperience {
                    segment_id:          seg.id,
                    length_m:            seg.length_m,
                    travel_time_secs:    self.segment_secs,
                    cost:                profile.cost(&seg, self.path.len()),
                    mode:                profile.mode(),
                    start_ms:            self.segment_start_ms,
                    end_ms,
                    vehicles_on_segment: seg.occupancy(),
                    fill_level,
                    trip_id:             trip_id.cloned(),
                });
                self.release();
                self.position = Some(seg.end);
                self.index += 1;
                self.progress_m = 0.0;
                self.segment_secs = 0.0;
                if self.index == self.path.len() {
                    self.finished = true;
                    break;
                }
                self.enter(profile, end_ms);
            } else {
                self.progress_m += coverable;
                self.segment_secs += budget - elapsed;
                self.position = Some(seg.point_at(self.progress_m));
                elapsed = budget;
            }
        }
        (budget - elapsed).max(0.0)
    }
}

impl Drop for SegmentWalker {
    /// A walker dropped mid-path (e.g. at the end of a run) still gives the
    /// segment back.
    fn drop(&mut self) {
        self.release();
    }
}

// ── Movement activity ─────────────────────────────────────────────────────────

/// Move the entity along a path with a [`MoveMode`].
#[derive(Debug)]
pub struct Movement {
    pub mode: MoveMode,
    walker:   SegmentWalker,
    /// Fill level recorded for a person's bus travel.
    fill_level: f64,
}

impl Movement {
    pub fn new(mode: MoveMode, path: SegmentPath) -> Self {
        Self { mode, walker: SegmentWalker::new(path), fill_level: 0.0 }
    }

    pub fn with_fill_level(mut self, fill_level: f64) -> Self {
        self.fill_level = fill_level;
        self
    }

    pub fn walker(&self) -> &SegmentWalker {
        &self.walker
    }

    pub fn is_finished(&self) -> bool {
        self.walker.is_finished()
    }

    pub(crate) fn execute(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        let now_ms = ctx.now_ms();

        // A transit vehicle carries its trip, its cabin and its riders along.
        let (fill, trip, cabin) = match self.mode {
            MoveMode::DriveToNextStop { .. } => {
                let vehicle = ctx.entity.vehicle()?;
                let trip = vehicle.current_trip.as_ref().map(|t| t.id.clone());
                (vehicle.cabin.fill_level(), trip, Some(Arc::clone(&vehicle.cabin)))
            }
            _ => (self.fill_level, None, None),
        };

        let left = self.walker.advance(&self.mode, dt, now_ms, fill, trip.as_ref());
        if let Some(pos) = self.walker.position() {
            ctx.entity.position = pos;
            if let Some(cabin) = &cabin {
                cabin.set_position(pos);
            }
        }

        if self.walker.is_finished() {
            let experiences = self.walker.take_experiences();
            let riders = cabin.map(|c| c.rider_knowledge()).unwrap_or_default();
            for ex in experiences {
                for rider in &riders {
                    rider.collect(Experience::Travel(ex.clone()));
                }
                ctx.entity.knowledge.collect(Experience::Travel(ex));
            }
        }
        Ok(left)
    }
}
