//! Seeded randomness for building scenarios.
//!
//! The tick loop itself draws no random numbers.  Scenario builders use one
//! [`EntityRng`] per entity to pick homes, workplaces, car ownership and
//! departure times, so a population is the same on every run with the same
//! seed, and appending entities leaves earlier ones untouched.

use chrono::TimeDelta;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::EntityId;

/// Golden-ratio multiplier spreading consecutive ids over the seed space.
const SEED_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// Random draws owned by one entity.
pub struct EntityRng(SmallRng);

impl EntityRng {
    pub fn new(scenario_seed: u64, entity: EntityId) -> Self {
        let seed = scenario_seed ^ u64::from(entity.0).wrapping_mul(SEED_SPREAD);
        EntityRng(SmallRng::seed_from_u64(seed))
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p`; out-of-range `p` is clamped.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }

    /// A whole-minute offset in `[0, window)`, e.g. to spread departures
    /// over a morning peak.  Windows shorter than a minute give zero.
    pub fn jitter_minutes(&mut self, window: TimeDelta) -> TimeDelta {
        let minutes = window.num_minutes();
        if minutes <= 0 {
            return TimeDelta::zero();
        }
        TimeDelta::minutes(self.0.gen_range(0..minutes))
    }
}
