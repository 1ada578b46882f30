//! Persistent experience storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use um_core::{EntityId, SegmentId, StopId, TransportMode};

use crate::{Experience, KnowledgeResult};

/// Whose experiences a store lookup or write refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KnowledgeScope {
    Entity(EntityId),
    Global,
}

/// Learned travel conditions on one segment for one mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentEstimate {
    pub travel_time_secs: f64,
    pub fill_level:       f64,
    pub samples:          u32,
}

/// Backend that persists experience batches and answers estimates.
///
/// `add_entries` runs on knowledge-exchange workers and may do blocking I/O.
pub trait ExperienceStore: Send + Sync {
    fn add_entries(&self, scope: KnowledgeScope, entries: &[Experience]) -> KnowledgeResult<()>;

    /// Learned estimate, or `None` if nothing is known.
    fn estimate_segment(
        &self,
        scope:   KnowledgeScope,
        segment: SegmentId,
        mode:    TransportMode,
    ) -> Option<SegmentEstimate>;
}

#[derive(Default, Clone, Copy)]
struct Running {
    sum_time: f64,
    sum_fill: f64,
    n:        u32,
}

#[derive(Default)]
struct Tables {
    segments: HashMap<(KnowledgeScope, SegmentId, TransportMode), Running>,
    stops:    HashMap<(KnowledgeScope, StopId), (f64, u32)>,
}

/// Running means kept in memory, keyed by scope, segment and mode.
#[derive(Default)]
pub struct InMemoryExperienceStore {
    tables: Mutex<Tables>,
}

impl InMemoryExperienceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mean departure delay recorded at `stop`, seconds.
    pub fn mean_stop_delay(&self, scope: KnowledgeScope, stop: &StopId) -> Option<f64> {
        self.lock()
            .stops
            .get(&(scope, stop.clone()))
            .map(|&(sum, n)| sum / n as f64)
    }

    /// Number of (scope, segment, mode) keys learned so far.
    pub fn segment_entries(&self) -> usize {
        self.lock().segments.len()
    }
}

impl ExperienceStore for InMemoryExperienceStore {
    fn add_entries(&self, scope: KnowledgeScope, entries: &[Experience]) -> KnowledgeResult<()> {
        let mut tables = self.lock();
        for entry in entries {
            match entry {
                Experience::Travel(t) => {
                    let r = tables.segments.entry((scope, t.segment_id, t.mode)).or_default();
                    r.sum_time += t.travel_time_secs;
                    r.sum_fill += t.fill_level;
                    r.n += 1;
                }
                Experience::Stop(s) => {
                    let r = tables.stops.entry((scope, s.stop_id.clone())).or_insert((0.0, 0));
                    r.0 += s.delay_secs;
                    r.1 += 1;
                }
            }
        }
        Ok(())
    }

    fn estimate_segment(
        &self,
        scope:   KnowledgeScope,
        segment: SegmentId,
        mode:    TransportMode,
    ) -> Option<SegmentEstimate> {
        let tables = self.lock();
        let r = tables.segments.get(&(scope, segment, mode))?;
        (r.n > 0).then(|| SegmentEstimate {
            travel_time_secs: r.sum_time / r.n as f64,
            fill_level:       r.sum_fill / r.n as f64,
            samples:          r.n,
        })
    }
}
