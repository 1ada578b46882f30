//! Store-backed knowledge with a local experience buffer.

use std::sync::{Arc, Mutex, PoisonError};

use um_planner::{Itinerary, Leg};

use crate::{Experience, ExperienceStore, Knowledge, KnowledgeExchange, KnowledgeScope};

/// Buffers experiences until [`flush`](Knowledge::flush), then writes them
/// to the store through the exchange pool.  Predictions read the store in
/// the same scope the entity writes to.
pub struct LocalKnowledge {
    scope:    KnowledgeScope,
    store:    Arc<dyn ExperienceStore>,
    exchange: Arc<KnowledgeExchange>,
    pending:  Mutex<Vec<Experience>>,
}

impl LocalKnowledge {
    pub fn new(scope: KnowledgeScope, store: Arc<dyn ExperienceStore>, exchange: Arc<KnowledgeExchange>) -> Self {
        Self { scope, store, exchange, pending: Mutex::new(Vec::new()) }
    }

    pub fn scope(&self) -> KnowledgeScope {
        self.scope
    }

    /// Experiences collected since the last flush.
    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Predicted duration of `leg` and the highest learned fill level along
    /// it.  Segments without an estimate keep their share of the planner's
    /// duration, proportional to length.  `None` if nothing is known.
    fn predict_leg(&self, leg: &Leg) -> Option<(f64, Option<f64>)> {
        let mut duration = 0.0;
        let mut fill: Option<f64> = None;
        let mut known = false;
        for seg in &leg.segments {
            match self.store.estimate_segment(self.scope, seg.id, leg.mode) {
                Some(est) => {
                    known = true;
                    duration += est.travel_time_secs;
                    if leg.is_transit() {
                        fill = Some(fill.map_or(est.fill_level, |f: f64| f.max(est.fill_level)));
                    }
                }
                None if leg.distance_m > 0.0 => {
                    duration += leg.duration_secs * seg.length_m / leg.distance_m;
                }
                None => {}
            }
        }
        known.then_some((duration, fill))
    }
}

impl Knowledge for LocalKnowledge {
    fn collect(&self, experience: Experience) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).push(experience);
    }

    fn predict(&self, itineraries: &mut [Itinerary]) {
        for it in itineraries {
            let mut delta = 0.0;
            let mut fill: Option<f64> = None;
            for leg in &mut it.legs {
                let Some((duration, leg_fill)) = self.predict_leg(leg) else {
                    continue;
                };
                delta += duration - leg.duration_secs;
                leg.duration_secs = duration;
                if let Some(f) = leg_fill {
                    fill = Some(fill.map_or(f, |g: f64| g.max(f)));
                }
            }
            it.duration_secs = (it.duration_secs + delta).max(0.0);
            if let Some(f) = fill {
                it.fill_level = f;
            }
        }
    }

    fn flush(&self) {
        let batch = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        if batch.is_empty() {
            return;
        }
        log::trace!("flushing {} experiences for {:?}", batch.len(), self.scope);
        self.exchange.submit(Arc::clone(&self.store), self.scope, batch);
    }
}
