//! Per-entity planning result mailbox.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Itinerary;

/// Results of one planning round for one entity.
///
/// Exactly one dispatch unit writes the buffer per round and flips
/// `processed` from `false` to `true` once, with Release ordering.  The
/// owning entity reads the itineraries only after observing `true`.
#[derive(Debug, Default)]
pub struct RequestBuffer {
    processed:   AtomicBool,
    itineraries: Mutex<Vec<Itinerary>>,
}

impl RequestBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Itinerary>> {
        self.itineraries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new round: drop old results and clear the flag.
    pub fn reset(&self) {
        self.lock().clear();
        self.processed.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.processed.load(Ordering::Acquire)
    }

    pub fn mark_processed(&self) {
        self.processed.store(true, Ordering::Release);
    }

    pub fn append(&self, results: Vec<Itinerary>) {
        self.lock().extend(results);
    }

    /// Move the results out, leaving the buffer empty.
    pub fn take(&self) -> Vec<Itinerary> {
        std::mem::take(&mut *self.lock())
    }

    /// Copy of the current results.
    pub fn itineraries(&self) -> Vec<Itinerary> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
