//! Worker pool that moves flushed experience batches into stores.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{Experience, ExperienceStore, KnowledgeResult, KnowledgeScope};

/// Fixed-size pool for blocking store writes, with in-flight tracking so
/// teardown can wait for every submitted batch.
pub struct KnowledgeExchange {
    pool:      ThreadPool,
    in_flight: Arc<(Mutex<usize>, Condvar)>,
}

impl KnowledgeExchange {
    /// Threads per available core used by [`with_default_size`](Self::with_default_size).
    pub const THREADS_PER_CORE: usize = 4;

    pub fn new(threads: usize) -> KnowledgeResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("knowledge-{i}"))
            .build()?;
        log::info!("knowledge-exchange pool: {} threads", pool.current_num_threads());
        Ok(Self { pool, in_flight: Arc::new((Mutex::new(0), Condvar::new())) })
    }

    pub fn with_default_size() -> KnowledgeResult<Self> {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(cores * Self::THREADS_PER_CORE)
    }

    pub fn pool_size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue `batch` for `store`.  Store failures are logged and dropped.
    pub fn submit(&self, store: Arc<dyn ExperienceStore>, scope: KnowledgeScope, batch: Vec<Experience>) {
        if batch.is_empty() {
            return;
        }
        *self.in_flight.0.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        let in_flight = Arc::clone(&self.in_flight);
        self.pool.spawn(move || {
            if let Err(e) = store.add_entries(scope, &batch) {
                log::warn!("dropping {} experiences for {scope:?}: {e}", batch.len());
            }
            let (count, idle) = &*in_flight;
            let mut n = count.lock().unwrap_or_else(PoisonError::into_inner);
            *n -= 1;
            if *n == 0 {
                idle.notify_all();
            }
        });
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every submitted batch has been written.
    pub fn wait_idle(&self) {
        let (count, idle) = &*self.in_flight;
        let mut n = count.lock().unwrap_or_else(PoisonError::into_inner);
        while *n > 0 {
            n = idle.wait(n).unwrap_or_else(PoisonError::into_inner);
        }
    }
}
