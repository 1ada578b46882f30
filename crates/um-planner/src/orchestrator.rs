//! Asynchronous fan-out of planning rounds to a fixed worker pool.
//!
//! Activities call [`PlanningOrchestrator::submit`] while the tick runs.  The
//! simulation driver calls [`dispatch_pending`](PlanningOrchestrator::dispatch_pending)
//! once per tick; every round collected so far becomes one batch sharing a
//! [`CountDownLatch`], and the driver keeps the returned [`BatchHandle`] to
//! wait on at teardown.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use um_core::{EntityId, RequestId};

use crate::{
    CountDownLatch, FlexiBusPlanner, JourneyRequest, Planner, PlannerError, PlannerResult,
    RequestBuffer, dispatch_round,
};

/// Sizing of the planning pool.
#[derive(Clone, Debug)]
pub struct PlanningConfig {
    /// Allow several rounds to hit the backends concurrently.  When `false`
    /// the pool has one thread per planner backend.
    pub parallel_client_requests: bool,
    /// Worker threads per available core when parallel requests are on.
    pub threads_per_core: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self { parallel_client_requests: true, threads_per_core: 8 }
    }
}

impl PlanningConfig {
    fn pool_size(&self, backends: usize) -> usize {
        if self.parallel_client_requests {
            let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
            (cores * self.threads_per_core).max(1)
        } else {
            backends.max(1)
        }
    }
}

struct PlanningRound {
    requests: Vec<JourneyRequest>,
    buffer:   Arc<RequestBuffer>,
}

/// Completion handle for one dispatched batch.
#[derive(Clone, Debug)]
pub struct BatchHandle {
    latch: Arc<CountDownLatch>,
    size:  usize,
}

impl BatchHandle {
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_done(&self) -> bool {
        self.latch.count() == 0
    }

    /// Block until every round of the batch has published its results.
    pub fn wait(&self) {
        self.latch.wait();
    }
}

pub struct PlanningOrchestrator {
    pool:         ThreadPool,
    planners:     Vec<Arc<dyn Planner>>,
    flexibus:     Option<Arc<dyn FlexiBusPlanner>>,
    pending:      Mutex<Vec<PlanningRound>>,
    next_planner: AtomicUsize,
    next_req_id:  AtomicU64,
}

impl PlanningOrchestrator {
    /// Build the orchestrator and its worker pool.
    ///
    /// At least one regular planner backend is required.
    pub fn new(
        config:   &PlanningConfig,
        planners: Vec<Arc<dyn Planner>>,
        flexibus: Option<Arc<dyn FlexiBusPlanner>>,
    ) -> PlannerResult<Self> {
        if planners.is_empty() {
            return Err(PlannerError::Config("no planner backends configured".into()));
        }
        let threads = config.pool_size(planners.len());
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("planner-{i}"))
            .build()?;
        log::info!(
            "planning pool: {threads} threads, {} backend(s), flexible bus {}",
            planners.len(),
            if flexibus.is_some() { "on" } else { "off" }
        );
        Ok(Self {
            pool,
            planners,
            flexibus,
            pending: Mutex::new(Vec::new()),
            next_planner: AtomicUsize::new(0),
            next_req_id: AtomicU64::new(0),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Fresh id shared by all requests of one planning round.
    pub fn next_request_id(&self) -> RequestId {
        RequestId(self.next_req_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Queue a round for the next dispatch.  The buffer is reset right away
    /// so the caller never observes a stale `processed` flag.
    pub fn submit(&self, requests: Vec<JourneyRequest>, buffer: Arc<RequestBuffer>) {
        buffer.reset();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PlanningRound { requests, buffer });
    }

    pub fn pending_rounds(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Hand every queued round to the pool as one batch.  Returns `None`
    /// when nothing was queued.  Never blocks on the workers.
    pub fn dispatch_pending(&self) -> Option<BatchHandle> {
        let rounds = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        if rounds.is_empty() {
            return None;
        }

        let size = rounds.len();
        let latch = Arc::new(CountDownLatch::new(size));
        for round in rounds {
            let idx = self.next_planner.fetch_add(1, Ordering::Relaxed) % self.planners.len();
            let planner = Arc::clone(&self.planners[idx]);
            let flexibus = self.flexibus.clone();
            let latch = Arc::clone(&latch);
            self.pool.spawn(move || {
                dispatch_round(&round.requests, &round.buffer, planner.as_ref(), flexibus.as_deref());
                latch.count_down();
            });
        }
        log::trace!("dispatched {size} planning round(s)");
        Some(BatchHandle { latch, size })
    }

    /// Drop the flexible-bus registration of `entity`, if a flexible-bus
    /// planner is configured.
    pub fn unregister_flexibus(&self, entity: EntityId) {
        if let Some(flexibus) = &self.flexibus {
            flexibus.unregister(entity);
        }
    }
}
