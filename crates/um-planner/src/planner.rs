//! Planner backend traits and the per-round dispatch unit.

use um_core::EntityId;

use crate::{Itinerary, JourneyRequest, PlannerResult, RequestBuffer};

/// Attempts per regular request before it is abandoned for the round.
pub const MAX_ATTEMPTS: usize = 2;

/// A journey-planning backend.
///
/// Implementations are shared across planning worker threads, so they must
/// be `Send + Sync`; per-request state belongs in the call, not the planner.
pub trait Planner: Send + Sync {
    /// Plan `request`, appending candidates to `out`.
    ///
    /// `Ok(Some(n))` reports `n` appended itineraries, `Ok(None)` means the
    /// backend had no answer.  `Err` is a failed call and may be retried.
    fn request_single_journey(
        &self,
        request: &JourneyRequest,
        out:     &mut Vec<Itinerary>,
    ) -> PlannerResult<Option<usize>>;
}

/// The on-demand flexible-bus planner.  It keeps per-entity registrations
/// that must be dropped once the entity has its answer.
pub trait FlexiBusPlanner: Planner {
    fn unregister(&self, entity: EntityId);
}

/// Process one planning round and publish its results into `buffer`.
///
/// Regular requests are retried up to [`MAX_ATTEMPTS`] times and stop at the
/// first `Some`.  Flexible-bus requests get a single best-effort call and are
/// skipped when no flexible-bus planner is configured.  Failures never
/// propagate: whatever was found is published and `processed` is set.
pub fn dispatch_round(
    requests: &[JourneyRequest],
    buffer:   &RequestBuffer,
    regular:  &dyn Planner,
    flexibus: Option<&dyn FlexiBusPlanner>,
) {
    buffer.reset();
    let mut results = Vec::new();

    for request in requests {
        if request.targets_flexibus() {
            let Some(flexibus) = flexibus else {
                log::debug!("no flexible-bus planner; skipping request {}#{}", request.req_id, request.req_number);
                continue;
            };
            let mut out = Vec::new();
            match flexibus.request_single_journey(request, &mut out) {
                Ok(Some(_)) => results.append(&mut out),
                Ok(None) => {}
                Err(e) => log::warn!("flexible-bus request {}#{} failed: {e}", request.req_id, request.req_number),
            }
            continue;
        }

        let mut answered = false;
        for attempt in 1..=MAX_ATTEMPTS {
            let mut out = Vec::new();
            match regular.request_single_journey(request, &mut out) {
                Ok(Some(_)) => {
                    results.append(&mut out);
                    answered = true;
                    break;
                }
                Ok(None) => {}
                Err(e) => log::debug!(
                    "request {}#{} attempt {attempt}/{MAX_ATTEMPTS} failed: {e}",
                    request.req_id,
                    request.req_number
                ),
            }
        }
        if !answered {
            log::warn!(
                "abandoning request {}#{} of {} after {MAX_ATTEMPTS} attempts",
                request.req_id,
                request.req_number,
                request.entity
            );
        }
    }

    buffer.append(results);
    buffer.mark_processed();
}
