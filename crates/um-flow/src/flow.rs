//! An entity's activity queue.

use std::collections::VecDeque;

use crate::{Activity, ActivityCtx, FlowResult};

/// Ordered queue of activities; the head is the current one.
///
/// # Carry-over
///
/// Time an activity does not use within a tick is handed to the next one
/// right away:
///
/// ```text
/// dt = 60 s   │ Walk (finishes after 20 s) │ CorrectPosition (0 s) │ Learn (0 s) │ Drive … 40 s │
/// ```
///
/// The chain stops when the budget is spent, the current activity is still
/// running, or the queue is empty.
#[derive(Debug, Default)]
pub struct Flow {
    queue: VecDeque<Activity>,
}

impl Flow {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Append to the tail.
    pub fn push(&mut self, activity: Activity) {
        self.queue.push_back(activity);
    }

    /// The activity that runs next tick.
    pub fn current(&self) -> Option<&Activity> {
        self.queue.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.queue.iter()
    }

    /// Run activities for one tick of `dt` seconds.  Returns the time left
    /// unused.  Follow-ups produced along the way join the tail of the
    /// queue; effects stay in `ctx` for the driver.
    pub fn step(&mut self, dt: f64, ctx: &mut ActivityCtx<'_>) -> FlowResult<f64> {
        let mut budget = dt;
        while let Some(current) = self.queue.front_mut() {
            ctx.offset_secs = dt - budget;
            let left = current.execute(budget, ctx)?;
            let finished = current.is_finished();
            log::trace!(
                "{}: {} used {:.1}s{}",
                ctx.entity.id,
                current.name(),
                budget - left,
                if finished { ", finished" } else { "" }
            );
            self.queue.extend(ctx.take_follow_ups());
            if !finished {
                return Ok(left);
            }
            self.queue.pop_front();
            budget = left;
            if budget <= 0.0 {
                break;
            }
        }
        Ok(budget)
    }
}
