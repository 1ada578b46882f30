//! Timed activities waiting to enter an entity's flow.

use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDateTime;

use crate::Activity;

/// Activities keyed by the time they become due, e.g. a commuter's
/// `PlanJourney` to work at 07:45 and back home at 17:10.
#[derive(Debug, Default)]
pub struct DailySchedule {
    entries: BTreeMap<NaiveDateTime, VecDeque<Activity>>,
    len:     usize,
}

impl DailySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activities pushed for the same time are released in push order.
    pub fn push(&mut self, at: NaiveDateTime, activity: Activity) {
        self.entries.entry(at).or_default().push_back(activity);
        self.len += 1;
    }

    /// Remove and return every activity due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: NaiveDateTime) -> Vec<Activity> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if *entry.key() > now {
                break;
            }
            due.extend(entry.remove());
        }
        self.len -= due.len();
        due
    }

    /// When the next activity becomes due.
    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.entries.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
