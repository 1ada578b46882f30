//! A one-shot countdown latch for waiting on a batch of planning rounds.

use std::sync::{Condvar, Mutex, PoisonError};

/// Blocks waiters until `count_down` has been called `count` times.
#[derive(Debug)]
pub struct CountDownLatch {
    count: Mutex<usize>,
    zero:  Condvar,
}

impl CountDownLatch {
    pub fn new(count: usize) -> Self {
        Self { count: Mutex::new(count), zero: Condvar::new() }
    }

    /// Decrement the count, waking waiters when it reaches zero.  Extra
    /// calls past zero are ignored.
    pub fn count_down(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        if *count > 0 {
            *count -= 1;
            if *count == 0 {
                self.zero.notify_all();
            }
        }
    }

    pub fn count(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wait(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self.zero.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
    }
}
