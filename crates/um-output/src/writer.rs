//! The `OutputWriter` trait implemented by output backends.

use crate::{EntitySnapshotRow, OutputResult, TickSummaryRow};

/// Sink for snapshot and summary rows.
///
/// Errors are returned to the caller; [`SimOutputObserver`](crate::SimOutputObserver)
/// keeps the first one for [`take_error`](crate::SimOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of entity snapshots.
    fn write_snapshots(&mut self, rows: &[EntitySnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
