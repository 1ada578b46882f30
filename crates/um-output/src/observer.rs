//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use chrono::NaiveDateTime;

use um_agent::EntityStore;
use um_core::Tick;
use um_flow::Flow;
use um_sim::{SimObserver, TickStats};

use crate::row::{EntitySnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes entity snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn timestamp_ms(now: NaiveDateTime) -> i64 {
    now.and_utc().timestamp_millis()
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, now: NaiveDateTime, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:            tick.0,
            timestamp_ms:    timestamp_ms(now),
            active_entities: stats.active as u64,
            released:        stats.released as u64,
            effects:         stats.effects as u64,
            planning_rounds: stats.planning_rounds as u64,
            occupancy:       stats.occupancy,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, now: NaiveDateTime, entities: &EntityStore, flows: &[Flow]) {
        let ts = timestamp_ms(now);
        let rows: Vec<EntitySnapshotRow> = entities
            .iter()
            .zip(flows)
            .map(|(e, flow)| {
                let pos = e.current_position();
                EntitySnapshotRow {
                    entity_id:    e.id.0,
                    tick:         tick.0,
                    timestamp_ms: ts,
                    kind:         e.kind.as_str(),
                    lat:          pos.lat,
                    lon:          pos.lon,
                    activity:     flow.current().map_or("IDLE", |a| a.name()),
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
