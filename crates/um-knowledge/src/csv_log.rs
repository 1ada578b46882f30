//! Append-only CSV experience log.
//!
//! One row per experience; travel and stop records share the file and are
//! told apart by the `kind` column.  The log answers no estimates.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use csv::Writer;

use um_core::{SegmentId, TransportMode};

use crate::{Experience, ExperienceStore, KnowledgeResult, KnowledgeScope, SegmentEstimate};

const HEADER: [&str; 12] = [
    "scope", "kind", "id", "mode", "trip_id", "start_ms", "end_ms", "length_m",
    "travel_time_secs", "cost", "load", "delay_secs",
];

pub struct CsvExperienceLog<W: Write + Send = File> {
    writer: Mutex<Writer<W>>,
}

impl CsvExperienceLog<File> {
    /// Create (or truncate) the log at `path` and write the header row.
    pub fn create(path: &Path) -> KnowledgeResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write + Send> CsvExperienceLog<W> {
    pub fn from_writer(inner: W) -> KnowledgeResult<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer: Mutex::new(writer) })
    }

    pub fn flush(&self) -> KnowledgeResult<()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner).flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> KnowledgeResult<W> {
        let writer = self.writer.into_inner().unwrap_or_else(PoisonError::into_inner);
        writer.into_inner().map_err(|e| e.into_error().into())
    }
}

fn scope_label(scope: KnowledgeScope) -> String {
    match scope {
        KnowledgeScope::Entity(id) => id.0.to_string(),
        KnowledgeScope::Global => "global".to_string(),
    }
}

impl<W: Write + Send> ExperienceStore for CsvExperienceLog<W> {
    fn add_entries(&self, scope: KnowledgeScope, entries: &[Experience]) -> KnowledgeResult<()> {
        let scope = scope_label(scope);
        let mut w = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for entry in entries {
            match entry {
                Experience::Travel(t) => w.write_record(&[
                    scope.clone(),
                    "travel".to_string(),
                    t.segment_id.0.to_string(),
                    t.mode.as_str().to_string(),
                    t.trip_id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                    t.start_ms.to_string(),
                    t.end_ms.to_string(),
                    format!("{:.2}", t.length_m),
                    format!("{:.2}", t.travel_time_secs),
                    format!("{:.5}", t.cost),
                    format!("{:.3}", t.fill_level),
                    String::new(),
                ])?,
                Experience::Stop(s) => w.write_record(&[
                    scope.clone(),
                    "stop".to_string(),
                    s.stop_id.to_string(),
                    String::new(),
                    s.trip_id.to_string(),
                    s.arrival_ms.to_string(),
                    s.departure_ms.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    s.passengers.to_string(),
                    format!("{:.0}", s.delay_secs),
                ])?,
            }
        }
        Ok(())
    }

    fn estimate_segment(&self, _: KnowledgeScope, _: SegmentId, _: TransportMode) -> Option<SegmentEstimate> {
        None
    }
}
