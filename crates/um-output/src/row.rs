//! Plain data row types written by output backends.

/// Where one entity is and what it is doing at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshotRow {
    pub entity_id:    u32,
    pub tick:         u64,
    pub timestamp_ms: i64,
    pub kind:         &'static str,
    pub lat:          f64,
    pub lon:          f64,
    /// Name of the current activity, `"IDLE"` for an empty flow.
    pub activity:     &'static str,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    pub timestamp_ms:    i64,
    pub active_entities: u64,
    pub released:        u64,
    pub effects:         u64,
    pub planning_rounds: u64,
    pub occupancy:       u64,
}
