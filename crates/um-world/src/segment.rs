//! Directed street segments and their mode-specific speed providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use um_core::{GeoPoint, NodeId, SegmentId};

/// Walking speed used for every segment, m/s.
pub const WALKING_SPEED_MPS: f64 = 1.29;

/// Cycling speed before the segment's limit is applied, m/s.
pub const CYCLING_SPEED_MPS: f64 = 4.68;

/// Road length one queued vehicle occupies, metres.
const VEHICLE_SLOT_M: f64 = 7.5;

/// An ordered list of segments, as traversed by a movement activity.
pub type SegmentPath = Vec<Arc<StreetSegment>>;

/// Total length of a path in metres.
pub fn path_length_m(path: &[Arc<StreetSegment>]) -> f64 {
    path.iter().map(|s| s.length_m).sum()
}

/// A directed, straight street segment between two network nodes.
///
/// `length_m` is always the great-circle distance between `start` and `end`,
/// so partial progress measured along the segment and distance measured to
/// its end agree.
#[derive(Debug)]
pub struct StreetSegment {
    pub id:            SegmentId,
    pub from:          NodeId,
    pub to:            NodeId,
    pub start:         GeoPoint,
    pub end:           GeoPoint,
    pub length_m:      f64,
    /// Free-flow speed limit, m/s.
    pub max_speed_mps: f64,

    /// Motor vehicles currently on the segment.
    occupancy:          AtomicU32,
    /// Congested driving speed, `f64` bits.  Recomputed once per tick.
    driving_speed_bits: AtomicU64,
}

impl StreetSegment {
    pub fn new(
        id:            SegmentId,
        from:          NodeId,
        to:            NodeId,
        start:         GeoPoint,
        end:           GeoPoint,
        max_speed_mps: f64,
    ) -> Self {
        Self {
            id,
            from,
            to,
            start,
            end,
            length_m: start.distance_m(end),
            max_speed_mps,
            occupancy: AtomicU32::new(0),
            driving_speed_bits: AtomicU64::new(max_speed_mps.to_bits()),
        }
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    #[inline]
    pub fn occupancy(&self) -> u32 {
        self.occupancy.load(Ordering::Relaxed)
    }

    /// A vehicle entered the segment.
    #[inline]
    pub fn enter(&self) {
        self.occupancy.fetch_add(1, Ordering::Relaxed);
    }

    /// A vehicle left the segment.  Never underflows.
    #[inline]
    pub fn leave(&self) {
        let _ = self
            .occupancy
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Number of vehicles the segment holds before congestion sets in.
    #[inline]
    pub fn vehicle_capacity(&self) -> f64 {
        (self.length_m / VEHICLE_SLOT_M).max(1.0)
    }

    /// Recompute the congested driving speed from the current occupancy
    /// using the BPR volume-delay curve.
    pub fn update_driving_speed(&self) {
        let ratio = self.occupancy() as f64 / self.vehicle_capacity();
        let speed = self.max_speed_mps / (1.0 + 0.15 * ratio.powi(4));
        self.driving_speed_bits.store(speed.to_bits(), Ordering::Relaxed);
    }

    // ── Speed providers ───────────────────────────────────────────────────

    /// Current driving speed, m/s.  Used by cars, taxis and buses.
    #[inline]
    pub fn driving_speed(&self) -> f64 {
        f64::from_bits(self.driving_speed_bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn cycling_speed(&self) -> f64 {
        CYCLING_SPEED_MPS.min(self.max_speed_mps)
    }

    #[inline]
    pub fn walking_speed(&self) -> f64 {
        WALKING_SPEED_MPS
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Position `dist_m` metres from the segment start.
    pub fn point_at(&self, dist_m: f64) -> GeoPoint {
        if self.length_m <= 0.0 {
            return self.end;
        }
        self.start.lerp(self.end, dist_m / self.length_m)
    }
}
