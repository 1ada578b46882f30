//! The path-lookup seam between planners and the street network.

use um_core::GeoPoint;

use crate::{SegmentPath, StreetMap, WorldError, WorldResult};

/// Looks up the ordered street segments along a coordinate polyline.
///
/// Planners hand back leg geometry as coordinates; movement activities need
/// the segments themselves (for speeds, occupancy and travel records).
pub trait PathService: Send + Sync {
    fn path_along(&self, points: &[GeoPoint]) -> WorldResult<SegmentPath>;
}

impl PathService for StreetMap {
    /// Snap each point to its nearest node and chain the segments between
    /// consecutive nodes.
    fn path_along(&self, points: &[GeoPoint]) -> WorldResult<SegmentPath> {
        if self.is_empty() {
            return Err(WorldError::EmptyMap);
        }
        let nodes = points
            .iter()
            .map(|&p| self.snap_to_node(p).ok_or(WorldError::EmptyMap))
            .collect::<WorldResult<Vec<_>>>()?;
        self.path_through(&nodes)
    }
}
