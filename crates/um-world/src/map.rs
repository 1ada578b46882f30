//! Street map representation and builder.
//!
//! # Data layout
//!
//! Segments are stored sorted by source node in **Compressed Sparse Row**
//! form.  The outgoing segments of `NodeId n` occupy
//!
//! ```text
//! segments[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! and a segment's `SegmentId` is its position in that sorted order.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  It is
//! used to snap planner polylines and stop positions onto the network.

use std::sync::Arc;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use um_core::{GeoPoint, NodeId, SegmentId};

use crate::{StreetSegment, WorldError, WorldResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space; adequate for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── StreetMap ─────────────────────────────────────────────────────────────────

/// Directed street graph plus a spatial index for node snapping.
///
/// Build with [`StreetMapBuilder`].
pub struct StreetMap {
    /// Geographic position of each node, indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// CSR row pointer, length `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Segments sorted by source node, indexed by `SegmentId`.
    pub segments: Vec<Arc<StreetSegment>>,

    spatial_idx: RTree<NodeEntry>,
}

impl StreetMap {
    /// A map with no nodes; every lookup fails.
    pub fn empty() -> Self {
        StreetMap {
            node_pos:       Vec::new(),
            node_out_start: vec![0],
            segments:       Vec::new(),
            spatial_idx:    RTree::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn node_position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Arc<StreetSegment>> {
        self.segments.get(id.index())
    }

    /// Outgoing segments of `node`, a contiguous slice.
    #[inline]
    pub fn out_segments(&self, node: NodeId) -> &[Arc<StreetSegment>] {
        let i = node.index();
        if i + 1 >= self.node_out_start.len() {
            return &[];
        }
        let start = self.node_out_start[i] as usize;
        let end   = self.node_out_start[i + 1] as usize;
        &self.segments[start..end]
    }

    /// The directed segment `from → to`, if the two nodes are adjacent.
    pub fn segment_between(&self, from: NodeId, to: NodeId) -> Option<Arc<StreetSegment>> {
        self.out_segments(from).iter().find(|s| s.to == to).cloned()
    }

    /// Nearest node to `pos`; `None` only for an empty map.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Segments along an explicit node sequence.  Consecutive duplicates are
    /// skipped; every remaining pair must be adjacent.
    pub fn path_through(&self, nodes: &[NodeId]) -> WorldResult<Vec<Arc<StreetSegment>>> {
        let mut path = Vec::with_capacity(nodes.len().saturating_sub(1));
        let mut prev: Option<NodeId> = None;
        for &node in nodes {
            if node.index() >= self.node_count() {
                return Err(WorldError::NodeNotFound(node));
            }
            match prev {
                Some(p) if p == node => continue,
                Some(p) => {
                    let seg = self
                        .segment_between(p, node)
                        .ok_or(WorldError::NoPath { from: p, to: node })?;
                    path.push(seg);
                }
                None => {}
            }
            prev = Some(node);
        }
        Ok(path)
    }

    /// Recompute congested driving speeds on every segment.  Called once per
    /// tick by the simulation driver.
    pub fn update_segment_speeds(&self) {
        for seg in &self.segments {
            seg.update_driving_speed();
        }
    }

    /// Sum of all segment occupancy counters.
    pub fn total_occupancy(&self) -> u64 {
        self.segments.iter().map(|s| s.occupancy() as u64).sum()
    }
}

// ── StreetMapBuilder ──────────────────────────────────────────────────────────

/// Construct a [`StreetMap`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use um_core::GeoPoint;
/// use um_world::StreetMapBuilder;
///
/// let mut b = StreetMapBuilder::new();
/// let a = b.add_node(GeoPoint::new(46.066, 11.121));
/// let c = b.add_node(GeoPoint::new(46.070, 11.125));
/// b.add_street(a, c, 13.9); // 50 km/h
/// let map = b.build().unwrap();
/// assert_eq!(map.node_count(), 2);
/// assert_eq!(map.segment_count(), 2); // both directions
/// ```
pub struct StreetMapBuilder {
    nodes:     Vec<GeoPoint>,
    raw_edges: Vec<RawSegment>,
}

struct RawSegment {
    from:          NodeId,
    to:            NodeId,
    max_speed_mps: f64,
}

impl StreetMapBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** segment with the given speed limit (m/s).
    pub fn add_directed_segment(&mut self, from: NodeId, to: NodeId, max_speed_mps: f64) {
        self.raw_edges.push(RawSegment { from, to, max_speed_mps });
    }

    /// Add segments in both directions.
    pub fn add_street(&mut self, a: NodeId, b: NodeId, max_speed_mps: f64) {
        self.add_directed_segment(a, b, max_speed_mps);
        self.add_directed_segment(b, a, max_speed_mps);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Consume the builder and produce a [`StreetMap`].
    ///
    /// Fails if a segment references a node that was never added.
    pub fn build(self) -> WorldResult<StreetMap> {
        let node_count = self.nodes.len();

        let mut raw = self.raw_edges;
        for e in &raw {
            for n in [e.from, e.to] {
                if n.index() >= node_count {
                    return Err(WorldError::NodeNotFound(n));
                }
            }
        }
        raw.sort_by_key(|e| e.from.0);

        let segments: Vec<Arc<StreetSegment>> = raw
            .iter()
            .enumerate()
            .map(|(i, e)| {
                Arc::new(StreetSegment::new(
                    SegmentId(i as u32),
                    e.from,
                    e.to,
                    self.nodes[e.from.index()],
                    self.nodes[e.to.index()],
                    e.max_speed_mps,
                ))
            })
            .collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id:    NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        log::debug!(
            "street map built: {} nodes, {} segments",
            node_count,
            segments.len()
        );

        Ok(StreetMap {
            node_pos: self.nodes,
            node_out_start,
            segments,
            spatial_idx,
        })
    }
}

impl Default for StreetMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
