//! The corridor street map and its bus stops.
//!
//! Six nodes on a north–south line through Trento, about 560 m apart.
//! Residential quarters sit at the northern end, offices at the southern
//! end; line 3 serves every node.

use std::sync::Arc;

use um_core::{GeoPoint, NodeId, StopId};
use um_transit::Stop;
use um_world::{StreetMap, StreetMapBuilder, WorldResult};

/// Node names from north to south.
pub const STOP_NAMES: [&str; 6] = [
    "Gardolo",
    "Canova",
    "Centochiavi",
    "Stazione",
    "Piazza Venezia",
    "Clarina",
];

const NORTH_LAT:   f64 = 46.110;
const LAT_STEP:    f64 = 0.005; // ≈ 556 m
const CORRIDOR_LON: f64 = 11.120;

/// 50 km/h urban arterial.
const ARTERIAL_SPEED_MPS: f64 = 13.9;

/// Build the corridor.  Returns the map and its nodes from north to south.
pub fn build_corridor() -> WorldResult<(StreetMap, Vec<NodeId>)> {
    let mut b = StreetMapBuilder::new();
    let nodes: Vec<NodeId> = (0..STOP_NAMES.len())
        .map(|i| b.add_node(GeoPoint::new(NORTH_LAT - i as f64 * LAT_STEP, CORRIDOR_LON)))
        .collect();
    for pair in nodes.windows(2) {
        b.add_street(pair[0], pair[1], ARTERIAL_SPEED_MPS);
    }
    Ok((b.build()?, nodes))
}

/// One stop per corridor node, in node order.
pub fn build_stops(map: &StreetMap, nodes: &[NodeId]) -> Vec<Arc<Stop>> {
    nodes
        .iter()
        .zip(STOP_NAMES)
        .filter_map(|(&node, name)| {
            let pos = map.node_position(node)?;
            Some(Arc::new(Stop::new(StopId::new(format!("S{}", node.0)), name, pos)))
        })
        .collect()
}
