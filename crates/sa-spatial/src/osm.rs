//! OSM PBF loader — enabled with the `osm` Cargo feature.
//!
//! An offline alternative to the Overpass collaborator: pull one named road
//! out of a local extract.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use sa_spatial::osm::load_named_road;
//!
//! let fragments = load_named_road(Path::new("alabama.osm.pbf"), "Dauphin St")?;
//! ```
//!
//! # Memory note
//!
//! PBF files list nodes before ways, so node positions cannot be filtered
//! in a single pass.  The loader buffers every node in a `FxHashMap<i64,
//! GeoPoint>` and drops it once the matching ways' nodes are copied out.
//! For a US state extract that is tens of millions of entries; cut the
//! extract to the locality first when memory is tight.

use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;
use tracing::info;

use sa_core::{GeoPoint, NodeId, WayId};

use crate::tags::{self, Oneway};
use crate::{RoadFragments, SpatialError, Way, names};

/// Load every drivable way named `road_name` (abbreviation-tolerant) from
/// an OSM PBF file, together with the nodes those ways reference.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on file or parse errors.
pub fn load_named_road(path: &Path, road_name: &str) -> Result<RoadFragments, SpatialError> {
    let reader = ElementReader::from_path(path).map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut all_nodes: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut road_ways: Vec<Way> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let way_tags: Vec<(&str, &str)> = w.tags().collect();
                let tag = |key: &str| way_tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);

                let drivable = tag("highway").is_some_and(tags::is_drivable);
                let named = ["name", "ref", "alt_name"]
                    .iter()
                    .filter_map(|k| tag(k))
                    .any(|v| v.split(';').any(|part| names::matches(part, road_name)));
                if !(drivable && named) {
                    return;
                }

                let mut nodes: Vec<NodeId> = w.refs().map(NodeId).collect();
                if nodes.len() < 2 {
                    return;
                }
                let direction = tags::oneway(way_tags.iter().copied());
                if direction == Oneway::Reverse {
                    nodes.reverse();
                }
                road_ways.push(Way {
                    id: WayId(w.id()),
                    nodes,
                    speed: tag("maxspeed").map(str::to_owned),
                    oneway: direction != Oneway::No,
                });
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut fragments = RoadFragments::with_capacity(road_ways.len() * 8, road_ways.len());
    for way in &road_ways {
        for node in &way.nodes {
            if let Some(&pos) = all_nodes.get(&node.raw()) {
                fragments.add_node(*node, pos);
            }
        }
    }
    drop(all_nodes);

    for way in road_ways {
        fragments.add_way(way);
    }

    info!(
        road = road_name,
        ways = fragments.way_count(),
        nodes = fragments.node_count(),
        "loaded road from PBF"
    );
    Ok(fragments)
}
