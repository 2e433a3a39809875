//! Overpass API JSON ingestion.
//!
//! The map-data collaborator posts the query from [`build_query`] and hands
//! the response body to [`parse_response`].  Only `node` and `way` elements
//! are read; relations and area elements are ignored.
//!
//! # What is kept
//!
//! Car-drivable ways (see [`tags::is_drivable`]) whose `name` (or `ref`)
//! matches the requested road, plus every node they reference.  A way tagged
//! `oneway=-1` is stored with its node order reversed so that recorded order
//! is always the direction of travel.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use sa_core::{GeoPoint, NodeId, WayId};

use crate::tags::{self, Oneway};
use crate::{RoadFragments, SpatialError, SpatialResult, Way, names};

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind:  String,
    id:    i64,
    lat:   Option<f64>,
    lon:   Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    tags:  BTreeMap<String, String>,
}

/// Parse an Overpass `[out:json]` body into fragments.
///
/// With `road_name = Some(..)` only ways whose `name` or `ref` matches
/// (abbreviation-tolerant) are kept; `None` keeps every drivable way.
///
/// # Errors
///
/// [`SpatialError::Json`] for a body that is not Overpass JSON,
/// [`SpatialError::Malformed`] for a node element without coordinates.
pub fn parse_response(body: &str, road_name: Option<&str>) -> SpatialResult<RoadFragments> {
    let response: Response = serde_json::from_str(body)?;

    let mut positions: BTreeMap<i64, GeoPoint> = BTreeMap::new();
    let mut ways: Vec<Way> = Vec::new();
    let mut skipped = 0usize;

    for element in response.elements {
        match element.kind.as_str() {
            "node" => {
                let (Some(lat), Some(lon)) = (element.lat, element.lon) else {
                    return Err(SpatialError::Malformed(format!(
                        "node {} has no coordinates",
                        element.id
                    )));
                };
                positions.insert(element.id, GeoPoint::new(lat, lon));
            }
            "way" => match way_from_element(element, road_name) {
                Some(way) => ways.push(way),
                None => skipped += 1,
            },
            _ => {}
        }
    }

    let mut fragments = RoadFragments::with_capacity(positions.len(), ways.len());
    for way in &ways {
        for node in &way.nodes {
            if let Some(&pos) = positions.get(&node.raw()) {
                fragments.add_node(*node, pos);
            }
        }
    }
    for way in ways {
        fragments.add_way(way);
    }

    debug!(
        ways = fragments.way_count(),
        nodes = fragments.node_count(),
        skipped,
        "parsed Overpass response"
    );
    Ok(fragments)
}

/// Tags a road's name may appear under; the query and the filter agree.
const NAME_KEYS: [&str; 3] = ["name", "ref", "alt_name"];

fn way_from_element(element: RawElement, road_name: Option<&str>) -> Option<Way> {
    let highway = element.tags.get("highway")?;
    if !tags::is_drivable(highway) || element.nodes.len() < 2 {
        return None;
    }
    if let Some(wanted) = road_name {
        let named = NAME_KEYS
            .iter()
            .filter_map(|k| element.tags.get(*k))
            .any(|v| v.split(';').any(|part| names::matches(part, wanted)));
        if !named {
            return None;
        }
    }

    let mut nodes: Vec<NodeId> = element.nodes.iter().copied().map(NodeId).collect();
    let direction = tags::oneway(element.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if direction == Oneway::Reverse {
        nodes.reverse();
    }

    Some(Way {
        id: WayId(element.id),
        nodes,
        speed: element.tags.get("maxspeed").cloned(),
        oneway: direction != Oneway::No,
    })
}

/// Overpass QL selecting the named road inside `locality`, itself inside
/// the administrative `region`, with all referenced nodes.  The road is
/// matched under every tag [`parse_response`] accepts a name from.
pub fn build_query(road_name: &str, locality: &str, region: &str) -> String {
    let pattern = quote(&names::overpass_pattern(road_name));
    let ways: String = NAME_KEYS
        .iter()
        .map(|key| format!("  way(area.locality)[\"highway\"][\"{key}\"~\"{pattern}\",i];\n"))
        .collect();
    format!(
        "[out:json][timeout:60];\n\
         area[\"name\"=\"{region}\"][\"boundary\"=\"administrative\"]->.region;\n\
         rel(area.region)[\"name\"=\"{locality}\"][\"boundary\"=\"administrative\"];\n\
         map_to_area->.locality;\n\
         (\n{ways});\n\
         (._;>;);\n\
         out body;",
        region = quote(region),
        locality = quote(locality),
    )
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
