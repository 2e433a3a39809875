//! OSM tag interpretation shared by the Overpass and PBF loaders.

/// Direction restriction of a way, from its `oneway` / `highway` tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Oneway {
    No,
    /// Traffic follows recorded node order.
    Forward,
    /// `oneway=-1`: traffic runs against recorded node order.
    Reverse,
}

/// `true` if a `highway=*` value is drivable by car.  Sidewalks and paths
/// often carry the street's name and must not join the chain.
pub fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" | "bridleway"
            | "corridor" | "proposed" | "construction" | "platform"
    )
}

/// Determine the one-way restriction of a way.
///
/// Motorways and motorway links are implicitly one-way in OSM convention;
/// an explicit `oneway=no` overrides that.
pub fn oneway<'a>(tags: impl IntoIterator<Item = (&'a str, &'a str)>) -> Oneway {
    let mut highway = "";
    let mut explicit = None;
    for (k, v) in tags {
        match k {
            "highway" => highway = v,
            "oneway" => explicit = Some(v),
            _ => {}
        }
    }
    match explicit {
        Some("yes" | "1" | "true") => Oneway::Forward,
        Some("-1" | "reverse") => Oneway::Reverse,
        Some("no" | "0" | "false") => Oneway::No,
        _ if matches!(highway, "motorway" | "motorway_link") => Oneway::Forward,
        _ => Oneway::No,
    }
}
