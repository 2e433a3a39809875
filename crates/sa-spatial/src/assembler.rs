//! Path assembly: unordered road fragments → one continuous, directed path.
//!
//! # Algorithm
//!
//! 1. **Endpoint index**: map each way's two endpoint nodes to the way's
//!    slot in the input.
//! 2. **Chain growth**: from each unused way (input order), extend the
//!    chain greedily at its tail, then at its head, taking the first unused
//!    way that touches the current tip and flipping it so the shared node
//!    meets the tip.  Every way is consumed exactly once, so the whole pass
//!    is O(ways).
//! 3. **Selection**: the chain with the most ways is canonical.  Equal
//!    counts go to the chain whose smallest `WayId` is lowest.
//! 4. **Flatten**: emit the first way's nodes in full, then each following
//!    way without its shared endpoint.  A way that does not touch the running
//!    tip is appended as recorded and reported as a
//!    [`PathWarning::Discontinuity`].
//! 5. **Direction**: if more than half the canonical ways are one-way the
//!    path keeps its travel direction.  Otherwise it is oriented along its
//!    dominant axis: south → north when the latitude span is larger, else
//!    west → east.
//! 6. **Speed carry-forward**: an untagged point inherits the speed tag and
//!    way of the point before it.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use sa_core::{GeoPoint, NodeId, WayId};

use crate::{RoadFragments, SpatialError, SpatialResult, Way};

// ── Output types ──────────────────────────────────────────────────────────────

/// One vertex of the assembled path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub pos:   GeoPoint,
    /// Raw speed tag in force at this vertex.
    pub speed: Option<String>,
    pub way:   Option<WayId>,
}

/// Non-fatal problems found while assembling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathWarning {
    /// `way` does not share an endpoint with the path built so far (ending at
    /// `tip`); it was appended as recorded, leaving a gap.
    Discontinuity { way: WayId, tip: NodeId },
}

/// The canonical path for one road.
#[derive(Clone, Debug, Default)]
pub struct AssembledPath {
    /// Ordered, direction-normalised vertices.
    pub points:   Vec<PathPoint>,
    /// Ways of the canonical chain in path order.
    pub chain:    Vec<WayId>,
    /// Total number of chains found; more than one means the road is split
    /// into disconnected pieces and only one was kept.
    pub chain_count: usize,
    /// `true` if the recorded one-way direction decided the orientation.
    pub oneway_preserved: bool,
    pub warnings: Vec<PathWarning>,
}

impl AssembledPath {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

// ── Internal chain representation ─────────────────────────────────────────────

/// A way slot plus the orientation it was attached with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) slot:     usize,
    pub(crate) reversed: bool,
}

impl Link {
    fn entry(self, ways: &[&Way]) -> NodeId {
        let w = ways[self.slot];
        if self.reversed { w.nodes[w.nodes.len() - 1] } else { w.nodes[0] }
    }

    fn exit(self, ways: &[&Way]) -> NodeId {
        let w = ways[self.slot];
        if self.reversed { w.nodes[0] } else { w.nodes[w.nodes.len() - 1] }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Assemble the canonical path from a fragment set.
///
/// Returns an empty path (not an error) when there is nothing to assemble.
///
/// # Errors
///
/// [`SpatialError::MissingNode`] if a way references a node whose position
/// was not supplied.
pub fn assemble_path(fragments: &RoadFragments) -> SpatialResult<AssembledPath> {
    // Ways with fewer than two nodes have no endpoints to chain on.
    let ways: Vec<&Way> = fragments.ways().iter().filter(|w| w.nodes.len() >= 2).collect();
    if ways.len() < fragments.way_count() {
        debug!(dropped = fragments.way_count() - ways.len(), "ignoring degenerate ways");
    }

    for way in &ways {
        if let Some(&node) = way.nodes.iter().find(|n| fragments.node_pos(**n).is_none()) {
            return Err(SpatialError::MissingNode { way: way.id, node });
        }
    }

    let chains = grow_chains(&ways);
    let chain_count = chains.len();
    let Some(canonical) = select_canonical(chains, &ways) else {
        return Ok(AssembledPath::default());
    };

    let (mut points, warnings) = flatten(&canonical, &ways, fragments);

    let mut chain: Vec<WayId> = canonical.iter().map(|l| ways[l.slot].id).collect();

    let oneway = canonical.iter().filter(|l| ways[l.slot].oneway).count();
    let oneway_preserved = oneway * 2 > canonical.len();
    if !oneway_preserved && should_reverse(&points) {
        points.reverse();
        chain.reverse();
    }

    carry_speed_forward(&mut points);

    debug!(
        chains = chain_count,
        canonical_ways = chain.len(),
        points = points.len(),
        oneway_preserved,
        "assembled path"
    );

    Ok(AssembledPath { points, chain, chain_count, oneway_preserved, warnings })
}

// ── Steps ─────────────────────────────────────────────────────────────────────

/// Greedy two-ended chain growth over an endpoint index.
pub(crate) fn grow_chains(ways: &[&Way]) -> Vec<VecDeque<Link>> {
    let mut endpoints: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
    for (slot, way) in ways.iter().enumerate() {
        let (head, tail) = (way.nodes[0], way.nodes[way.nodes.len() - 1]);
        endpoints.entry(head).or_default().push(slot);
        if tail != head {
            endpoints.entry(tail).or_default().push(slot);
        }
    }

    let mut used = vec![false; ways.len()];
    let mut chains = Vec::new();

    for seed in 0..ways.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let first = Link { slot: seed, reversed: false };
        let mut chain = VecDeque::from([first]);

        // Extend forwards from the tail.
        let mut tip = first.exit(ways);
        while let Some(slot) = take_unused(&endpoints, tip, &mut used) {
            let link = Link { slot, reversed: ways[slot].nodes[0] != tip };
            tip = link.exit(ways);
            chain.push_back(link);
        }

        // Extend backwards from the head.
        let mut tip = first.entry(ways);
        while let Some(slot) = take_unused(&endpoints, tip, &mut used) {
            let last = ways[slot].nodes[ways[slot].nodes.len() - 1];
            let link = Link { slot, reversed: last != tip };
            tip = link.entry(ways);
            chain.push_front(link);
        }

        chains.push(chain);
    }
    chains
}

fn take_unused(
    endpoints: &FxHashMap<NodeId, Vec<usize>>,
    tip:       NodeId,
    used:      &mut [bool],
) -> Option<usize> {
    let slot = endpoints.get(&tip)?.iter().copied().find(|&s| !used[s])?;
    used[slot] = true;
    Some(slot)
}

/// Longest chain by way count; ties go to the lowest minimum `WayId`.
fn select_canonical(chains: Vec<VecDeque<Link>>, ways: &[&Way]) -> Option<VecDeque<Link>> {
    let min_id = |c: &VecDeque<Link>| c.iter().map(|l| ways[l.slot].id).min();
    chains
        .into_iter()
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| min_id(b).cmp(&min_id(a))))
}

/// Expand a chain into points, skipping the node shared with the previous
/// way.
pub(crate) fn flatten(
    chain:     &VecDeque<Link>,
    ways:      &[&Way],
    fragments: &RoadFragments,
) -> (Vec<PathPoint>, Vec<PathWarning>) {
    let mut points = Vec::new();
    let mut warnings = Vec::new();
    let mut tip: Option<NodeId> = None;

    for link in chain {
        let way = ways[link.slot];
        let mut nodes: Vec<NodeId> = way.nodes.clone();
        if link.reversed {
            nodes.reverse();
        }

        let skip = match tip {
            None => 0,
            Some(t) if nodes[0] == t => 1,
            Some(t) if nodes[nodes.len() - 1] == t => {
                nodes.reverse();
                1
            }
            Some(t) => {
                warn!(way = %way.id, tip = %t, "way does not touch the path tip; appending as recorded");
                warnings.push(PathWarning::Discontinuity { way: way.id, tip: t });
                nodes = way.nodes.clone();
                0
            }
        };

        for &node in &nodes[skip..] {
            if let Some(pos) = fragments.node_pos(node) {
                points.push(PathPoint { pos, speed: way.speed.clone(), way: Some(way.id) });
            }
        }
        tip = nodes.last().copied();
    }

    (points, warnings)
}

/// `true` if the path runs north → south (latitude-dominant) or east → west
/// (longitude-dominant).
fn should_reverse(points: &[PathPoint]) -> bool {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return false;
    };
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_lat = min_lat.min(p.pos.lat);
        max_lat = max_lat.max(p.pos.lat);
        min_lon = min_lon.min(p.pos.lon);
        max_lon = max_lon.max(p.pos.lon);
    }

    if max_lat - min_lat > max_lon - min_lon {
        first.pos.lat > last.pos.lat
    } else {
        first.pos.lon > last.pos.lon
    }
}

fn carry_speed_forward(points: &mut [PathPoint]) {
    for i in 1..points.len() {
        if points[i].speed.is_none() {
            points[i].speed = points[i - 1].speed.clone();
            points[i].way = points[i - 1].way;
        }
    }
}
