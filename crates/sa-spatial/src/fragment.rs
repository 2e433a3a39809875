//! Road fragments: the raw ways and nodes of one named road.
//!
//! A [`RoadFragments`] set is what the map-data collaborator returns for a
//! road name in an area.  It is an unordered bag: ways may arrive in any
//! order, in either orientation, and in several disconnected groups.  The
//! [`assembler`](crate::assembler) turns it into one continuous path.
//!
//! # Example
//!
//! ```
//! use sa_core::{GeoPoint, NodeId, WayId};
//! use sa_spatial::{RoadFragments, Way};
//!
//! let mut f = RoadFragments::new();
//! f.add_node(NodeId(1), GeoPoint::new(30.69, -88.04));
//! f.add_node(NodeId(2), GeoPoint::new(30.70, -88.04));
//! f.add_way(Way::new(WayId(10), vec![NodeId(1), NodeId(2)]).with_speed("35 mph"));
//! assert_eq!(f.way_count(), 1);
//! ```

use rustc_hash::FxHashMap;

use sa_core::{GeoPoint, NodeId, WayId};

// ── Way ───────────────────────────────────────────────────────────────────────

/// One contiguous piece of a named road.
#[derive(Clone, Debug, PartialEq)]
pub struct Way {
    pub id:     WayId,
    /// Node references in recorded order.  A usable way has at least two.
    pub nodes:  Vec<NodeId>,
    /// Raw `maxspeed` tag, if any.
    pub speed:  Option<String>,
    /// Traffic flows only in recorded node order.
    pub oneway: bool,
}

impl Way {
    pub fn new(id: WayId, nodes: Vec<NodeId>) -> Self {
        Self { id, nodes, speed: None, oneway: false }
    }

    pub fn with_speed(mut self, speed: impl Into<String>) -> Self {
        self.speed = Some(speed.into());
        self
    }

    pub fn with_oneway(mut self, oneway: bool) -> Self {
        self.oneway = oneway;
        self
    }

    /// First node in recorded order.
    #[inline]
    pub fn head(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node in recorded order.
    #[inline]
    pub fn tail(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

// ── RoadFragments ─────────────────────────────────────────────────────────────

/// The complete node and way set for one road query.
#[derive(Clone, Debug, Default)]
pub struct RoadFragments {
    nodes: FxHashMap<NodeId, GeoPoint>,
    ways:  Vec<Way>,
}

impl RoadFragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and ways.
    pub fn with_capacity(nodes: usize, ways: usize) -> Self {
        let mut map = FxHashMap::default();
        map.reserve(nodes);
        Self { nodes: map, ways: Vec::with_capacity(ways) }
    }

    /// Record a node position.  A later call for the same id overwrites.
    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) {
        self.nodes.insert(id, pos);
    }

    /// Append a way.  Input order is preserved and used for deterministic
    /// chain growth.
    pub fn add_way(&mut self, way: Way) {
        self.ways.push(way);
    }

    /// Position of a node, if it was supplied.
    #[inline]
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(&id).copied()
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    /// `true` if there are no ways to assemble.
    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }
}
