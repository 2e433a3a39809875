//! Strongly typed, zero-cost identifier wrappers.
//!
//! Map-data identifiers are signed 64-bit integers (OSM convention), so the
//! wrappers carry an `i64`.  All IDs are `Copy + Ord + Hash` so they can be
//! used as map keys and sorted without ceremony.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw map-data identifier.
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of a map vertex shared by one or more ways.
    pub struct NodeId(i64);
}

typed_id! {
    /// Identifier of a way: one contiguous fragment of a named road.
    pub struct WayId(i64);
}
