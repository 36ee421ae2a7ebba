//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the foundational coordinate types for the hex-based game board:
//! - `HexCoord`: Identifies individual hex tiles
//! - `IntersectionId`: Identifies corners where settlements/cities are placed
//! - `EdgeId`: Identifies sides where roads are placed
//!
//! Corner ids are derived from the three hexes that meet at the corner: the sum
//! of their axial coordinates is unique per corner, so `(3q + dq, 3r + dr)` names
//! it no matter which of the three hexes it is computed from. Edge ids are the
//! lexicographically ordered pair of their endpoint ids, so the same side is
//! never named twice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an edge (and of the neighbor across it) relative to a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    /// East edge (right)
    East,
    /// Northeast edge (top-right)
    NorthEast,
    /// Northwest edge (top-left)
    NorthWest,
    /// West edge (left)
    West,
    /// Southwest edge (bottom-left)
    SouthWest,
    /// Southeast edge (bottom-right)
    SouthEast,
}

impl EdgeDirection {
    /// All edge directions in counter-clockwise order starting from East.
    ///
    /// Consecutive directions point at neighbors that are themselves adjacent,
    /// which is what makes the corner derivation below work.
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::East,
        EdgeDirection::NorthEast,
        EdgeDirection::NorthWest,
        EdgeDirection::West,
        EdgeDirection::SouthWest,
        EdgeDirection::SouthEast,
    ];

    /// Axial offset of the neighbor in this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            EdgeDirection::East => (1, 0),
            EdgeDirection::NorthEast => (1, -1),
            EdgeDirection::NorthWest => (0, -1),
            EdgeDirection::West => (-1, 0),
            EdgeDirection::SouthWest => (-1, 1),
            EdgeDirection::SouthEast => (0, 1),
        }
    }

    fn index(self) -> usize {
        match self {
            EdgeDirection::East => 0,
            EdgeDirection::NorthEast => 1,
            EdgeDirection::NorthWest => 2,
            EdgeDirection::West => 3,
            EdgeDirection::SouthWest => 4,
            EdgeDirection::SouthEast => 5,
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Stable tile key, e.g. `"1,-2"`
    pub fn key(&self) -> String {
        format!("{},{}", self.q, self.r)
    }

    /// The six neighboring hexes in `EdgeDirection::ALL` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        EdgeDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: EdgeDirection) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Corner `k` sits between the neighbors in directions `ALL[k]` and `ALL[k + 1]`.
    fn corner(&self, k: usize) -> IntersectionId {
        let (aq, ar) = EdgeDirection::ALL[k % 6].offset();
        let (bq, br) = EdgeDirection::ALL[(k + 1) % 6].offset();
        IntersectionId::from_lattice(3 * self.q + aq + bq, 3 * self.r + ar + br)
    }

    /// All six corners of this hex, corner `k` lying between sides `k` and `k + 1`
    pub fn corners(&self) -> [IntersectionId; 6] {
        [0, 1, 2, 3, 4, 5].map(|k| self.corner(k))
    }

    /// The hexes meeting at corner `k` (this one first), whether or not they are on the board
    pub fn corner_hexes(&self, k: usize) -> [HexCoord; 3] {
        [
            *self,
            self.neighbor(EdgeDirection::ALL[k % 6]),
            self.neighbor(EdgeDirection::ALL[(k + 1) % 6]),
        ]
    }

    /// The two corners bounding the side that faces `direction`
    pub fn side_endpoints(&self, direction: EdgeDirection) -> [IntersectionId; 2] {
        let k = direction.index();
        [self.corner(k + 5), self.corner(k)]
    }

    /// The side facing `direction`, as a canonical edge id
    pub fn side(&self, direction: EdgeDirection) -> EdgeId {
        let [a, b] = self.side_endpoints(direction);
        EdgeId::between(&a, &b)
    }

    /// All six sides of this hex
    pub fn sides(&self) -> [EdgeId; 6] {
        EdgeDirection::ALL.map(|dir| self.side(dir))
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Stable id of a building site, e.g. `"2,-1"` in the tripled corner lattice.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntersectionId(String);

impl IntersectionId {
    fn from_lattice(x: i32, y: i32) -> Self {
        Self(format!("{x},{y}"))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IntersectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable id of a road site: the ordered pair of its endpoint ids, e.g. `"1,1|2,-1"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Canonical id of the edge joining two intersections, independent of argument order
    pub fn between(a: &IntersectionId, b: &IntersectionId) -> Self {
        let (lo, hi) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };
        Self(format!("{lo}|{hi}"))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
