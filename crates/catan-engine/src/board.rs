//! Game board representation including tiles, buildings, and ports.
//!
//! This module contains:
//! - Resource and terrain types
//! - The board topology: tiles, intersections, edges
//! - Building and road occupancy
//! - Port trading bonuses
//! - Board query and mutation methods
//!
//! The topology is generated once per game and never changes afterwards; only
//! occupancy and the robber move. All maps are persistent (`im::OrdMap`), so a
//! cloned board shares every entry it has not touched.

use crate::error::GameError;
use crate::hex::{EdgeDirection, EdgeId, HexCoord, IntersectionId};
use im::OrdMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Player identifier, supplied by the session coordinator
pub type PlayerId = String;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Wool,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Wool,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// Terrain of a land hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Forest,
    Hills,
    Pasture,
    Fields,
    Mountains,
    /// No production; the robber starts here
    Desert,
}

impl Terrain {
    /// The resource this terrain produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Wood),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Pasture => Some(Resource::Wool),
            Terrain::Fields => Some(Resource::Wheat),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Desert => None,
        }
    }
}

/// Port types for bank trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

/// A port attached to a coastal intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub kind: PortKind,
    /// How many of the offered resource buy one requested resource
    pub ratio: u32,
}

impl Port {
    pub fn new(kind: PortKind) -> Self {
        let ratio = match kind {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        };
        Self { kind, ratio }
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Dice number that triggers production (2-12, None for desert)
    pub number: Option<u8>,
    /// Whether the robber is currently on this tile
    pub has_robber: bool,
}

impl Tile {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }

    /// Check if this tile produces on `roll`
    pub fn produces_on(&self, roll: u8) -> bool {
        self.number == Some(roll) && !self.has_robber && self.resource().is_some()
    }
}

/// Settlement or city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    Settlement,
    City,
}

/// What's built on an intersection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub owner: PlayerId,
}

impl Building {
    pub fn settlement(owner: &str) -> Self {
        Self {
            kind: BuildingKind::Settlement,
            owner: owner.to_string(),
        }
    }

    pub fn city(owner: &str) -> Self {
        Self {
            kind: BuildingKind::City,
            owner: owner.to_string(),
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

/// What's built on an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub owner: PlayerId,
}

/// A building site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    pub id: IntersectionId,
    /// Land hexes sharing this corner (1-3)
    pub hexes: Vec<HexCoord>,
    /// Edges ending here (3 inland, 2 on a coastal corner of a single hex)
    pub edges: Vec<EdgeId>,
    pub building: Option<Building>,
    pub port: Option<Port>,
}

impl Intersection {
    /// Owner of the building here, if any
    pub fn owner(&self) -> Option<&str> {
        self.building.as_ref().map(|b| b.owner.as_str())
    }
}

/// A road site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub endpoints: [IntersectionId; 2],
    pub road: Option<Road>,
}

impl Edge {
    /// Owner of the road here, if any
    pub fn owner(&self) -> Option<&str> {
        self.road.as_ref().map(|r| r.owner.as_str())
    }

    /// The endpoint that isn't `from`
    pub fn other_end(&self, from: &IntersectionId) -> &IntersectionId {
        if &self.endpoints[0] == from {
            &self.endpoints[1]
        } else {
            &self.endpoints[0]
        }
    }
}

/// Standard 19-hex layout: center, ring of 6, ring of 12
pub const LAND_HEXES: [HexCoord; 19] = [
    // Center
    HexCoord::new(0, 0),
    // Ring 1
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
    // Ring 2
    HexCoord::new(2, 0),
    HexCoord::new(2, -1),
    HexCoord::new(2, -2),
    HexCoord::new(1, -2),
    HexCoord::new(0, -2),
    HexCoord::new(-1, -1),
    HexCoord::new(-2, 0),
    HexCoord::new(-2, 1),
    HexCoord::new(-2, 2),
    HexCoord::new(-1, 2),
    HexCoord::new(0, 2),
    HexCoord::new(1, 1),
];

/// 4 forest, 4 pasture, 4 fields, 3 hills, 3 mountains, 1 desert
const STANDARD_TERRAIN: [(Terrain, usize); 6] = [
    (Terrain::Forest, 4),
    (Terrain::Pasture, 4),
    (Terrain::Fields, 4),
    (Terrain::Hills, 3),
    (Terrain::Mountains, 3),
    (Terrain::Desert, 1),
];

const STANDARD_NUMBERS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Outer-ring sides carrying a port; both endpoints of each side get the port.
const STANDARD_PORTS: [(HexCoord, EdgeDirection, PortKind); 9] = [
    (HexCoord::new(-2, 0), EdgeDirection::NorthWest, PortKind::Generic),
    (HexCoord::new(0, -2), EdgeDirection::West, PortKind::Specific(Resource::Wool)),
    (HexCoord::new(1, -2), EdgeDirection::NorthEast, PortKind::Generic),
    (HexCoord::new(2, -2), EdgeDirection::East, PortKind::Specific(Resource::Ore)),
    (HexCoord::new(2, 0), EdgeDirection::NorthEast, PortKind::Generic),
    (HexCoord::new(1, 1), EdgeDirection::SouthEast, PortKind::Specific(Resource::Wheat)),
    (HexCoord::new(0, 2), EdgeDirection::SouthWest, PortKind::Specific(Resource::Brick)),
    (HexCoord::new(-2, 2), EdgeDirection::SouthEast, PortKind::Generic),
    (HexCoord::new(-2, 1), EdgeDirection::West, PortKind::Specific(Resource::Wood)),
];

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// All tiles indexed by tile key (`"q,r"`)
    tiles: OrdMap<String, Tile>,
    intersections: OrdMap<IntersectionId, Intersection>,
    edges: OrdMap<EdgeId, Edge>,
    /// Current robber location
    robber: HexCoord,
}

impl Board {
    /// Create the standard board with shuffled terrain and number discs
    pub fn standard<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, GameError> {
        let mut terrains: Vec<Terrain> = STANDARD_TERRAIN
            .iter()
            .flat_map(|&(terrain, count)| std::iter::repeat(terrain).take(count))
            .collect();
        if terrains.len() != LAND_HEXES.len() {
            return Err(GameError::MalformedBoard(format!(
                "{} terrains for {} hexes",
                terrains.len(),
                LAND_HEXES.len()
            )));
        }
        terrains.shuffle(rng);

        let producing: Vec<HexCoord> = LAND_HEXES
            .iter()
            .zip(&terrains)
            .filter(|(_, terrain)| **terrain != Terrain::Desert)
            .map(|(coord, _)| *coord)
            .collect();
        if producing.len() != STANDARD_NUMBERS.len() {
            return Err(GameError::MalformedBoard(format!(
                "{} number discs for {} producing hexes",
                STANDARD_NUMBERS.len(),
                producing.len()
            )));
        }
        let numbers = assign_numbers_avoiding_adjacent_68(&producing, rng);

        let mut next_number = numbers.into_iter();
        let tiles = LAND_HEXES
            .iter()
            .zip(terrains)
            .map(|(coord, terrain)| {
                let is_desert = terrain == Terrain::Desert;
                Tile {
                    coord: *coord,
                    terrain,
                    number: if is_desert { None } else { next_number.next() },
                    has_robber: is_desert,
                }
            })
            .collect();

        let board = Self::from_tiles(tiles, &STANDARD_PORTS)?;
        debug!(
            tiles = board.tiles.len(),
            intersections = board.intersections.len(),
            edges = board.edges.len(),
            robber = %board.robber,
            "generated board"
        );
        Ok(board)
    }

    /// Derive the intersection and edge topology for a set of tiles
    pub fn from_tiles(
        tiles: Vec<Tile>,
        ports: &[(HexCoord, EdgeDirection, PortKind)],
    ) -> Result<Self, GameError> {
        let mut board = Self {
            tiles: OrdMap::new(),
            intersections: OrdMap::new(),
            edges: OrdMap::new(),
            robber: HexCoord::default(),
        };

        let mut robbers = tiles.iter().filter(|t| t.has_robber).map(|t| t.coord);
        board.robber = match (robbers.next(), robbers.next()) {
            (Some(coord), None) => coord,
            _ => {
                return Err(GameError::MalformedBoard(
                    "exactly one tile must hold the robber".into(),
                ))
            }
        };

        for tile in &tiles {
            for id in tile.coord.corners() {
                let intersection = board
                    .intersections
                    .entry(id.clone())
                    .or_insert_with(|| Intersection {
                        id,
                        hexes: Vec::new(),
                        edges: Vec::new(),
                        building: None,
                        port: None,
                    });
                intersection.hexes.push(tile.coord);
                intersection.hexes.sort();
            }

            for direction in EdgeDirection::ALL {
                let id = tile.coord.side(direction);
                if board.edges.contains_key(&id) {
                    continue;
                }
                let endpoints = tile.coord.side_endpoints(direction);
                for endpoint in &endpoints {
                    if let Some(intersection) = board.intersections.get_mut(endpoint) {
                        intersection.edges.push(id.clone());
                        intersection.edges.sort();
                    }
                }
                board.edges.insert(
                    id.clone(),
                    Edge {
                        id,
                        endpoints,
                        road: None,
                    },
                );
            }
        }

        for tile in tiles {
            board.tiles.insert(tile.coord.key(), tile);
        }

        for (coord, direction, kind) in ports {
            let side = coord.side(*direction);
            let coastal = board.tiles.contains_key(&coord.key())
                && !board.tiles.contains_key(&coord.neighbor(*direction).key());
            if !coastal {
                return Err(GameError::MalformedBoard(format!(
                    "port side {side} is not on the coast"
                )));
            }
            for endpoint in coord.side_endpoints(*direction) {
                if let Some(intersection) = board.intersections.get_mut(&endpoint) {
                    intersection.port = Some(Port::new(*kind));
                }
            }
        }

        Ok(board)
    }

    // ==================== Query Methods ====================

    /// Get a tile by coordinate
    pub fn tile(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord.key())
    }

    /// All tiles in key order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn intersection(&self, id: &IntersectionId) -> Option<&Intersection> {
        self.intersections.get(id)
    }

    /// All intersections in id order
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// All edges in id order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the robber's current location
    pub fn robber_hex(&self) -> HexCoord {
        self.robber
    }

    /// Owner of the building at `id`, if any
    pub fn building_owner(&self, id: &IntersectionId) -> Option<&str> {
        self.intersections.get(id).and_then(Intersection::owner)
    }

    /// Owner of the road at `id`, if any
    pub fn road_owner(&self, id: &EdgeId) -> Option<&str> {
        self.edges.get(id).and_then(Edge::owner)
    }

    /// Intersections one edge away from `id`
    pub fn neighbors_of(&self, id: &IntersectionId) -> Vec<&IntersectionId> {
        let Some(intersection) = self.intersections.get(id) else {
            return Vec::new();
        };
        intersection
            .edges
            .iter()
            .filter_map(|edge| self.edges.get(edge))
            .map(|edge| edge.other_end(id))
            .collect()
    }

    /// Tiles touching an intersection
    pub fn tiles_at(&self, id: &IntersectionId) -> Vec<&Tile> {
        self.intersections
            .get(id)
            .map(|intersection| {
                intersection
                    .hexes
                    .iter()
                    .filter_map(|hex| self.tile(hex))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ports a player reaches through their buildings
    pub fn ports_of(&self, player: &str) -> Vec<Port> {
        self.intersections
            .values()
            .filter(|i| i.owner() == Some(player))
            .filter_map(|i| i.port)
            .collect()
    }

    /// Owners of buildings on the corners of `hex`, in id order
    pub fn owners_around(&self, hex: &HexCoord) -> BTreeSet<&str> {
        hex.corners()
            .iter()
            .filter_map(|corner| self.building_owner(corner))
            .collect()
    }

    /// Edges holding one of `player`'s roads
    pub fn roads_of<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .values()
            .filter(move |edge| edge.owner() == Some(player))
    }

    // ==================== Mutation Methods ====================

    /// Put a building on an intersection (assumes validation already done)
    pub(crate) fn set_building(&mut self, id: &IntersectionId, building: Building) {
        if let Some(intersection) = self.intersections.get_mut(id) {
            intersection.building = Some(building);
        }
    }

    /// Put a road on an edge (assumes validation already done)
    pub(crate) fn set_road(&mut self, id: &EdgeId, owner: &str) {
        if let Some(edge) = self.edges.get_mut(id) {
            edge.road = Some(Road {
                owner: owner.to_string(),
            });
        }
    }

    /// Move the robber to a new location
    pub(crate) fn set_robber(&mut self, hex: HexCoord) {
        let old_key = self.robber.key();
        if let Some(tile) = self.tiles.get_mut(&old_key) {
            tile.has_robber = false;
        }
        if let Some(tile) = self.tiles.get_mut(&hex.key()) {
            tile.has_robber = true;
        }
        self.robber = hex;
    }
}

/// Shuffle number discs, retrying a bounded number of times to keep 6 and 8 apart
fn assign_numbers_avoiding_adjacent_68<R: Rng + ?Sized>(
    positions: &[HexCoord],
    rng: &mut R,
) -> Vec<u8> {
    const MAX_ATTEMPTS: usize = 100;

    let mut numbers = STANDARD_NUMBERS.to_vec();
    for _ in 0..MAX_ATTEMPTS {
        numbers.shuffle(rng);
        if is_valid_number_placement(positions, &numbers) {
            break;
        }
    }
    numbers
}

/// Check if a number placement is valid (no adjacent 6 and 8)
fn is_valid_number_placement(positions: &[HexCoord], numbers: &[u8]) -> bool {
    let coord_to_number: HashMap<HexCoord, u8> =
        positions.iter().copied().zip(numbers.iter().copied()).collect();

    coord_to_number.iter().all(|(coord, &number)| {
        !is_red(number)
            || coord
                .neighbors()
                .iter()
                .filter_map(|n| coord_to_number.get(n))
                .all(|&n| !is_red(n))
    })
}

fn is_red(number: u8) -> bool {
    number == 6 || number == 8
}
