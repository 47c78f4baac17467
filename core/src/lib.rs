#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the warfront engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems, and adapters. Adapters and AI controllers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values.
//! AI controllers answer each decision step with [`Decision`] values that the
//! surrounding turn loop turns into commands.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terrain label assigned to interior cells that were never written.
pub const DEFAULT_INTERIOR_LABEL: &str = "plains";

/// Terrain label reported for every cell on the map border.
pub const DEFAULT_EDGE_LABEL: &str = "edge";

/// Damage a successful defense always inflicts on the attacker.
pub const RETALIATION_DAMAGE: u32 = 1;

/// Location of a single map cell expressed as integer x/y coordinates.
///
/// The y axis grows downwards, matching screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Builds a coordinate from untyped components.
    ///
    /// Exactly two components that fit the coordinate range are accepted;
    /// anything else is reported as [`GridError::TypeMismatch`].
    pub fn from_components(components: &[i64]) -> Result<Self, GridError> {
        let mismatch = || GridError::TypeMismatch {
            found: format!("{components:?}"),
        };
        let [x, y] = components else {
            return Err(mismatch());
        };
        let x = i32::try_from(*x).map_err(|_| mismatch())?;
        let y = i32::try_from(*y).map_err(|_| mismatch())?;
        Ok(Self::new(x, y))
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Chebyshev distance between two coordinates.
    ///
    /// Diagonal and orthogonal steps cost the same, so this is the number of
    /// single steps separating the cells on an open map.
    #[must_use]
    pub fn chebyshev_distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Returns the neighbouring coordinate in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Coord {
        let (dx, dy) = direction.vector();
        Coord::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Straight-line heading toward `other`, with each axis clamped to -1/0/1.
    ///
    /// Returns `None` when both coordinates coincide.
    #[must_use]
    pub fn heading_to(self, other: Coord) -> Option<Direction> {
        let dx = (other.x - self.x).signum();
        let dy = (other.y - self.y).signum();
        Direction::from_vector(dx, dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive map extent: valid coordinates lie in `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    width: i32,
    height: i32,
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const CARDINAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

impl Bounds {
    /// Creates a new extent with the provided maximum coordinates.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Largest valid x coordinate.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Largest valid y coordinate.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Reports whether the coordinate lies inside the extent, borders included.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x <= self.width && coord.y <= self.height
    }

    /// Reports whether the coordinate lies on the border of the extent.
    #[must_use]
    pub const fn is_edge(&self, coord: Coord) -> bool {
        coord.x == 0 || coord.y == 0 || coord.x == self.width || coord.y == self.height
    }

    /// Fails with [`GridError::OutOfBounds`] when the coordinate lies outside.
    pub fn check(&self, coord: Coord) -> Result<(), GridError> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Up to eight adjacent coordinates inside the extent.
    ///
    /// Border cells are valid neighbours; passability is a terrain concern.
    pub fn neighbors(self, coord: Coord) -> impl Iterator<Item = Coord> {
        self.offsets(coord, &NEIGHBOR_OFFSETS)
    }

    /// Up to four orthogonally adjacent coordinates inside the extent.
    pub fn cardinal_neighbors(self, coord: Coord) -> impl Iterator<Item = Coord> {
        self.offsets(coord, &CARDINAL_OFFSETS)
    }

    /// Up to four diagonally adjacent coordinates inside the extent.
    pub fn diagonal_neighbors(self, coord: Coord) -> impl Iterator<Item = Coord> {
        self.offsets(coord, &DIAGONAL_OFFSETS)
    }

    fn offsets(
        self,
        coord: Coord,
        offsets: &'static [(i32, i32)],
    ) -> impl Iterator<Item = Coord> {
        offsets
            .iter()
            .map(move |&(dx, dy)| Coord::new(coord.x + dx, coord.y + dy))
            .filter(move |candidate| self.contains(*candidate))
    }
}

/// Compass directions available to a single step.
///
/// Vectors follow screen space, so `North` decreases y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing y.
    North,
    /// Movement toward increasing x and decreasing y.
    NorthEast,
    /// Movement toward increasing x.
    East,
    /// Movement toward increasing x and increasing y.
    SouthEast,
    /// Movement toward increasing y.
    South,
    /// Movement toward decreasing x and increasing y.
    SouthWest,
    /// Movement toward decreasing x.
    West,
    /// Movement toward decreasing x and decreasing y.
    NorthWest,
}

impl Direction {
    /// Every direction, in enumeration order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit vector applied to a coordinate when stepping in this direction.
    #[must_use]
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Resolves a unit vector back into a direction.
    #[must_use]
    pub const fn from_vector(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, -1) => Some(Self::NorthEast),
            (1, 0) => Some(Self::East),
            (1, 1) => Some(Self::SouthEast),
            (0, 1) => Some(Self::South),
            (-1, 1) => Some(Self::SouthWest),
            (-1, 0) => Some(Self::West),
            (-1, -1) => Some(Self::NorthWest),
            _ => None,
        }
    }

    /// Direction of a single step between two adjacent coordinates.
    #[must_use]
    pub fn between(from: Coord, to: Coord) -> Option<Self> {
        if from.chebyshev_distance(to) != 1 {
            return None;
        }
        Self::from_vector(to.x - from.x, to.y - from.y)
    }

    /// Next direction in the steering cycle.
    ///
    /// The cycle runs `(0,1) -> (1,1) -> (1,0) -> (1,-1) -> (0,-1) -> (-1,-1)
    /// -> (-1,0) -> (-1,1)` and back, which is clockwise with y pointing up.
    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        match self {
            Self::South => Self::SouthEast,
            Self::SouthEast => Self::East,
            Self::East => Self::NorthEast,
            Self::NorthEast => Self::North,
            Self::North => Self::NorthWest,
            Self::NorthWest => Self::West,
            Self::West => Self::SouthWest,
            Self::SouthWest => Self::South,
        }
    }
}

/// Unique identifier assigned to a unit or city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reports whether two owners are hostile to each other.
///
/// Unowned entities are foreign to everybody, including other unowned ones.
#[must_use]
pub fn is_foreign(owner: Option<PlayerId>, other: Option<PlayerId>) -> bool {
    match (owner, other) {
        (Some(owner), Some(other)) => owner != other,
        _ => true,
    }
}

/// Symbolic tag on a map cell governing passability.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainLabel(String);

impl TerrainLabel {
    /// Creates a new terrain label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// String form of the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TerrainLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl fmt::Display for TerrainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to a bounded terrain map.
///
/// Implemented by the live terrain grid and by temporary overlays built on
/// top of it, so searches can run against either.
pub trait TerrainView {
    /// Extent of the map.
    fn bounds(&self) -> Bounds;

    /// Terrain label at the provided coordinate.
    fn terrain_at(&self, coord: Coord) -> Result<&TerrainLabel, GridError>;
}

/// Closed set of entity kinds known to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Stationary installation that can be captured.
    City,
    /// Basic ground unit.
    Infantry,
}

impl EntityKind {
    /// Reports whether entities of this kind can be entered by friendly units.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::City)
    }
}

/// Errors raised by terrain grid access.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The coordinate lies outside the declared map extent.
    #[error("coordinate {coord} lies outside [0, {width}] x [0, {height}]")]
    OutOfBounds {
        /// Coordinate that was requested.
        coord: Coord,
        /// Largest valid x coordinate.
        width: i32,
        /// Largest valid y coordinate.
        height: i32,
    },
    /// The key used to address the grid is not a coordinate pair.
    #[error("malformed map coordinate {found}")]
    TypeMismatch {
        /// Debug rendering of the rejected key.
        found: String,
    },
}

/// One output of an AI decision step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The controller has no unit left to move this turn.
    EndTurn,
    /// The controller picked a unit to act with, for presentation.
    Select {
        /// Unit that was picked.
        unit: EntityId,
    },
    /// The controller wants the unit to take one step.
    Move {
        /// Unit that should step.
        unit: EntityId,
        /// Direction of the step.
        direction: Direction,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a unit advance a single step in the specified direction.
    MoveUnit {
        /// Identifier of the unit attempting to move.
        unit: EntityId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Consumes the remaining movement budget of a unit for this turn.
    ExhaustMovement {
        /// Unit whose budget is consumed.
        unit: EntityId,
    },
    /// Closes the turn of a player, resetting its units' movement budgets.
    EndTurn {
        /// Player whose turn ends.
        player: PlayerId,
        /// Turn number reported in the unit summaries.
        turn: u32,
    },
    /// Overrides the terrain of a single cell.
    SetTerrain {
        /// Cell to change.
        coord: Coord,
        /// Label to store.
        label: TerrainLabel,
    },
}

/// Reasons a single step may be refused without a conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The unit already used its movement budget this turn.
    Exhausted,
    /// The destination terrain cannot be entered by the unit.
    Impassable,
    /// The destination is held by a friendly entity that cannot be entered.
    Occupied,
    /// The destination lies outside the map.
    OutOfBounds,
}

/// Result of asking a unit to take one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The unit moved and consumed one step of its budget.
    Moved {
        /// Cell occupied before the step.
        from: Coord,
        /// Cell occupied after the step.
        to: Coord,
    },
    /// The unit stayed put.
    Rejected(MoveRejection),
    /// The destination holds a foreign entity; combat must be resolved externally.
    Conflict(EntityId),
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Unit that moved.
        unit: EntityId,
        /// Cell the unit occupied before moving.
        from: Coord,
        /// Cell the unit occupies after moving.
        to: Coord,
    },
    /// Reports that a step was refused.
    MoveRejected {
        /// Unit that attempted the step.
        unit: EntityId,
        /// Why the step was refused.
        reason: MoveRejection,
    },
    /// Reports that a step ran into a foreign entity.
    ConflictDetected {
        /// Unit that attempted the step.
        attacker: EntityId,
        /// Entity holding the destination cell.
        defender: EntityId,
    },
    /// Confirms that a unit's remaining budget was consumed.
    MovementExhausted {
        /// Unit whose budget was consumed.
        unit: EntityId,
    },
    /// Human-readable summary of a unit's finished turn.
    UnitTurnSummary {
        /// Unit the summary describes.
        unit: EntityId,
        /// Summary text.
        summary: String,
    },
    /// Confirms that a cell's terrain was overridden.
    TerrainChanged {
        /// Cell that changed.
        coord: Coord,
        /// Label now stored for the cell.
        label: TerrainLabel,
    },
    /// Reports that a terrain change could not be applied.
    TerrainChangeRejected {
        /// Cell that was targeted.
        coord: Coord,
        /// Why the change failed.
        reason: GridError,
    },
}
