//! Mobile units, stationary cities and the attributes they share.

use std::collections::BTreeSet;

use warfront_core::{Coord, EntityId, EntityKind, PlayerId, TerrainLabel, RETALIATION_DAMAGE};

/// Damage capacity and combat values shared by units and cities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatProfile {
    /// Damage capacity at full health.
    pub max_strength: u32,
    /// Damage capacity remaining.
    pub current_strength: u32,
    /// Attack strength and damage dealt.
    pub attack: u32,
    /// Defense strength; a successful defense always deals one point of damage.
    pub defense: u32,
}

impl CombatProfile {
    /// Creates a profile at full strength.
    #[must_use]
    pub const fn new(max_strength: u32, attack: u32, defense: u32) -> Self {
        Self {
            max_strength,
            current_strength: max_strength,
            attack,
            defense,
        }
    }

    /// Reports whether no damage capacity remains.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.current_strength == 0
    }

    /// Applies the fixed damage a successful defender deals to its attacker.
    ///
    /// Returns whether the attacker is destroyed by it.
    pub fn suffer_retaliation(&mut self) -> bool {
        self.current_strength = self.current_strength.saturating_sub(RETALIATION_DAMAGE);
        self.is_destroyed()
    }
}

/// Per-turn movement budget and terrain restrictions of a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementProfile {
    speed: u32,
    moved: u32,
    impassable: BTreeSet<TerrainLabel>,
}

impl MovementProfile {
    /// Creates a fresh budget of `speed` steps per turn.
    #[must_use]
    pub fn new(speed: u32, impassable: impl IntoIterator<Item = TerrainLabel>) -> Self {
        Self {
            speed,
            moved: 0,
            impassable: impassable.into_iter().collect(),
        }
    }

    /// Steps allowed per turn.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Steps already consumed this turn.
    #[must_use]
    pub const fn moved(&self) -> u32 {
        self.moved
    }

    /// Reports whether at least one step remains this turn.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.moved < self.speed
    }

    /// Terrain labels the unit cannot enter.
    #[must_use]
    pub fn impassable(&self) -> &BTreeSet<TerrainLabel> {
        &self.impassable
    }

    /// Reports whether the unit may stand on the provided terrain.
    #[must_use]
    pub fn can_enter(&self, label: &TerrainLabel) -> bool {
        !self.impassable.contains(label)
    }

    pub(crate) fn record_step(&mut self) {
        self.moved = self.moved.saturating_add(1);
    }

    pub(crate) fn exhaust(&mut self) {
        self.moved = self.moved.max(self.speed);
    }

    /// Clears the consumed steps, returning how many had been used.
    pub(crate) fn reset(&mut self) -> u32 {
        std::mem::take(&mut self.moved)
    }
}

/// Mobile unit that can be moved around the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) name: String,
    pub(crate) coord: Coord,
    pub(crate) owner: Option<PlayerId>,
    pub(crate) combat: CombatProfile,
    pub(crate) movement: MovementProfile,
    pub(crate) build_time: u32,
}

impl Unit {
    pub(crate) fn infantry(
        id: EntityId,
        name: String,
        coord: Coord,
        owner: Option<PlayerId>,
        edge: &TerrainLabel,
    ) -> Self {
        Self {
            id,
            kind: EntityKind::Infantry,
            name,
            coord,
            owner,
            combat: CombatProfile::new(1, 1, 1),
            movement: MovementProfile::new(1, [edge.clone(), TerrainLabel::new("water")]),
            build_time: 2,
        }
    }

    /// Identifier of the unit.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Kind of the unit.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Display name assigned at creation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell the unit occupies.
    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Player controlling the unit, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Combat attributes of the unit.
    #[must_use]
    pub const fn combat(&self) -> &CombatProfile {
        &self.combat
    }

    /// Movement budget and terrain restrictions of the unit.
    #[must_use]
    pub const fn movement(&self) -> &MovementProfile {
        &self.movement
    }

    /// Turns a city needs to produce this unit.
    #[must_use]
    pub const fn build_time(&self) -> u32 {
        self.build_time
    }
}

/// Stationary installation that friendly units may enter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct City {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) coord: Coord,
    pub(crate) owner: Option<PlayerId>,
    pub(crate) combat: CombatProfile,
}

impl City {
    pub(crate) fn new(id: EntityId, name: String, coord: Coord, owner: Option<PlayerId>) -> Self {
        Self {
            id,
            name,
            coord,
            owner,
            combat: CombatProfile::new(1, 0, 1),
        }
    }

    /// Identifier of the city.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Display name of the city.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell the city stands on.
    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Player holding the city, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Combat attributes of the city.
    #[must_use]
    pub const fn combat(&self) -> &CombatProfile {
        &self.combat
    }
}

/// Borrowed view of whatever entity holds a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant<'a> {
    /// A city stands on the cell.
    City(&'a City),
    /// A unit stands on the cell.
    Unit(&'a Unit),
}

impl Occupant<'_> {
    /// Identifier of the occupying entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::City(city) => city.id,
            Self::Unit(unit) => unit.id,
        }
    }

    /// Owner of the occupying entity.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        match self {
            Self::City(city) => city.owner,
            Self::Unit(unit) => unit.owner,
        }
    }

    /// Kind of the occupying entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::City(_) => EntityKind::City,
            Self::Unit(unit) => unit.kind,
        }
    }

    /// Cell the occupying entity stands on.
    #[must_use]
    pub const fn coord(&self) -> Coord {
        match self {
            Self::City(city) => city.coord,
            Self::Unit(unit) => unit.coord,
        }
    }
}
