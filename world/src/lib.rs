#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for warfront.
//!
//! The world owns the terrain grid and every unit and city. Setup helpers
//! populate it; gameplay mutations arrive as [`Command`] values through
//! [`apply`], which reports what happened as [`Event`] values. Read access
//! goes through the [`query`] module.

mod entities;
mod namer;
mod terrain;

use serde::Deserialize;
use thiserror::Error;
use warfront_core::{
    is_foreign, Command, Coord, Direction, EntityId, EntityKind, Event, GridError, MoveOutcome,
    MoveRejection, PlayerId, TerrainLabel, DEFAULT_EDGE_LABEL, DEFAULT_INTERIOR_LABEL,
};

pub use entities::{City, CombatProfile, MovementProfile, Occupant, Unit};
pub use namer::{ordinal, Namer, INFANTRY_NAMES};
pub use terrain::TerrainGrid;

const DEFAULT_MAP_WIDTH: u16 = 10;
const DEFAULT_MAP_HEIGHT: u16 = 10;
const DEFAULT_NAME_SEED: u64 = 0x5eed_0f_a7_11e5;

/// Static parameters used to build a [`World`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Largest valid x coordinate.
    pub width: u16,
    /// Largest valid y coordinate.
    pub height: u16,
    /// Label of unset interior cells.
    pub interior: TerrainLabel,
    /// Label of border cells.
    pub edge: TerrainLabel,
    /// Seed for the cosmetic name pools.
    pub name_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            interior: TerrainLabel::new(DEFAULT_INTERIOR_LABEL),
            edge: TerrainLabel::new(DEFAULT_EDGE_LABEL),
            name_seed: DEFAULT_NAME_SEED,
        }
    }
}

/// Errors raised by world setup and direct entity manipulation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Terrain access failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// No unit or city carries the identifier.
    #[error("no entity with id {}", .0.get())]
    UnknownEntity(EntityId),
    /// Another entity already stands on the cell.
    #[error("cell {0} is already occupied")]
    CellOccupied(Coord),
    /// The kind cannot be spawned as a mobile unit.
    #[error("{0:?} is not a mobile unit kind")]
    NotMobile(EntityKind),
}

/// Represents the authoritative warfront world state.
#[derive(Debug)]
pub struct World {
    terrain: TerrainGrid,
    units: Vec<Unit>,
    cities: Vec<City>,
    next_entity: u32,
    infantry_names: Namer,
}

impl World {
    /// Creates an empty world over a fresh terrain grid.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            terrain: TerrainGrid::new(
                config.width,
                config.height,
                config.interior.clone(),
                config.edge.clone(),
            ),
            units: Vec::new(),
            cities: Vec::new(),
            next_entity: 1,
            infantry_names: Namer::infantry(config.name_seed),
        }
    }

    /// Replaces the name pool used for new infantry.
    pub fn set_infantry_namer(&mut self, namer: Namer) {
        self.infantry_names = namer;
    }

    /// Overrides the terrain of a single cell.
    pub fn set_terrain(&mut self, coord: Coord, label: TerrainLabel) -> Result<(), WorldError> {
        self.terrain.set_terrain(coord, label)?;
        Ok(())
    }

    /// Creates a mobile unit on an empty cell.
    ///
    /// Units without an explicit name draw one from the kind's name pool.
    pub fn spawn_unit(
        &mut self,
        kind: EntityKind,
        coord: Coord,
        owner: Option<PlayerId>,
        name: Option<String>,
    ) -> Result<EntityId, WorldError> {
        if kind != EntityKind::Infantry {
            return Err(WorldError::NotMobile(kind));
        }
        self.ensure_vacant(coord)?;

        let id = self.allocate_id();
        let name = name.unwrap_or_else(|| self.infantry_names.next_name());
        tracing::debug!(unit = id.get(), %coord, name = %name, "spawned unit");
        self.units.push(Unit::infantry(
            id,
            name,
            coord,
            owner,
            self.terrain.edge_label(),
        ));
        Ok(id)
    }

    /// Creates a city on an empty cell.
    pub fn found_city(
        &mut self,
        coord: Coord,
        owner: Option<PlayerId>,
        name: Option<String>,
    ) -> Result<EntityId, WorldError> {
        self.ensure_vacant(coord)?;

        let id = self.allocate_id();
        let name = name.unwrap_or_else(|| format!("City {}", id.get()));
        tracing::debug!(city = id.get(), %coord, name = %name, "founded city");
        self.cities.push(City::new(id, name, coord, owner));
        Ok(id)
    }

    /// Transfers an entity to a new owner.
    pub fn set_owner(&mut self, entity: EntityId, owner: Option<PlayerId>) -> Result<(), WorldError> {
        if let Some(unit) = self.units.iter_mut().find(|unit| unit.id == entity) {
            unit.owner = owner;
            return Ok(());
        }
        if let Some(city) = self.cities.iter_mut().find(|city| city.id == entity) {
            city.owner = owner;
            return Ok(());
        }
        Err(WorldError::UnknownEntity(entity))
    }

    /// Attempts a single step of the unit in the provided direction.
    ///
    /// Stepping off the map surfaces [`GridError::OutOfBounds`]; every other
    /// refusal is reported through the returned [`MoveOutcome`].
    pub fn move_unit(&mut self, unit: EntityId, direction: Direction) -> Result<MoveOutcome, WorldError> {
        let index = self.unit_index(unit)?;
        let mover = &self.units[index];
        if !mover.movement.can_move() {
            return Ok(MoveOutcome::Rejected(MoveRejection::Exhausted));
        }

        let from = mover.coord;
        let to = from.step(direction);
        let label = self.terrain.terrain_at(to)?;
        if !mover.movement.can_enter(label) {
            return Ok(MoveOutcome::Rejected(MoveRejection::Impassable));
        }

        match query::occupant_at(self, to, Some(unit)) {
            None => {}
            Some(occupant) if is_foreign(mover.owner, occupant.owner()) => {
                return Ok(MoveOutcome::Conflict(occupant.id()));
            }
            Some(Occupant::City(_)) => {}
            Some(Occupant::Unit(_)) => {
                return Ok(MoveOutcome::Rejected(MoveRejection::Occupied));
            }
        }

        let mover = &mut self.units[index];
        mover.coord = to;
        mover.movement.record_step();
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Consumes whatever movement budget the unit has left this turn.
    pub fn exhaust_movement(&mut self, unit: EntityId) -> Result<(), WorldError> {
        let index = self.unit_index(unit)?;
        self.units[index].movement.exhaust();
        Ok(())
    }

    /// Resets the budgets of every unit owned by `player`.
    ///
    /// Returns one human-readable summary per reset unit.
    pub fn end_turn(&mut self, player: PlayerId, turn: u32) -> Vec<(EntityId, String)> {
        self.units
            .iter_mut()
            .filter(|unit| unit.owner == Some(player))
            .map(|unit| {
                let moved = unit.movement.reset();
                (unit.id, format!("{} turn {turn} moved {moved}", unit.name))
            })
            .collect()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.saturating_add(1);
        id
    }

    fn ensure_vacant(&self, coord: Coord) -> Result<(), WorldError> {
        let _ = self.terrain.terrain_at(coord)?;
        if query::occupant_at(self, coord, None).is_some() {
            return Err(WorldError::CellOccupied(coord));
        }
        Ok(())
    }

    fn unit_index(&self, unit: EntityId) -> Result<usize, WorldError> {
        self.units
            .iter()
            .position(|candidate| candidate.id == unit)
            .ok_or(WorldError::UnknownEntity(unit))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands naming unknown entities are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MoveUnit { unit, direction } => match world.move_unit(unit, direction) {
            Ok(MoveOutcome::Moved { from, to }) => {
                tracing::debug!(unit = unit.get(), %from, %to, "unit moved");
                out_events.push(Event::UnitMoved { unit, from, to });
            }
            Ok(MoveOutcome::Rejected(reason)) => {
                tracing::debug!(unit = unit.get(), ?reason, "move rejected");
                out_events.push(Event::MoveRejected { unit, reason });
            }
            Ok(MoveOutcome::Conflict(defender)) => {
                tracing::debug!(unit = unit.get(), defender = defender.get(), "conflict");
                out_events.push(Event::ConflictDetected {
                    attacker: unit,
                    defender,
                });
            }
            Err(WorldError::Grid(GridError::OutOfBounds { .. })) => {
                out_events.push(Event::MoveRejected {
                    unit,
                    reason: MoveRejection::OutOfBounds,
                });
            }
            Err(error) => {
                tracing::debug!(unit = unit.get(), %error, "move command dropped");
            }
        },
        Command::ExhaustMovement { unit } => {
            if world.exhaust_movement(unit).is_ok() {
                out_events.push(Event::MovementExhausted { unit });
            }
        }
        Command::EndTurn { player, turn } => {
            for (unit, summary) in world.end_turn(player, turn) {
                out_events.push(Event::UnitTurnSummary { unit, summary });
            }
        }
        Command::SetTerrain { coord, label } => {
            match world.terrain.set_terrain(coord, label.clone()) {
                Ok(()) => out_events.push(Event::TerrainChanged { coord, label }),
                Err(reason) => out_events.push(Event::TerrainChangeRejected { coord, reason }),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use warfront_core::{Coord, EntityId, PlayerId};

    use super::{City, Occupant, TerrainGrid, Unit, World};

    /// Provides read-only access to the world's terrain grid.
    #[must_use]
    pub fn terrain(world: &World) -> &TerrainGrid {
        &world.terrain
    }

    /// All units in creation order.
    #[must_use]
    pub fn units(world: &World) -> &[Unit] {
        &world.units
    }

    /// All cities in creation order.
    #[must_use]
    pub fn cities(world: &World) -> &[City] {
        &world.cities
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(world: &World, id: EntityId) -> Option<&Unit> {
        world.units.iter().find(|unit| unit.id == id)
    }

    /// Looks up a city by identifier.
    #[must_use]
    pub fn city(world: &World, id: EntityId) -> Option<&City> {
        world.cities.iter().find(|city| city.id == id)
    }

    /// Units controlled by the player, in creation order.
    pub fn units_owned_by(world: &World, player: PlayerId) -> impl Iterator<Item = &Unit> {
        world
            .units
            .iter()
            .filter(move |unit| unit.owner == Some(player))
    }

    /// Entity holding the cell, ignoring `excluding`.
    ///
    /// Cities take precedence over units sharing their cell.
    #[must_use]
    pub fn occupant_at(world: &World, coord: Coord, excluding: Option<EntityId>) -> Option<Occupant<'_>> {
        world
            .cities
            .iter()
            .find(|city| city.coord == coord && Some(city.id) != excluding)
            .map(Occupant::City)
            .or_else(|| {
                world
                    .units
                    .iter()
                    .find(|unit| unit.coord == coord && Some(unit.id) != excluding)
                    .map(Occupant::Unit)
            })
    }

    /// Next unit of the player that still has movement left this turn.
    #[must_use]
    pub fn next_unit_to_move(world: &World, player: PlayerId) -> Option<EntityId> {
        units_owned_by(world, player)
            .find(|unit| unit.movement.can_move())
            .map(|unit| unit.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(&WorldConfig {
            width: 6,
            height: 6,
            ..WorldConfig::default()
        })
    }

    const RED: PlayerId = PlayerId::new(1);
    const BLUE: PlayerId = PlayerId::new(2);

    #[test]
    fn spawning_assigns_unique_ids_and_names() {
        let mut world = world();
        let first = world
            .spawn_unit(EntityKind::Infantry, Coord::new(2, 2), Some(RED), None)
            .expect("spawn");
        let second = world
            .spawn_unit(EntityKind::Infantry, Coord::new(3, 2), Some(RED), None)
            .expect("spawn");

        assert_ne!(first, second);
        let first_name = query::unit(&world, first).expect("unit").name().to_owned();
        let second_name = query::unit(&world, second).expect("unit").name().to_owned();
        assert!(first_name.starts_with("1st "));
        assert!(second_name.starts_with("2nd "));
    }

    #[test]
    fn spawning_rejects_occupied_and_outside_cells() {
        let mut world = world();
        let _ = world
            .found_city(Coord::new(2, 2), Some(RED), Some("Harbor".to_owned()))
            .expect("city");

        assert_eq!(
            world.spawn_unit(EntityKind::Infantry, Coord::new(2, 2), Some(RED), None),
            Err(WorldError::CellOccupied(Coord::new(2, 2)))
        );
        assert!(matches!(
            world.spawn_unit(EntityKind::Infantry, Coord::new(7, 2), Some(RED), None),
            Err(WorldError::Grid(GridError::OutOfBounds { .. }))
        ));
        assert_eq!(
            world.spawn_unit(EntityKind::City, Coord::new(3, 3), Some(RED), None),
            Err(WorldError::NotMobile(EntityKind::City))
        );
    }

    #[test]
    fn occupant_lookup_prefers_cities() {
        let mut world = world();
        let city = world.found_city(Coord::new(2, 2), Some(RED), None).expect("city");
        let unit = world
            .spawn_unit(EntityKind::Infantry, Coord::new(3, 2), Some(RED), None)
            .expect("unit");
        assert_eq!(
            world.move_unit(unit, Direction::West),
            Ok(MoveOutcome::Moved {
                from: Coord::new(3, 2),
                to: Coord::new(2, 2),
            })
        );

        let occupant = query::occupant_at(&world, Coord::new(2, 2), None).expect("occupant");
        assert_eq!(occupant.id(), city);
        let occupant = query::occupant_at(&world, Coord::new(2, 2), Some(city)).expect("occupant");
        assert_eq!(occupant.id(), unit);
    }

    #[test]
    fn set_owner_transfers_cities() {
        let mut world = world();
        let city = world.found_city(Coord::new(2, 2), Some(RED), None).expect("city");
        world.set_owner(city, Some(BLUE)).expect("owner");
        assert_eq!(query::city(&world, city).expect("city").owner(), Some(BLUE));
        assert_eq!(
            world.set_owner(EntityId::new(99), None),
            Err(WorldError::UnknownEntity(EntityId::new(99)))
        );
    }

    #[test]
    fn next_unit_to_move_skips_spent_units() {
        let mut world = world();
        let first = world
            .spawn_unit(EntityKind::Infantry, Coord::new(2, 2), Some(RED), None)
            .expect("spawn");
        let second = world
            .spawn_unit(EntityKind::Infantry, Coord::new(4, 4), Some(RED), None)
            .expect("spawn");
        let _ = world
            .spawn_unit(EntityKind::Infantry, Coord::new(2, 4), Some(BLUE), None)
            .expect("spawn");

        assert_eq!(query::next_unit_to_move(&world, RED), Some(first));
        world.exhaust_movement(first).expect("exhaust");
        assert_eq!(query::next_unit_to_move(&world, RED), Some(second));
        world.exhaust_movement(second).expect("exhaust");
        assert_eq!(query::next_unit_to_move(&world, RED), None);
    }

    #[test]
    fn terrain_commands_report_failures() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetTerrain {
                coord: Coord::new(3, 3),
                label: "water".into(),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetTerrain {
                coord: Coord::new(30, 3),
                label: "water".into(),
            },
            &mut events,
        );

        assert_eq!(
            events[0],
            Event::TerrainChanged {
                coord: Coord::new(3, 3),
                label: "water".into(),
            }
        );
        assert!(matches!(
            events[1],
            Event::TerrainChangeRejected {
                reason: GridError::OutOfBounds { .. },
                ..
            }
        ));
        assert_eq!(
            query::terrain(&world).terrain_at(Coord::new(3, 3)),
            Ok(&TerrainLabel::new("water"))
        );
    }
}
