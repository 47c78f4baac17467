//! Scenario files describing the starting position of a match.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use warfront_core::{Bounds, Coord, EntityKind, GridError, PlayerId, TerrainLabel};
use warfront_system_ai::ControllerTuning;
use warfront_world::{query, Namer, World, WorldConfig, WorldError};

const BUILTIN_SCENARIO: &str = include_str!("../scenarios/skirmish.toml");
const DEFAULT_TURNS: u32 = 10;

/// Reasons a scenario cannot be turned into a world.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The file is not a well-formed scenario document.
    #[error("scenario is not valid: {0}")]
    Parse(#[from] toml::de::Error),
    /// No player was declared.
    #[error("scenario declares no players")]
    NoPlayers,
    /// Two players share a name.
    #[error("player `{0}` is declared twice")]
    DuplicatePlayer(String),
    /// An owner names a player that was not declared.
    #[error("unknown player `{0}`")]
    UnknownPlayer(String),
    /// A coordinate list does not describe a map cell.
    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] GridError),
    /// The world refused a placement.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Parsed scenario document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Seed for every random choice made while playing.
    #[serde(default)]
    pub(crate) seed: u64,
    /// Number of full turns to play.
    #[serde(default = "default_turns")]
    pub(crate) turns: u32,
    /// Tuning shared by every AI player.
    #[serde(default)]
    pub(crate) tuning: ControllerTuning,
    #[serde(default)]
    map: WorldConfig,
    #[serde(default)]
    infantry_names: Vec<String>,
    #[serde(default)]
    terrain: Vec<TerrainPatch>,
    #[serde(default)]
    players: Vec<PlayerSpec>,
    #[serde(default)]
    cities: Vec<CitySpec>,
    #[serde(default)]
    units: Vec<UnitSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TerrainPatch {
    label: TerrainLabel,
    #[serde(default)]
    cells: Vec<Vec<i64>>,
    #[serde(default)]
    rects: Vec<RectSpec>,
}

/// Inclusive rectangle of cells.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RectSpec {
    from: Vec<i64>,
    to: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlayerSpec {
    name: String,
    #[serde(default = "default_ai")]
    ai: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CitySpec {
    at: Vec<i64>,
    owner: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitSpec {
    #[serde(default = "default_unit_kind")]
    kind: EntityKind,
    at: Vec<i64>,
    owner: Option<String>,
    name: Option<String>,
}

fn default_turns() -> u32 {
    DEFAULT_TURNS
}

fn default_ai() -> bool {
    true
}

fn default_unit_kind() -> EntityKind {
    EntityKind::Infantry
}

/// Participant of a match, in turn order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PlayerSetup {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) ai: bool,
}

/// World and players ready to play.
#[derive(Debug)]
pub(crate) struct Setup {
    pub(crate) world: World,
    pub(crate) players: Vec<PlayerSetup>,
}

impl Scenario {
    /// Parses a scenario document.
    pub(crate) fn parse(contents: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(contents)?)
    }

    /// Skirmish bundled with the binary.
    pub(crate) fn builtin() -> Result<Self, ScenarioError> {
        Self::parse(BUILTIN_SCENARIO)
    }

    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse scenario at {}", path.display()))
    }

    /// Builds the starting world.
    pub(crate) fn build(&self) -> Result<Setup, ScenarioError> {
        let players = self.players()?;
        let ids: HashMap<&str, PlayerId> = players
            .iter()
            .map(|player| (player.name.as_str(), player.id))
            .collect();
        let owner_of = |owner: &Option<String>| -> Result<Option<PlayerId>, ScenarioError> {
            owner
                .as_deref()
                .map(|name| {
                    ids.get(name)
                        .copied()
                        .ok_or_else(|| ScenarioError::UnknownPlayer(name.to_owned()))
                })
                .transpose()
        };

        let mut world = World::new(&self.map);
        if !self.infantry_names.is_empty() {
            world.set_infantry_namer(Namer::new(
                self.infantry_names.clone(),
                false,
                self.map.name_seed,
            ));
        }

        let bounds = query::terrain(&world).bounds();
        for patch in &self.terrain {
            for cell in patch.coords(bounds)? {
                world.set_terrain(cell, patch.label.clone())?;
            }
        }
        for city in &self.cities {
            let _ = world.found_city(
                Coord::from_components(&city.at)?,
                owner_of(&city.owner)?,
                city.name.clone(),
            )?;
        }
        for unit in &self.units {
            let _ = world.spawn_unit(
                unit.kind,
                Coord::from_components(&unit.at)?,
                owner_of(&unit.owner)?,
                unit.name.clone(),
            )?;
        }

        tracing::info!(
            players = players.len(),
            cities = self.cities.len(),
            units = self.units.len(),
            "scenario built"
        );
        Ok(Setup { world, players })
    }

    fn players(&self) -> Result<Vec<PlayerSetup>, ScenarioError> {
        if self.players.is_empty() {
            return Err(ScenarioError::NoPlayers);
        }

        let mut players: Vec<PlayerSetup> = Vec::with_capacity(self.players.len());
        for (index, spec) in (1_u32..).zip(&self.players) {
            if players.iter().any(|player| player.name == spec.name) {
                return Err(ScenarioError::DuplicatePlayer(spec.name.clone()));
            }
            players.push(PlayerSetup {
                id: PlayerId::new(index),
                name: spec.name.clone(),
                ai: spec.ai,
            });
        }
        Ok(players)
    }
}

impl TerrainPatch {
    /// Cells covered by the patch; rectangle corners must lie on the map.
    fn coords(&self, bounds: Bounds) -> Result<Vec<Coord>, GridError> {
        let mut coords = self
            .cells
            .iter()
            .map(|cell| Coord::from_components(cell))
            .collect::<Result<Vec<_>, _>>()?;

        for rect in &self.rects {
            let from = Coord::from_components(&rect.from)?;
            let to = Coord::from_components(&rect.to)?;
            bounds.check(from)?;
            bounds.check(to)?;
            for x in from.x().min(to.x())..=from.x().max(to.x()) {
                for y in from.y().min(to.y())..=from.y().max(to.y()) {
                    coords.push(Coord::new(x, y));
                }
            }
        }
        Ok(coords)
    }
}
