//! Terrain view used while planning a single unit's path.

use std::collections::BTreeSet;

use warfront_core::{is_foreign, Bounds, Coord, GridError, TerrainLabel, TerrainView};
use warfront_world::{query, TerrainGrid, Unit, World};

/// Live terrain with every cell held by a friendly unit relabelled as edge.
///
/// The overlay borrows the world's grid and never writes to it, so the
/// blocking disappears as soon as the plan is made.
#[derive(Debug)]
pub struct FriendlyBlockedTerrain<'a> {
    terrain: &'a TerrainGrid,
    blocked: BTreeSet<Coord>,
}

impl<'a> FriendlyBlockedTerrain<'a> {
    /// Builds the overlay seen by `mover`, which never blocks itself.
    #[must_use]
    pub fn new(world: &'a World, mover: &Unit) -> Self {
        let blocked = query::units(world)
            .iter()
            .filter(|unit| unit.id() != mover.id() && !is_foreign(mover.owner(), unit.owner()))
            .map(Unit::coord)
            .collect();

        Self {
            terrain: query::terrain(world),
            blocked,
        }
    }

    /// Reports whether the overlay relabels the cell.
    #[must_use]
    pub fn is_blocked(&self, coord: Coord) -> bool {
        self.blocked.contains(&coord)
    }
}

impl TerrainView for FriendlyBlockedTerrain<'_> {
    fn bounds(&self) -> Bounds {
        self.terrain.bounds()
    }

    fn terrain_at(&self, coord: Coord) -> Result<&TerrainLabel, GridError> {
        let label = self.terrain.terrain_at(coord)?;
        if self.is_blocked(coord) {
            Ok(self.terrain.edge_label())
        } else {
            Ok(label)
        }
    }
}
