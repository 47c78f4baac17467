//! Bounded terrain map with synthesized border and interior defaults.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use warfront_core::{Bounds, Coord, GridError, TerrainLabel, TerrainView};

/// Terrain label per cell over a fixed `[0, width] x [0, height]` extent.
///
/// Only explicit overrides are stored. Unset interior cells read as the
/// interior label and border cells always read as the edge label, whatever
/// was written to them. Both defaults are permanent members of the label set.
#[derive(Clone, Debug)]
pub struct TerrainGrid {
    bounds: Bounds,
    interior: TerrainLabel,
    edge: TerrainLabel,
    labels: BTreeSet<TerrainLabel>,
    overrides: HashMap<Coord, TerrainLabel>,
    cells_by_label: BTreeMap<TerrainLabel, BTreeSet<Coord>>,
}

impl TerrainGrid {
    /// Creates a grid using the provided default labels.
    #[must_use]
    pub fn new(width: u16, height: u16, interior: TerrainLabel, edge: TerrainLabel) -> Self {
        let labels = [interior.clone(), edge.clone()].into_iter().collect();
        Self {
            bounds: Bounds::new(i32::from(width), i32::from(height)),
            interior,
            edge,
            labels,
            overrides: HashMap::new(),
            cells_by_label: BTreeMap::new(),
        }
    }

    /// Extent of the grid.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Label reported for interior cells that were never written.
    #[must_use]
    pub const fn interior_label(&self) -> &TerrainLabel {
        &self.interior
    }

    /// Label reported for every border cell.
    #[must_use]
    pub const fn edge_label(&self) -> &TerrainLabel {
        &self.edge
    }

    /// Every label the grid has seen, including both defaults.
    #[must_use]
    pub fn labels(&self) -> &BTreeSet<TerrainLabel> {
        &self.labels
    }

    /// Label currently carried by the cell.
    pub fn terrain_at(&self, coord: Coord) -> Result<&TerrainLabel, GridError> {
        self.bounds.check(coord)?;
        if self.bounds.is_edge(coord) {
            return Ok(&self.edge);
        }
        Ok(self.overrides.get(&coord).unwrap_or(&self.interior))
    }

    /// Stores a label for the cell and registers it as a known label.
    ///
    /// Writes to border cells are recorded but stay invisible to reads.
    pub fn set_terrain(&mut self, coord: Coord, label: TerrainLabel) -> Result<(), GridError> {
        self.bounds.check(coord)?;
        let _ = self.labels.insert(label.clone());

        if let Some(previous) = self.overrides.insert(coord, label.clone()) {
            if let Some(cells) = self.cells_by_label.get_mut(&previous) {
                let _ = cells.remove(&coord);
            }
        }
        let _ = self.cells_by_label.entry(label).or_default().insert(coord);
        Ok(())
    }

    /// All coordinates whose effective label equals `label`, in coordinate order.
    ///
    /// Stored overrides come from the reverse index; the interior and edge
    /// defaults are synthesized from the extent since they are never stored.
    #[must_use]
    pub fn cells_with(&self, label: &TerrainLabel) -> Vec<Coord> {
        let mut cells: BTreeSet<Coord> = self
            .cells_by_label
            .get(label)
            .into_iter()
            .flatten()
            .copied()
            .filter(|coord| !self.bounds.is_edge(*coord))
            .collect();

        if *label == self.edge {
            cells.extend(self.all_cells().filter(|coord| self.bounds.is_edge(*coord)));
        }

        if *label == self.interior {
            cells.extend(self.all_cells().filter(|coord| {
                !self.bounds.is_edge(*coord) && !self.overrides.contains_key(coord)
            }));
        }

        cells.into_iter().collect()
    }

    /// Up to eight adjacent coordinates, border cells included.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> {
        self.bounds.neighbors(coord)
    }

    /// Up to four orthogonally adjacent coordinates.
    pub fn cardinal_neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> {
        self.bounds.cardinal_neighbors(coord)
    }

    /// Up to four diagonally adjacent coordinates.
    pub fn diagonal_neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> {
        self.bounds.diagonal_neighbors(coord)
    }

    fn all_cells(&self) -> impl Iterator<Item = Coord> {
        let bounds = self.bounds;
        (0..=bounds.width()).flat_map(move |x| (0..=bounds.height()).map(move |y| Coord::new(x, y)))
    }
}

impl TerrainView for TerrainGrid {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn terrain_at(&self, coord: Coord) -> Result<&TerrainLabel, GridError> {
        TerrainGrid::terrain_at(self, coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u16, height: u16) -> TerrainGrid {
        TerrainGrid::new(width, height, "plains".into(), "edge".into())
    }

    #[test]
    fn unset_interior_reads_as_default() {
        let grid = grid(4, 4);
        assert_eq!(grid.terrain_at(Coord::new(2, 2)), Ok(&TerrainLabel::new("plains")));
    }

    #[test]
    fn border_cells_always_read_as_edge() {
        let mut grid = grid(4, 3);
        grid.set_terrain(Coord::new(0, 1), "water".into())
            .expect("border write is in bounds");
        grid.set_terrain(Coord::new(4, 3), "forest".into())
            .expect("corner write is in bounds");

        for x in 0..=4 {
            for y in 0..=3 {
                let coord = Coord::new(x, y);
                if x == 0 || y == 0 || x == 4 || y == 3 {
                    assert_eq!(grid.terrain_at(coord), Ok(&TerrainLabel::new("edge")));
                }
            }
        }
    }

    #[test]
    fn writes_register_new_labels() {
        let mut grid = grid(5, 5);
        let water = TerrainLabel::new("water");
        assert!(!grid.labels().contains(&water));

        grid.set_terrain(Coord::new(2, 3), water.clone())
            .expect("interior write");

        assert_eq!(grid.terrain_at(Coord::new(2, 3)), Ok(&water));
        assert!(grid.labels().contains(&water));
        assert!(grid.labels().contains(grid.interior_label()));
        assert!(grid.labels().contains(grid.edge_label()));
    }

    #[test]
    fn out_of_bounds_access_fails() {
        let mut grid = grid(3, 3);
        assert!(matches!(
            grid.terrain_at(Coord::new(4, 1)),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(matches!(
            grid.terrain_at(Coord::new(1, -1)),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(grid.set_terrain(Coord::new(-1, 0), "water".into()).is_err());
        assert_eq!(grid.labels().len(), 2);
    }

    #[test]
    fn cells_with_merges_overrides_and_defaults() {
        let mut grid = grid(3, 3);
        grid.set_terrain(Coord::new(1, 1), "water".into())
            .expect("interior write");
        grid.set_terrain(Coord::new(2, 2), "edge".into())
            .expect("interior write");
        grid.set_terrain(Coord::new(0, 2), "water".into())
            .expect("border write");

        assert_eq!(grid.cells_with(&"water".into()), vec![Coord::new(1, 1)]);
        assert_eq!(
            grid.cells_with(&"plains".into()),
            vec![Coord::new(1, 2), Coord::new(2, 1)]
        );

        let edges = grid.cells_with(&"edge".into());
        assert_eq!(edges.len(), 12 + 1);
        assert!(edges.contains(&Coord::new(2, 2)));
        assert!(edges.contains(&Coord::new(3, 3)));

        assert!(grid.cells_with(&"lava".into()).is_empty());
    }

    #[test]
    fn overwriting_moves_cell_between_labels() {
        let mut grid = grid(4, 4);
        let coord = Coord::new(2, 2);
        grid.set_terrain(coord, "water".into()).expect("write");
        grid.set_terrain(coord, "forest".into()).expect("rewrite");

        assert!(grid.cells_with(&"water".into()).is_empty());
        assert_eq!(grid.cells_with(&"forest".into()), vec![coord]);

        grid.set_terrain(coord, "plains".into()).expect("restore");
        assert!(grid.cells_with(&"plains".into()).contains(&coord));
    }
}
