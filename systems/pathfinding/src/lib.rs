#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* search over any bounded terrain view.
//!
//! Every step costs one, diagonal or not, so the Chebyshev distance is an
//! exact lower bound and serves as the heuristic. Terrain passability is
//! decided per call from the caller's impassable label set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rand::Rng;
use warfront_core::{Coord, TerrainLabel, TerrainView};

const UNVISITED: u32 = u32::MAX;

/// How the search chooses among frontier members sharing the minimum estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Pick uniformly at random, so no direction is favoured.
    #[default]
    Uniform,
    /// Pick the lowest coordinate; ignores the random source.
    LowestCoord,
}

/// Stateless shortest-path search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathFinder {
    tie_break: TieBreak,
}

impl PathFinder {
    /// Creates a path finder using the provided tie-breaking rule.
    #[must_use]
    pub const fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Tie-breaking rule used by the search.
    #[must_use]
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Finds a cheapest path from `start` to `goal`.
    ///
    /// The returned path begins with `start` and ends with `goal`. Cells
    /// whose terrain appears in `impassable` are never entered; the start
    /// cell itself is not checked. `None` means the goal is unreachable.
    pub fn find_path<T, R>(
        &self,
        start: Coord,
        goal: Coord,
        terrain: &T,
        impassable: &BTreeSet<TerrainLabel>,
        rng: &mut R,
    ) -> Option<Vec<Coord>>
    where
        T: TerrainView + ?Sized,
        R: Rng + ?Sized,
    {
        let bounds = terrain.bounds();
        if !bounds.contains(start) || !bounds.contains(goal) {
            return None;
        }

        let mut came_from: HashMap<Coord, Coord> = HashMap::new();
        let mut g_score: HashMap<Coord, u32> = HashMap::new();
        let mut frontier = Frontier::default();
        let mut expanded = 0_usize;

        let _ = g_score.insert(start, 0);
        frontier.push(start, start.chebyshev_distance(goal));

        while let Some(current) = frontier.pop_min(self.tie_break, rng) {
            if current == goal {
                let path = reconstruct_path(&came_from, current);
                tracing::trace!(%start, %goal, expanded, steps = path.len() - 1, "path found");
                return Some(path);
            }
            expanded += 1;

            let current_g = g_score.get(&current).copied().unwrap_or(UNVISITED);
            for neighbor in bounds.neighbors(current) {
                let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(UNVISITED);
                let passable = terrain
                    .terrain_at(neighbor)
                    .map_or(false, |label| !impassable.contains(label));
                let tentative_g = if passable {
                    current_g.saturating_add(1)
                } else {
                    neighbor_g
                };

                if tentative_g < neighbor_g {
                    let _ = came_from.insert(neighbor, current);
                    let _ = g_score.insert(neighbor, tentative_g);
                    frontier.push(neighbor, tentative_g + neighbor.chebyshev_distance(goal));
                }
            }
        }

        tracing::trace!(%start, %goal, expanded, "goal unreachable");
        None
    }
}

fn reconstruct_path(came_from: &HashMap<Coord, Coord>, mut current: Coord) -> Vec<Coord> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        current = previous;
        path.push(current);
    }
    path.reverse();
    path
}

/// Open set bucketed by estimated total cost.
///
/// Every bucket is non-empty and every member appears in exactly one bucket.
#[derive(Debug, Default)]
struct Frontier {
    buckets: BTreeMap<u32, Vec<Coord>>,
    f_score: HashMap<Coord, u32>,
}

impl Frontier {
    fn push(&mut self, coord: Coord, f: u32) {
        if let Some(previous) = self.f_score.insert(coord, f) {
            self.detach(coord, previous);
        }
        self.buckets.entry(f).or_default().push(coord);
    }

    fn pop_min<R>(&mut self, tie_break: TieBreak, rng: &mut R) -> Option<Coord>
    where
        R: Rng + ?Sized,
    {
        let mut entry = self.buckets.first_entry()?;
        let bucket = entry.get_mut();
        let index = match tie_break {
            TieBreak::Uniform => rng.gen_range(0..bucket.len()),
            TieBreak::LowestCoord => bucket
                .iter()
                .enumerate()
                .min_by_key(|(_, coord)| **coord)
                .map_or(0, |(index, _)| index),
        };
        let coord = bucket.swap_remove(index);
        if bucket.is_empty() {
            let _ = entry.remove();
        }
        let _ = self.f_score.remove(&coord);
        Some(coord)
    }

    fn detach(&mut self, coord: Coord, f: u32) {
        let Some(bucket) = self.buckets.get_mut(&f) else {
            return;
        };
        if let Some(index) = bucket.iter().position(|member| *member == coord) {
            let _ = bucket.swap_remove(index);
        }
        if bucket.is_empty() {
            let _ = self.buckets.remove(&f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use warfront_world::TerrainGrid;

    fn grid(width: u16, height: u16) -> TerrainGrid {
        TerrainGrid::new(width, height, "plains".into(), "edge".into())
    }

    fn blocked() -> BTreeSet<TerrainLabel> {
        ["edge".into(), "water".into()].into_iter().collect()
    }

    #[test]
    fn frontier_pops_lowest_estimate_first() {
        let mut frontier = Frontier::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        frontier.push(Coord::new(1, 1), 5);
        frontier.push(Coord::new(2, 2), 3);
        frontier.push(Coord::new(3, 3), 4);
        frontier.push(Coord::new(1, 1), 2);

        assert_eq!(frontier.pop_min(TieBreak::Uniform, &mut rng), Some(Coord::new(1, 1)));
        assert_eq!(frontier.pop_min(TieBreak::Uniform, &mut rng), Some(Coord::new(2, 2)));
        assert_eq!(frontier.pop_min(TieBreak::Uniform, &mut rng), Some(Coord::new(3, 3)));
        assert_eq!(frontier.pop_min(TieBreak::Uniform, &mut rng), None);
        assert!(frontier.buckets.is_empty());
    }

    #[test]
    fn lowest_coord_tie_break_is_deterministic() {
        let mut frontier = Frontier::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        frontier.push(Coord::new(3, 1), 2);
        frontier.push(Coord::new(1, 4), 2);
        frontier.push(Coord::new(1, 2), 2);

        assert_eq!(
            frontier.pop_min(TieBreak::LowestCoord, &mut rng),
            Some(Coord::new(1, 2))
        );
        assert_eq!(
            frontier.pop_min(TieBreak::LowestCoord, &mut rng),
            Some(Coord::new(1, 4))
        );
    }

    #[test]
    fn uniform_tie_break_reaches_every_candidate() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = BTreeSet::new();
        for _ in 0..64 {
            let mut frontier = Frontier::default();
            frontier.push(Coord::new(1, 1), 7);
            frontier.push(Coord::new(2, 1), 7);
            frontier.push(Coord::new(3, 1), 7);
            let _ = seen.insert(frontier.pop_min(TieBreak::Uniform, &mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn start_equal_to_goal_is_a_single_cell_path() {
        let grid = grid(5, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let path = PathFinder::default().find_path(
            Coord::new(2, 2),
            Coord::new(2, 2),
            &grid,
            &blocked(),
            &mut rng,
        );
        assert_eq!(path, Some(vec![Coord::new(2, 2)]));
    }

    #[test]
    fn goal_outside_the_map_is_unreachable() {
        let grid = grid(5, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let path = PathFinder::default().find_path(
            Coord::new(2, 2),
            Coord::new(9, 2),
            &grid,
            &blocked(),
            &mut rng,
        );
        assert_eq!(path, None);
    }

    #[test]
    fn impassable_goal_is_unreachable() {
        let mut grid = grid(6, 6);
        grid.set_terrain(Coord::new(4, 4), "water".into())
            .expect("paint");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let path = PathFinder::default().find_path(
            Coord::new(1, 1),
            Coord::new(4, 4),
            &grid,
            &blocked(),
            &mut rng,
        );
        assert_eq!(path, None);
    }
}
