//! Objective scoring and weighted sampling.

use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};
use warfront_core::{is_foreign, Coord, EntityId, EntityKind};
use warfront_world::{query, Unit, World};

use crate::BaseScores;

/// Enemy entity considered as an objective.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredTarget {
    /// Identifier of the enemy entity.
    pub entity: EntityId,
    /// Kind of the enemy entity.
    pub kind: EntityKind,
    /// Position of the enemy entity.
    pub coord: Coord,
    /// Desirability; higher is better.
    pub score: f64,
}

/// Objective score of a target at `target` seen from `from`.
///
/// A collocated target counts as one step away and so receives the full
/// base score, the highest any target of that kind can reach.
#[must_use]
pub fn score(from: Coord, target: Coord, base: f64) -> f64 {
    base / f64::from(from.chebyshev_distance(target).max(1))
}

/// Collects every city and unit foreign to `mover`, best score first.
///
/// `out` is cleared before being filled. Equal scores keep cities ahead of
/// units, each in creation order.
pub fn find_targets(world: &World, mover: &Unit, scores: &BaseScores, out: &mut Vec<ScoredTarget>) {
    out.clear();

    let origin = mover.coord();
    let owner = mover.owner();
    let cities = query::cities(world)
        .iter()
        .filter(|city| is_foreign(owner, city.owner()))
        .map(|city| (city.id(), EntityKind::City, city.coord()));
    let units = query::units(world)
        .iter()
        .filter(|unit| unit.id() != mover.id() && is_foreign(owner, unit.owner()))
        .map(|unit| (unit.id(), unit.kind(), unit.coord()));

    out.extend(cities.chain(units).map(|(entity, kind, coord)| ScoredTarget {
        entity,
        kind,
        coord,
        score: score(origin, coord, scores.for_kind(kind)),
    }));
    out.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Samples one of the `limit` best candidates using their scores as weights.
///
/// `candidates` must be sorted best first; a limit of zero behaves like one.
/// When the weights cannot form a distribution (all zero, negative or NaN)
/// the best candidate is returned.
pub fn select_target<'a, R>(
    candidates: &'a [ScoredTarget],
    limit: usize,
    rng: &mut R,
) -> Option<&'a ScoredTarget>
where
    R: Rng + ?Sized,
{
    let top = &candidates[..candidates.len().min(limit.max(1))];
    match WeightedIndex::new(top.iter().map(|candidate| candidate.score)) {
        Ok(weights) => top.get(weights.sample(rng)),
        Err(_) => top.first(),
    }
}
