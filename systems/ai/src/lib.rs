#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-by-turn AI controller for warfront players.
//!
//! Each call to [`AiController::handle`] picks the player's next unit with
//! movement left, samples an enemy objective among the best-scored
//! candidates and plans a single step toward it. The controller only reads
//! the world; the mutations it wants are returned as [`Command`] values for
//! the caller to apply.

mod overlay;
mod targeting;

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use warfront_core::{is_foreign, Command, Coord, Decision, Direction, EntityId, EntityKind, PlayerId};
use warfront_system_pathfinding::PathFinder;
use warfront_world::{query, Occupant, Unit, World};

pub use overlay::FriendlyBlockedTerrain;
pub use targeting::{find_targets, score, select_target, ScoredTarget};

const DEFAULT_CANDIDATE_LIMIT: usize = 5;
const DEFAULT_BASE_SCORE: f64 = 100.0;
const DEFAULT_DECISION_DELAY_MS: u64 = 450;
const STEERING_ROTATIONS: usize = 7;

/// Objective weight per entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseScores {
    /// Weight of enemy cities.
    pub city: f64,
    /// Weight of enemy infantry.
    pub infantry: f64,
}

impl BaseScores {
    /// Weight associated with the kind.
    #[must_use]
    pub fn for_kind(&self, kind: EntityKind) -> f64 {
        match kind {
            EntityKind::City => self.city,
            EntityKind::Infantry => self.infantry,
        }
    }
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            city: DEFAULT_BASE_SCORE,
            infantry: DEFAULT_BASE_SCORE,
        }
    }
}

/// Knobs shaping how a controller picks its objectives.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    /// Number of best-scored targets eligible for sampling.
    pub candidate_limit: usize,
    /// Objective weight per entity kind.
    pub base_scores: BaseScores,
    /// Pause a presenting adapter inserts before each decision.
    pub decision_delay_ms: u64,
}

impl ControllerTuning {
    /// Presentation delay as a duration.
    #[must_use]
    pub const fn decision_delay(&self) -> Duration {
        Duration::from_millis(self.decision_delay_ms)
    }
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            base_scores: BaseScores::default(),
            decision_delay_ms: DEFAULT_DECISION_DELAY_MS,
        }
    }
}

/// Progress of the controller through a decision step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting to pick the next unit.
    #[default]
    Idle,
    /// A unit was picked and announced.
    UnitSelected(EntityId),
    /// The picked unit is choosing its step.
    Acting(EntityId),
}

/// AI driving every unit of a single player.
#[derive(Debug)]
pub struct AiController {
    player: PlayerId,
    tuning: ControllerTuning,
    path_finder: PathFinder,
    state: ControllerState,
    candidates: Vec<ScoredTarget>,
}

impl AiController {
    /// Creates an idle controller for `player`.
    #[must_use]
    pub fn new(player: PlayerId, tuning: ControllerTuning, path_finder: PathFinder) -> Self {
        Self {
            player,
            tuning,
            path_finder,
            state: ControllerState::Idle,
            candidates: Vec::new(),
        }
    }

    /// Player driven by the controller.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn tuning(&self) -> &ControllerTuning {
        &self.tuning
    }

    /// Current state; always [`ControllerState::Idle`] between steps.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Runs one decision step.
    ///
    /// Presentation signals are written to `decisions` and the world
    /// mutations they imply to `commands`; both buffers are cleared first.
    /// A step yields either `EndTurn`, or `Select` followed by an optional
    /// `Move`. A selected unit that cannot move has its budget exhausted
    /// through [`Command::ExhaustMovement`] so it does not stall the turn.
    pub fn handle<R>(
        &mut self,
        world: &World,
        rng: &mut R,
        decisions: &mut Vec<Decision>,
        commands: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        decisions.clear();
        commands.clear();

        loop {
            match self.state {
                ControllerState::Idle => match query::next_unit_to_move(world, self.player) {
                    Some(unit) => self.state = ControllerState::UnitSelected(unit),
                    None => {
                        tracing::debug!(player = self.player.get(), "no unit left to move");
                        decisions.push(Decision::EndTurn);
                        return;
                    }
                },
                ControllerState::UnitSelected(unit) => {
                    decisions.push(Decision::Select { unit });
                    self.state = ControllerState::Acting(unit);
                }
                ControllerState::Acting(unit) => {
                    self.act(world, unit, rng, decisions, commands);
                    self.state = ControllerState::Idle;
                    return;
                }
            }
        }
    }

    fn act<R>(
        &mut self,
        world: &World,
        unit: EntityId,
        rng: &mut R,
        decisions: &mut Vec<Decision>,
        commands: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let Some(mover) = query::unit(world, unit) else {
            return;
        };

        match self.choose_direction(world, mover, rng) {
            Some(direction) => {
                decisions.push(Decision::Move { unit, direction });
                commands.push(Command::MoveUnit { unit, direction });
            }
            None => {
                tracing::debug!(unit = unit.get(), "no viable step, exhausting movement");
                commands.push(Command::ExhaustMovement { unit });
            }
        }
    }

    fn choose_direction<R>(&mut self, world: &World, mover: &Unit, rng: &mut R) -> Option<Direction>
    where
        R: Rng + ?Sized,
    {
        find_targets(world, mover, &self.tuning.base_scores, &mut self.candidates);
        let target = *select_target(&self.candidates, self.tuning.candidate_limit, rng)?;
        tracing::debug!(
            unit = mover.id().get(),
            target = target.entity.get(),
            kind = ?target.kind,
            score = target.score,
            candidates = self.candidates.len(),
            "selected target"
        );
        self.plan_move(world, mover, &target, rng)
    }

    /// Plans a single step of `mover` toward `target`.
    ///
    /// The path is searched with every other friendly unit treated as
    /// impassable. Its first step is taken when still clear; otherwise the
    /// straight-line heading toward the target, then each clockwise rotation
    /// of it, is tried until a clear neighbour turns up. `None` means no path
    /// or no clear neighbour.
    pub fn plan_move<R>(
        &self,
        world: &World,
        mover: &Unit,
        target: &ScoredTarget,
        rng: &mut R,
    ) -> Option<Direction>
    where
        R: Rng + ?Sized,
    {
        let overlay = FriendlyBlockedTerrain::new(world, mover);
        let path = self.path_finder.find_path(
            mover.coord(),
            target.coord,
            &overlay,
            mover.movement().impassable(),
            rng,
        )?;
        let next = *path.get(1)?;
        tracing::debug!(unit = mover.id().get(), steps = path.len() - 1, %next, "path planned");

        steer(world, mover, target, next)
    }
}

fn steer(world: &World, mover: &Unit, target: &ScoredTarget, next: Coord) -> Option<Direction> {
    let origin = mover.coord();
    if is_clear(world, mover, target.entity, next) {
        return Direction::between(origin, next);
    }

    // The heading itself is tried first unless it is the step just refused.
    let mut heading = origin.heading_to(target.coord)?;
    for rotation in 0..=STEERING_ROTATIONS {
        let cell = origin.step(heading);
        if cell != next && is_clear(world, mover, target.entity, cell) {
            tracing::debug!(unit = mover.id().get(), rotation, ?heading, "steered around blocked step");
            return Some(heading);
        }
        heading = heading.rotated_clockwise();
    }

    tracing::warn!(unit = mover.id().get(), %origin, "every direction is blocked");
    None
}

/// Whether `mover` may commit a step into `cell` right now.
///
/// The target's own cell is clear, as is a city of the mover's owner.
fn is_clear(world: &World, mover: &Unit, target: EntityId, cell: Coord) -> bool {
    let passable = query::terrain(world)
        .terrain_at(cell)
        .map_or(false, |label| mover.movement().can_enter(label));
    if !passable {
        return false;
    }

    match query::occupant_at(world, cell, Some(mover.id())) {
        None => true,
        Some(occupant) if occupant.id() == target => true,
        Some(Occupant::City(city)) => !is_foreign(mover.owner(), city.owner()),
        Some(Occupant::Unit(_)) => false,
    }
}
