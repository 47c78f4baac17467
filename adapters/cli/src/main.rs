#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner that plays a warfront scenario with AI players.

mod scenario;

use std::{
    io::{self, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use warfront_core::{Command, Decision, EntityId, Event};
use warfront_system_ai::{AiController, ControllerTuning};
use warfront_system_pathfinding::PathFinder;
use warfront_world::{self as world, query, World};

use crate::scenario::{PlayerSetup, Scenario, Setup};

const DEFAULT_LOG_FILTER: &str = "warfront=info";
const VERBOSE_LOG_FILTER: &str = "warfront=debug";

/// Command-line arguments accepted by the runner.
#[derive(Debug, Parser)]
#[command(name = "warfront", version, about = "Plays a warfront scenario with AI players")]
struct CliArgs {
    /// Scenario file to load; the bundled skirmish is used when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Number of turns to play, overriding the scenario.
    #[arg(long)]
    turns: Option<u32>,
    /// Random seed, overriding the scenario.
    #[arg(long)]
    seed: Option<u64>,
    /// Pause before each AI decision as configured by the scenario tuning.
    #[arg(long)]
    delay: bool,
    /// Enables debug logging for every decision.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the warfront command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin().context("failed to parse the bundled scenario")?,
    };
    let seed = args.seed.unwrap_or(scenario.seed);
    let turns = args.turns.unwrap_or(scenario.turns);
    let delay = args.delay.then(|| scenario.tuning.decision_delay());
    let setup = scenario.build().context("failed to build the scenario world")?;

    tracing::info!(seed, turns, "starting match");
    let mut session = Session::new(setup, scenario.tuning);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.play(turns, delay, &mut rng, &mut out)?;
    session.report(&mut out)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

struct Seat {
    player: PlayerSetup,
    controller: Option<AiController>,
}

struct Session {
    world: World,
    seats: Vec<Seat>,
}

impl Session {
    fn new(setup: Setup, tuning: ControllerTuning) -> Self {
        let seats = setup
            .players
            .into_iter()
            .map(|player| Seat {
                controller: player
                    .ai
                    .then(|| AiController::new(player.id, tuning, PathFinder::default())),
                player,
            })
            .collect();

        Self {
            world: setup.world,
            seats,
        }
    }

    fn play<R, W>(&mut self, turns: u32, delay: Option<Duration>, rng: &mut R, out: &mut W) -> Result<()>
    where
        R: Rng,
        W: Write,
    {
        let mut decisions = Vec::new();
        let mut commands = Vec::new();
        let mut events = Vec::new();

        for turn in 1..=turns {
            writeln!(out, "== turn {turn} ==")?;
            for seat in &mut self.seats {
                if let Some(controller) = seat.controller.as_mut() {
                    let cap = decision_cap(&self.world);
                    let mut taken = 0_usize;
                    loop {
                        if taken == cap {
                            tracing::warn!(player = %seat.player.name, cap, "decision cap reached");
                            break;
                        }
                        taken += 1;
                        if let Some(delay) = delay {
                            thread::sleep(delay);
                        }

                        controller.handle(&self.world, rng, &mut decisions, &mut commands);
                        for decision in &decisions {
                            writeln!(out, "{}", describe_decision(&self.world, &seat.player, decision))?;
                        }
                        if decisions.contains(&Decision::EndTurn) {
                            break;
                        }

                        events.clear();
                        for command in commands.drain(..) {
                            world::apply(&mut self.world, command, &mut events);
                        }
                        settle(&mut self.world, &mut events);
                        for event in &events {
                            writeln!(out, "  {}", describe_event(&self.world, event))?;
                        }
                    }
                } else {
                    writeln!(out, "{} passes", seat.player.name)?;
                }

                events.clear();
                world::apply(
                    &mut self.world,
                    Command::EndTurn {
                        player: seat.player.id,
                        turn,
                    },
                    &mut events,
                );
                for event in &events {
                    writeln!(out, "  {}", describe_event(&self.world, event))?;
                }
            }
        }
        Ok(())
    }

    fn report<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "== final positions ==")?;
        for seat in &self.seats {
            writeln!(out, "{}:", seat.player.name)?;
            for city in query::cities(&self.world)
                .iter()
                .filter(|city| city.owner() == Some(seat.player.id))
            {
                writeln!(out, "  city {} at {}", city.name(), city.coord())?;
            }
            for unit in query::units_owned_by(&self.world, seat.player.id) {
                writeln!(out, "  {} at {}", unit.name(), unit.coord())?;
            }
        }
        Ok(())
    }
}

/// Ends the turn of units whose step did not go through.
///
/// Combat is resolved elsewhere, so an attacker has spent its action once the
/// conflict is reported.
fn settle(world: &mut World, events: &mut Vec<Event>) {
    let stalled: Vec<EntityId> = events
        .iter()
        .filter_map(|event| match event {
            Event::ConflictDetected { attacker, .. } => Some(*attacker),
            Event::MoveRejected { unit, .. } => Some(*unit),
            _ => None,
        })
        .collect();
    for unit in stalled {
        world::apply(world, Command::ExhaustMovement { unit }, events);
    }
}

/// Upper bound on decisions a single player may take in one turn.
fn decision_cap(world: &World) -> usize {
    let bounds = query::terrain(world).bounds();
    let cells = usize::try_from(i64::from(bounds.width()) * i64::from(bounds.height())).unwrap_or(usize::MAX);
    cells.saturating_mul(query::units(world).len().max(1))
}

fn entity_name(world: &World, entity: EntityId) -> String {
    query::unit(world, entity)
        .map(|unit| unit.name().to_owned())
        .or_else(|| query::city(world, entity).map(|city| city.name().to_owned()))
        .unwrap_or_else(|| format!("#{}", entity.get()))
}

fn describe_decision(world: &World, player: &PlayerSetup, decision: &Decision) -> String {
    match decision {
        Decision::EndTurn => format!("{} ends the turn", player.name),
        Decision::Select { unit } => format!("{} selects {}", player.name, entity_name(world, *unit)),
        Decision::Move { unit, direction } => {
            format!("{} orders {} {direction:?}", player.name, entity_name(world, *unit))
        }
    }
}

fn describe_event(world: &World, event: &Event) -> String {
    match event {
        Event::UnitMoved { unit, from, to } => {
            format!("{} moved {from} -> {to}", entity_name(world, *unit))
        }
        Event::MoveRejected { unit, reason } => {
            format!("{} could not move: {reason:?}", entity_name(world, *unit))
        }
        Event::ConflictDetected { attacker, defender } => format!(
            "{} engages {}",
            entity_name(world, *attacker),
            entity_name(world, *defender)
        ),
        Event::MovementExhausted { unit } => format!("{} holds position", entity_name(world, *unit)),
        Event::UnitTurnSummary { summary, .. } => summary.clone(),
        Event::TerrainChanged { coord, label } => format!("terrain at {coord} is now {label}"),
        Event::TerrainChangeRejected { coord, reason } => {
            format!("terrain at {coord} unchanged: {reason}")
        }
    }
}
