use warfront_core::{
    Command, Coord, Direction, EntityId, EntityKind, Event, MoveOutcome, MoveRejection, PlayerId,
};
use warfront_world::{self as world, query, World, WorldConfig};

const RED: PlayerId = PlayerId::new(1);
const BLUE: PlayerId = PlayerId::new(2);

fn open_world() -> World {
    World::new(&WorldConfig {
        width: 8,
        height: 8,
        ..WorldConfig::default()
    })
}

fn infantry(world: &mut World, coord: Coord, owner: Option<PlayerId>) -> EntityId {
    world
        .spawn_unit(EntityKind::Infantry, coord, owner, None)
        .expect("spawn infantry")
}

fn position(world: &World, unit: EntityId) -> Coord {
    query::unit(world, unit).expect("unit exists").coord()
}

#[test]
fn single_step_budget_blocks_second_move_until_turn_ends() {
    let mut world = open_world();
    let unit = infantry(&mut world, Coord::new(3, 3), Some(RED));

    assert_eq!(
        world.move_unit(unit, Direction::East),
        Ok(MoveOutcome::Moved {
            from: Coord::new(3, 3),
            to: Coord::new(4, 3),
        })
    );
    assert_eq!(
        world.move_unit(unit, Direction::East),
        Ok(MoveOutcome::Rejected(MoveRejection::Exhausted))
    );
    assert_eq!(position(&world, unit), Coord::new(4, 3));

    let mut events = Vec::new();
    world::apply(&mut world, Command::EndTurn { player: RED, turn: 1 }, &mut events);
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::UnitTurnSummary { unit: summarized, summary } => {
            assert_eq!(*summarized, unit);
            assert!(summary.ends_with("turn 1 moved 1"), "unexpected summary {summary}");
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert!(query::unit(&world, unit).expect("unit").movement().can_move());
    assert!(matches!(
        world.move_unit(unit, Direction::East),
        Ok(MoveOutcome::Moved { .. })
    ));
}

#[test]
fn end_turn_only_resets_the_named_player() {
    let mut world = open_world();
    let red = infantry(&mut world, Coord::new(2, 2), Some(RED));
    let blue = infantry(&mut world, Coord::new(5, 5), Some(BLUE));
    world.exhaust_movement(red).expect("exhaust red");
    world.exhaust_movement(blue).expect("exhaust blue");

    let summaries = world.end_turn(RED, 4);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].0, red);
    assert_eq!(query::next_unit_to_move(&world, RED), Some(red));
    assert_eq!(query::next_unit_to_move(&world, BLUE), None);
}

#[test]
fn impassable_terrain_rejects_the_step() {
    let mut world = open_world();
    world
        .set_terrain(Coord::new(4, 3), "water".into())
        .expect("paint water");
    let unit = infantry(&mut world, Coord::new(3, 3), Some(RED));

    assert_eq!(
        world.move_unit(unit, Direction::East),
        Ok(MoveOutcome::Rejected(MoveRejection::Impassable))
    );
    assert_eq!(
        world.move_unit(unit, Direction::West),
        Ok(MoveOutcome::Moved {
            from: Coord::new(3, 3),
            to: Coord::new(2, 3),
        })
    );
}

#[test]
fn border_cells_are_impassable_for_infantry() {
    let mut world = open_world();
    let unit = infantry(&mut world, Coord::new(1, 1), Some(RED));

    assert_eq!(
        world.move_unit(unit, Direction::NorthWest),
        Ok(MoveOutcome::Rejected(MoveRejection::Impassable))
    );
    assert_eq!(position(&world, unit), Coord::new(1, 1));
}

#[test]
fn foreign_occupant_is_reported_as_conflict() {
    let mut world = open_world();
    let attacker = infantry(&mut world, Coord::new(3, 3), Some(RED));
    let defender = infantry(&mut world, Coord::new(4, 4), Some(BLUE));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: attacker,
            direction: Direction::SouthEast,
        },
        &mut events,
    );

    assert_eq!(events, vec![Event::ConflictDetected { attacker, defender }]);
    assert_eq!(position(&world, attacker), Coord::new(3, 3));
    assert!(query::unit(&world, attacker).expect("unit").movement().can_move());
}

#[test]
fn unowned_city_is_foreign() {
    let mut world = open_world();
    let unit = infantry(&mut world, Coord::new(3, 3), Some(RED));
    let city = world
        .found_city(Coord::new(3, 4), None, Some("Freeport".to_owned()))
        .expect("city");

    assert_eq!(
        world.move_unit(unit, Direction::South),
        Ok(MoveOutcome::Conflict(city))
    );
}

#[test]
fn friendly_city_can_be_entered_but_friendly_unit_cannot() {
    let mut world = open_world();
    let unit = infantry(&mut world, Coord::new(3, 3), Some(RED));
    let _ = world
        .found_city(Coord::new(4, 3), Some(RED), None)
        .expect("city");
    let _ = infantry(&mut world, Coord::new(3, 2), Some(RED));

    assert_eq!(
        world.move_unit(unit, Direction::North),
        Ok(MoveOutcome::Rejected(MoveRejection::Occupied))
    );
    assert_eq!(
        world.move_unit(unit, Direction::East),
        Ok(MoveOutcome::Moved {
            from: Coord::new(3, 3),
            to: Coord::new(4, 3),
        })
    );
}

#[test]
fn stepping_off_the_map_surfaces_out_of_bounds() {
    let mut world = World::new(&WorldConfig {
        width: 4,
        height: 4,
        ..WorldConfig::default()
    });
    let unit = infantry(&mut world, Coord::new(4, 2), Some(RED));

    assert!(world.move_unit(unit, Direction::East).is_err());

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit,
            direction: Direction::East,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            unit,
            reason: MoveRejection::OutOfBounds,
        }]
    );
}

#[test]
fn exhaust_command_spends_the_budget() {
    let mut world = open_world();
    let unit = infantry(&mut world, Coord::new(3, 3), Some(RED));
    let mut events = Vec::new();

    world::apply(&mut world, Command::ExhaustMovement { unit }, &mut events);
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit,
            direction: Direction::South,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::MovementExhausted { unit },
            Event::MoveRejected {
                unit,
                reason: MoveRejection::Exhausted,
            },
        ]
    );
}

#[test]
fn move_for_unknown_unit_leaves_the_world_untouched() {
    let mut world = open_world();
    let unit = infantry(&mut world, Coord::new(3, 3), Some(RED));
    let ghost = EntityId::new(99);
    let mut events = Vec::new();

    assert!(matches!(
        world.move_unit(ghost, Direction::East),
        Err(world::WorldError::UnknownEntity(id)) if id == ghost
    ));
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: ghost,
            direction: Direction::East,
        },
        &mut events,
    );

    assert!(events.is_empty());
    assert_eq!(position(&world, unit), Coord::new(3, 3));
}
