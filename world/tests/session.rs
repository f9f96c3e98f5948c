use std::time::Duration;

use shadowgrid_core::{
    BuildError, Command, Direction, Event, Positionable, SessionStatus, ShadowKind, ShadowState,
    TileKind, TrapKind, WALL_BUILD_COST,
};
use shadowgrid_system_pathfinding::Pathfinder;
use shadowgrid_world::{self as world, query, SessionConfig, World};

const SEED: u64 = 0x5eed;

fn fresh_world() -> World {
    let mut world = World::new(SessionConfig::default(), SEED);
    let _ = drain(&mut world, Command::Tick { dt: Duration::ZERO });
    world
}

fn drain(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tile_under_player(world: &World) -> Option<TileKind> {
    let cell = query::player(world).cell();
    query::grid(world).tile(cell).map(|tile| tile.kind())
}

fn walk_to_exit(world: &mut World) {
    let mut pathfinder = Pathfinder::new();
    let start = query::player(world).cell();
    let path = pathfinder.find_path(start, query::exit(world), query::grid(world));
    assert!(!path.is_empty(), "exit must be reachable from the spawn");

    let mut from = start;
    for to in path {
        let direction = Direction::between(from, to).expect("path steps are adjacent");
        let events = drain(world, Command::MovePlayer { direction });
        assert!(
            events.contains(&Event::PlayerMoved { from, to }),
            "step {from:?} -> {to:?} refused"
        );
        from = to;
    }
}

#[test]
fn opening_level_is_playable() {
    let mut world = World::new(SessionConfig::default(), SEED);
    let events = drain(&mut world, Command::Tick { dt: Duration::ZERO });

    let Some(Event::LevelStarted {
        level,
        width,
        spawn,
        exit,
        ..
    }) = events.first().cloned()
    else {
        panic!("first event must announce the level, got {events:?}");
    };
    assert_eq!(level, 1);
    assert_eq!(width, 18);
    assert_eq!(query::player(&world).cell(), spawn);
    assert_eq!(query::exit(&world), exit);
    assert_eq!(
        query::grid(&world).tile(exit).map(|tile| tile.kind()),
        Some(TileKind::Exit)
    );
    assert!(query::grid(&world).tile(spawn).is_some_and(|tile| tile.is_visible()));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TilesRevealed { .. })));

    assert_eq!(query::status(&world), SessionStatus::Playing);
    assert_eq!(query::player(&world).resources(), 15);
    assert_eq!(query::enemies(&world).len(), 1);
    assert!(query::shadows(&world).is_empty());
}

#[test]
fn spawn_borders_walls_toward_the_origin() {
    let mut world = fresh_world();
    let spawn = query::player(&world).cell();

    for direction in [Direction::West, Direction::North] {
        let events = drain(&mut world, Command::MovePlayer { direction });
        assert!(events.is_empty(), "{direction:?} should be blocked");
        assert_eq!(query::player(&world).cell(), spawn);
    }
}

#[test]
fn building_charges_resources_and_consumes_the_floor() {
    let mut world = fresh_world();
    let spawn = query::player(&world).cell();
    assert_eq!(tile_under_player(&world), Some(TileKind::Floor));

    let events = drain(&mut world, Command::BuildTrap { kind: TrapKind::Gravity });
    assert_eq!(
        events,
        vec![Event::BuildRejected {
            reason: BuildError::InsufficientResources
        }]
    );

    let events = drain(&mut world, Command::BuildWall);
    assert_eq!(
        events,
        vec![Event::TileBuilt {
            cell: spawn,
            kind: TileKind::Wall
        }]
    );
    assert_eq!(query::player(&world).resources(), 15 - WALL_BUILD_COST);

    let events = drain(&mut world, Command::BuildTrap { kind: TrapKind::Spike });
    assert_eq!(
        events,
        vec![Event::BuildRejected {
            reason: BuildError::TileUnavailable
        }]
    );
    assert_eq!(query::player(&world).resources(), 15 - WALL_BUILD_COST);
}

#[test]
fn shadows_are_summoned_toggled_and_dismissed_in_order() {
    let mut world = fresh_world();

    let events = drain(&mut world, Command::SummonShadow { kind: ShadowKind::Shadow });
    let Some(Event::ShadowSummoned { shadow, kind, cell }) = events.first().cloned() else {
        panic!("expected a summon, got {events:?}");
    };
    assert_eq!(kind, ShadowKind::Shadow);
    assert_eq!(cell, query::player(&world).cell());
    assert_eq!(query::player(&world).resources(), 0);

    let events = drain(&mut world, Command::SummonShadow { kind: ShadowKind::Shadow });
    assert_eq!(
        events,
        vec![Event::BuildRejected {
            reason: BuildError::InsufficientResources
        }]
    );

    let events = drain(&mut world, Command::ToggleShadowAttack);
    assert_eq!(
        events,
        vec![Event::ShadowStateChanged {
            shadow,
            state: ShadowState::Attack
        }]
    );

    let events = drain(&mut world, Command::DismissShadow);
    assert_eq!(events, vec![Event::ShadowDismissed { shadow, refund: 15 }]);
    assert_eq!(query::player(&world).resources(), 15);

    let events = drain(&mut world, Command::DismissShadow);
    assert_eq!(
        events,
        vec![Event::BuildRejected {
            reason: BuildError::NoShadow
        }]
    );
}

#[test]
fn animated_scan_finishes_over_successive_ticks() {
    let mut world = fresh_world();

    let _ = drain(&mut world, Command::Scan { animated: true });
    assert!(query::reveal_in_progress(&world));

    for _ in 0..10 {
        let _ = drain(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
        );
    }
    if query::status(&world) == SessionStatus::Playing {
        assert!(!query::reveal_in_progress(&world));
    }
}

#[test]
fn reaching_every_exit_wins_the_campaign() {
    let mut world = fresh_world();
    let mut completed = Vec::new();

    while query::status(&world) == SessionStatus::Playing {
        walk_to_exit(&mut world);
        let events = drain(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
        );
        for event in &events {
            match event {
                Event::LevelCompleted { level } => completed.push(*level),
                Event::LevelStarted { level, .. } => {
                    assert_eq!(query::level(&world), *level);
                    assert!(query::shadows(&world).is_empty());
                }
                Event::PlayerCaught { .. } => panic!("caught while standing on the exit"),
                _ => {}
            }
        }
        assert!(completed.len() <= 5, "campaign did not terminate");
    }

    assert_eq!(completed, vec![1, 2, 3, 4, 5]);
    assert_eq!(query::status(&world), SessionStatus::Victory);

    let events = drain(&mut world, Command::BuildWall);
    assert_eq!(
        events,
        vec![Event::BuildRejected {
            reason: BuildError::InvalidMode
        }]
    );
    let events = drain(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    );
    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            dt: Duration::from_secs(1)
        }]
    );
}

#[test]
fn config_start_level_is_honoured() {
    let config = SessionConfig {
        start_level: 3,
        ..SessionConfig::default()
    };
    let world = World::new(config, SEED);
    assert_eq!(query::level(&world), 3);
    assert_eq!(query::enemies(&world).len(), 2);
    assert_eq!(query::player(&world).resources(), 10);
}
