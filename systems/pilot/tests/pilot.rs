use std::{collections::HashSet, time::Duration};

use cubesnake_core::{
    ActorId, ActorSnapshot, ActorView, Command, Controller, Event, GridCell, Heading, Orientation,
    SessionMode, StrategyKind,
};
use cubesnake_system_pilot::{Config, Mode, Opponent, Pilot, Situation};
use cubesnake_world::{self as world, query, World};
use glam::Vec3;

fn seed_body(head: GridCell, length: usize) -> Vec<GridCell> {
    (0..length)
        .scan(head, |cell, _| {
            let current = *cell;
            *cell = cell.offset(Heading::NegY);
            Some(current)
        })
        .collect()
}

#[test]
fn nearby_food_overrides_hunting() {
    let body = seed_body(GridCell::ORIGIN, 3);
    let rival = vec![
        GridCell::new(0, 0, 5),
        GridCell::new(0, 0, 6),
        GridCell::new(0, 0, 7),
    ];
    let situation = Situation {
        half_extent: 8,
        body: &body,
        heading: Heading::PosY,
        food: Some(GridCell::new(1, 0, 0)),
        obstacles: vec![rival.as_slice()],
        opponent: Some(Opponent {
            body: &rival,
            facing: Vec3::NEG_Z,
        }),
    };

    let mut pilot = Pilot::new(Config::new(ActorId::RIVAL, 7));
    let decision = pilot.decide(&situation).expect("safe move available");

    assert_eq!(decision.priorities.hunt, 0.0);
    assert_eq!(decision.mode, Mode::Eat);
    assert_eq!(decision.target, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(decision.heading, Heading::PosX);
}

#[test]
fn longer_pilot_hunts_interception_point() {
    let body = seed_body(GridCell::ORIGIN, 4);
    let rival = vec![
        GridCell::new(3, 0, 0),
        GridCell::new(4, 0, 0),
        GridCell::new(5, 0, 0),
    ];
    let situation = Situation {
        half_extent: 8,
        body: &body,
        heading: Heading::PosY,
        food: Some(GridCell::new(0, 0, 7)),
        obstacles: vec![rival.as_slice()],
        opponent: Some(Opponent {
            body: &rival,
            facing: Vec3::NEG_X,
        }),
    };

    let mut pilot = Pilot::new(Config::new(ActorId::RIVAL, 7));
    let decision = pilot.decide(&situation).expect("safe move available");

    assert!(decision.priorities.hunt > decision.priorities.food);
    assert_eq!(decision.mode, Mode::Hunt);
    assert_eq!(decision.target, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(decision.heading, Heading::PosX);
}

#[test]
fn hunting_breaks_distance_ties_towards_the_centre() {
    let body = vec![
        GridCell::new(2, 0, 0),
        GridCell::new(2, 0, -1),
        GridCell::new(2, 0, -2),
    ];
    let rival = vec![
        GridCell::new(2, -2, 0),
        GridCell::new(3, -2, 0),
        GridCell::new(4, -2, 0),
    ];
    let situation = Situation {
        half_extent: 8,
        body: &body,
        heading: Heading::PosY,
        food: Some(GridCell::new(-6, 6, 6)),
        obstacles: vec![rival.as_slice()],
        opponent: Some(Opponent {
            body: &rival,
            facing: Vec3::NEG_Y,
        }),
    };

    let target = Vec3::new(2.0, -3.0, 0.0);
    let tied: Vec<f32> = [Heading::PosX, Heading::NegX, Heading::PosZ]
        .into_iter()
        .map(|heading| body[0].offset(heading).to_vec3().distance(target))
        .collect();
    assert!(tied.iter().all(|distance| *distance == tied[0]));

    for seed in 0..32 {
        let mut pilot = Pilot::new(Config::new(ActorId::RIVAL, seed));
        let decision = pilot.decide(&situation).expect("safe move available");

        assert_eq!(decision.mode, Mode::Hunt);
        assert_eq!(decision.target, target);
        assert_eq!(decision.heading, Heading::NegX, "seed {seed}");
    }
}

#[test]
fn boxed_in_pilot_holds_position() {
    let body = seed_body(GridCell::ORIGIN, 3);
    let wall = vec![
        GridCell::new(1, 0, 0),
        GridCell::new(-1, 0, 0),
        GridCell::new(0, 1, 0),
        GridCell::new(0, 0, 1),
        GridCell::new(0, 0, -1),
    ];
    let situation = Situation {
        half_extent: 8,
        body: &body,
        heading: Heading::PosY,
        food: Some(GridCell::new(3, 3, 3)),
        obstacles: vec![wall.as_slice()],
        opponent: None,
    };

    let mut pilot = Pilot::new(Config::new(ActorId::RIVAL, 7));
    assert!(pilot.decide(&situation).is_none());

    let view = ActorView::from_snapshots(vec![
        ActorSnapshot {
            id: ActorId::PLAYER,
            controller: Controller::Keyboard,
            body: wall.clone(),
            orientation: Orientation::facing_heading(Heading::PosY, Vec3::Z),
            strategy: StrategyKind::GravityLocked,
            alive: true,
            awaiting_heading: false,
        },
        ActorSnapshot {
            id: ActorId::RIVAL,
            controller: Controller::Autopilot,
            body: body.clone(),
            orientation: Orientation::facing_heading(Heading::PosY, Vec3::Z),
            strategy: StrategyKind::FreeRoam,
            alive: true,
            awaiting_heading: true,
        },
    ]);
    let mut commands = Vec::new();
    pilot.handle(
        &[Event::ActorReady {
            actor: ActorId::RIVAL,
        }],
        &view,
        Some(GridCell::new(3, 3, 3)),
        8,
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn equal_scores_are_broken_by_seeded_shuffle() {
    let body = seed_body(GridCell::ORIGIN, 3);
    let situation = Situation {
        half_extent: 8,
        body: &body,
        heading: Heading::PosY,
        food: Some(GridCell::new(2, 2, 0)),
        obstacles: Vec::new(),
        opponent: None,
    };

    let chosen: HashSet<Heading> = (0..64)
        .filter_map(|seed| Pilot::new(Config::new(ActorId::RIVAL, seed)).decide(&situation))
        .map(|decision| decision.heading)
        .collect();
    assert_eq!(
        chosen,
        HashSet::from([Heading::PosX, Heading::PosY]),
        "both tied headings should be reachable"
    );

    let mut first = Pilot::new(Config::new(ActorId::RIVAL, 11));
    let mut second = Pilot::new(Config::new(ActorId::RIVAL, 11));
    for _ in 0..16 {
        assert_eq!(
            first.decide(&situation).map(|decision| decision.heading),
            second.decide(&situation).map(|decision| decision.heading)
        );
    }
}

#[test]
fn ignores_readiness_of_other_actors() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartSession {
            mode: SessionMode::VersusRival,
            player_controller: Controller::Autopilot,
        },
        &mut events,
    );
    events.clear();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut events,
    );

    let mut pilot = Pilot::new(Config::new(ActorId::RIVAL, 3));
    let mut commands = Vec::new();
    pilot.handle(
        &[Event::ActorReady {
            actor: ActorId::PLAYER,
        }],
        &query::actor_view(&world),
        query::food(&world),
        query::arena(&world).half_extent(),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn rival_steers_onto_food_in_session() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureArena {
            half_extent: 4,
            player_speed: 1.0,
            rival_speed: 1.0,
            reverse_on_eat: false,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::StartSession {
            mode: SessionMode::VersusRival,
            player_controller: Controller::Keyboard,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::PlaceFood {
            cell: GridCell::new(3, 2, 3),
        },
        &mut events,
    );

    let mut pilot = Pilot::new(Config::new(ActorId::RIVAL, 5));
    let mut log = Vec::new();
    for _ in 0..2 {
        let mut tick_events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut tick_events,
        );

        let mut commands = Vec::new();
        pilot.handle(
            &tick_events,
            &query::actor_view(&world),
            query::food(&world),
            query::arena(&world).half_extent(),
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![Command::SteerActor {
                actor: ActorId::RIVAL,
                heading: Heading::PosY,
            }]
        );
        for command in commands {
            world::apply(&mut world, command, &mut log);
        }
    }

    assert!(log.contains(&Event::FoodEaten {
        actor: ActorId::RIVAL,
        cell: GridCell::new(3, 2, 3),
    }));
    assert_eq!(query::score(&world, ActorId::RIVAL), Some(1));
}
