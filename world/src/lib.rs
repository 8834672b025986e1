#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for cubesnake.

pub mod body;
pub mod collision;
pub mod orientation;
pub mod tick_gate;
pub mod turn_queue;

use cubesnake_core::{
    ActorId, Collision, Command, Controller, Event, GridCell, Heading, Orientation, SessionMode,
    StrategyKind, TurnCommand, SEED_BODY_LENGTH,
};
use glam::Vec3;
use tracing::{debug, trace};

use crate::{
    body::BodyChain, collision::classify, orientation::MovementStrategy, tick_gate::TickGate,
    turn_queue::TurnQueue,
};

const DEFAULT_HALF_EXTENT: u32 = 4;
const DEFAULT_PLAYER_SPEED: f32 = 3.0;
const DEFAULT_RIVAL_SPEED: f32 = 2.0;

const PLAYER_SPAWN: GridCell = GridCell::ORIGIN;
const RIVAL_SPAWN_OFFSET: u32 = 3;
/// Smallest half extent that holds both seed bodies inside the walls and apart.
pub const MIN_SESSION_HALF_EXTENT: u32 = 2;
const SEED_HEADING: Heading = Heading::PosY;
const SEED_UP: Vec3 = Vec3::Z;

/// Arena bounds, movement rates and eating rule shared by every actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    half_extent: u32,
    player_speed: f32,
    rival_speed: f32,
    reverse_on_eat: bool,
}

impl Arena {
    /// Largest absolute coordinate a cell may take on any axis.
    #[must_use]
    pub const fn half_extent(&self) -> u32 {
        self.half_extent
    }

    /// Moves per second granted to the player actor.
    #[must_use]
    pub const fn player_speed(&self) -> f32 {
        self.player_speed
    }

    /// Moves per second granted to the rival actor.
    #[must_use]
    pub const fn rival_speed(&self) -> f32 {
        self.rival_speed
    }

    /// Reports whether eating reverses the eater instead of plainly growing it.
    #[must_use]
    pub const fn reverse_on_eat(&self) -> bool {
        self.reverse_on_eat
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            half_extent: DEFAULT_HALF_EXTENT,
            player_speed: DEFAULT_PLAYER_SPEED,
            rival_speed: DEFAULT_RIVAL_SPEED,
            reverse_on_eat: false,
        }
    }
}

/// Lifecycle stage of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No session has been started since the arena was configured.
    Idle,
    /// Actors are moving.
    Running,
    /// The player crashed; only a new `StartSession` resumes play.
    Over,
}

/// Represents the authoritative cubesnake session state.
#[derive(Debug)]
pub struct World {
    arena: Arena,
    phase: Phase,
    actors: Vec<Actor>,
    food: Option<GridCell>,
    tick_index: u64,
}

impl World {
    /// Creates an idle world using the default arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Arena::default(),
            phase: Phase::Idle,
            actors: Vec::new(),
            food: None,
            tick_index: 0,
        }
    }

    fn start_session(&mut self, mode: SessionMode, player_controller: Controller) -> bool {
        if self.arena.half_extent < MIN_SESSION_HALF_EXTENT {
            debug!(
                half_extent = self.arena.half_extent,
                "arena too small to seed actors"
            );
            return false;
        }

        let mut actors = vec![Actor::seeded(
            ActorId::PLAYER,
            player_controller,
            PLAYER_SPAWN,
            StrategyKind::GravityLocked,
            self.arena.player_speed,
        )];

        if mode == SessionMode::VersusRival {
            let offset = i32::try_from(RIVAL_SPAWN_OFFSET.min(self.arena.half_extent)).unwrap_or(0);
            actors.push(Actor::seeded(
                ActorId::RIVAL,
                Controller::Autopilot,
                GridCell::new(offset, 0, offset),
                StrategyKind::FreeRoam,
                self.arena.rival_speed,
            ));
        }

        self.actors = actors;
        self.food = None;
        self.phase = Phase::Running;
        true
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors.iter().position(|candidate| candidate.id == actor)
    }

    fn live_actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        if self.phase != Phase::Running {
            return None;
        }
        self.actors
            .iter_mut()
            .find(|candidate| candidate.id == actor && candidate.alive)
    }

    fn tick(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        for actor in &mut self.actors {
            actor.awaiting_heading = false;
        }

        for index in 0..self.actors.len() {
            if self.phase != Phase::Running {
                break;
            }

            let actor = &mut self.actors[index];
            if !actor.alive || !actor.gate.advance(dt) {
                continue;
            }

            if actor.controller == Controller::Autopilot {
                actor.awaiting_heading = true;
                out_events.push(Event::ActorReady { actor: actor.id });
            } else {
                self.step_keyboard_actor(index, out_events);
            }
        }
    }

    fn step_keyboard_actor(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let actor = &mut self.actors[index];
        if let Some(command) = actor.turns.dequeue() {
            let turned = actor.strategy.apply_turn(actor.orientation, command);
            if turned != actor.orientation {
                actor.orientation = turned;
                out_events.push(Event::OrientationChanged {
                    actor: actor.id,
                    orientation: turned,
                });
            }
        }

        let heading = actor.orientation.heading();
        self.advance_actor(index, heading, out_events);
    }

    fn steer_actor(&mut self, actor: ActorId, heading: Heading, out_events: &mut Vec<Event>) {
        let Some(index) = self.actor_index(actor) else {
            return;
        };
        if self.phase != Phase::Running {
            return;
        }

        let actor = &mut self.actors[index];
        if !actor.alive || !actor.awaiting_heading {
            return;
        }
        actor.awaiting_heading = false;

        if heading == actor.orientation.heading().opposite() {
            trace!(actor = actor.id.get(), ?heading, "rejected reversing heading");
            return;
        }

        let steered = Orientation::facing_heading(heading, actor.orientation.up());
        if steered != actor.orientation {
            actor.orientation = steered;
            actor.strategy.resync(&steered);
            out_events.push(Event::OrientationChanged {
                actor: actor.id,
                orientation: steered,
            });
        }

        self.advance_actor(index, heading, out_events);
    }

    fn advance_actor(&mut self, index: usize, heading: Heading, out_events: &mut Vec<Event>) {
        let next_head = self.actors[index].body.head().offset(heading);
        let collision = {
            let others: Vec<&BodyChain> = self
                .actors
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, actor)| &actor.body)
                .collect();
            classify(
                next_head,
                self.arena.half_extent,
                &self.actors[index].body,
                others.as_slice(),
            )
        };

        if let Some(collision) = collision {
            self.crash(index, collision, next_head, out_events);
            return;
        }

        let reverse_on_eat = self.arena.reverse_on_eat;
        let ate = self.food == Some(next_head);
        let actor = &mut self.actors[index];
        let from = actor.body.head();
        let to = actor.body.advance(heading);
        out_events.push(Event::ActorAdvanced {
            actor: actor.id,
            from,
            to,
        });

        if !ate {
            return;
        }

        self.food = None;
        debug!(actor = actor.id.get(), ?to, "food eaten");
        out_events.push(Event::FoodEaten {
            actor: actor.id,
            cell: to,
        });

        if reverse_on_eat {
            let reversed = actor.body.reverse_and_grow(actor.orientation);
            actor.orientation = reversed;
            actor.strategy.resync(&reversed);
            out_events.push(Event::ActorReversed {
                actor: actor.id,
                orientation: reversed,
            });
        } else {
            actor.body.grow();
        }

        out_events.push(Event::ActorGrew {
            actor: actor.id,
            length: actor.body.len(),
        });
    }

    fn crash(
        &mut self,
        index: usize,
        collision: Collision,
        cell: GridCell,
        out_events: &mut Vec<Event>,
    ) {
        let actor = &mut self.actors[index];
        actor.alive = false;
        actor.awaiting_heading = false;
        debug!(actor = actor.id.get(), ?collision, ?cell, "actor crashed");
        out_events.push(Event::ActorCrashed {
            actor: actor.id,
            collision,
            cell,
        });

        if actor.id == ActorId::PLAYER {
            self.phase = Phase::Over;
            out_events.push(Event::SessionEnded { cause: collision });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArena {
            half_extent,
            player_speed,
            rival_speed,
            reverse_on_eat,
        } => {
            world.arena = Arena {
                half_extent,
                player_speed,
                rival_speed,
                reverse_on_eat,
            };
            world.actors.clear();
            world.food = None;
            world.phase = Phase::Idle;
        }
        Command::StartSession {
            mode,
            player_controller,
        } => {
            if world.start_session(mode, player_controller) {
                debug!(?mode, "session started");
                out_events.push(Event::SessionStarted { mode });
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            if world.phase == Phase::Running {
                world.tick(dt, out_events);
            }
        }
        Command::QueueTurn { actor, command } => {
            let Some(actor) = world.live_actor_mut(actor) else {
                return;
            };

            match command {
                TurnCommand::SwitchStrategy(kind) => {
                    actor.turns.clear();
                    if actor.strategy.kind() != kind {
                        actor.strategy = MovementStrategy::new(kind, &actor.orientation);
                        debug!(actor = actor.id.get(), strategy = kind.label(), "strategy switched");
                        out_events.push(Event::StrategySwitched {
                            actor: actor.id,
                            kind,
                        });
                    }
                }
                _ if actor.controller != Controller::Keyboard => {}
                _ => {
                    if !actor.turns.enqueue(command) {
                        out_events.push(Event::TurnDropped {
                            actor: actor.id,
                            command,
                        });
                    }
                }
            }
        }
        Command::SteerActor { actor, heading } => world.steer_actor(actor, heading, out_events),
        Command::PlaceFood { cell } => {
            if world.phase != Phase::Running || cell.extent() > world.arena.half_extent {
                return;
            }
            world.food = Some(cell);
            out_events.push(Event::FoodPlaced { cell });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cubesnake_core::{ActorId, ActorSnapshot, ActorView, GridCell};

    use super::{Arena, Phase, World};

    /// Arena configuration currently in effect.
    #[must_use]
    pub fn arena(world: &World) -> Arena {
        world.arena
    }

    /// Lifecycle stage of the session.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Cell holding the food, if any is placed.
    #[must_use]
    pub fn food(world: &World) -> Option<GridCell> {
        world.food
    }

    /// Captures a read-only view of every actor in the session.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .iter()
                .map(|actor| ActorSnapshot {
                    id: actor.id,
                    controller: actor.controller,
                    body: actor.body.to_vec(),
                    orientation: actor.orientation,
                    strategy: actor.strategy.kind(),
                    alive: actor.alive,
                    awaiting_heading: actor.awaiting_heading,
                })
                .collect(),
        )
    }

    /// Every cell covered by any actor's body, in actor order.
    #[must_use]
    pub fn occupied_cells(world: &World) -> Vec<GridCell> {
        world
            .actors
            .iter()
            .flat_map(|actor| actor.body.iter())
            .collect()
    }

    /// Points accumulated by the actor beyond its seed body.
    #[must_use]
    pub fn score(world: &World, actor: ActorId) -> Option<usize> {
        world
            .actors
            .iter()
            .find(|candidate| candidate.id == actor)
            .map(|candidate| candidate.body.len().saturating_sub(super::SEED_BODY_LENGTH))
    }

    /// Number of pending turn commands buffered for the actor.
    #[must_use]
    pub fn pending_turns(world: &World, actor: ActorId) -> usize {
        world
            .actors
            .iter()
            .find(|candidate| candidate.id == actor)
            .map_or(0, |candidate| candidate.turns.len())
    }

    /// Reports whether the session has been started and not yet ended.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.phase == Phase::Running
    }
}

#[derive(Debug)]
struct Actor {
    id: ActorId,
    controller: Controller,
    body: BodyChain,
    orientation: Orientation,
    strategy: MovementStrategy,
    turns: TurnQueue,
    gate: TickGate,
    alive: bool,
    awaiting_heading: bool,
}

impl Actor {
    fn seeded(
        id: ActorId,
        controller: Controller,
        head: GridCell,
        strategy: StrategyKind,
        speed: f32,
    ) -> Self {
        let orientation = Orientation::facing_heading(SEED_HEADING, SEED_UP);
        Self {
            id,
            controller,
            body: BodyChain::seeded(head, SEED_HEADING.opposite(), SEED_BODY_LENGTH),
            strategy: MovementStrategy::new(strategy, &orientation),
            orientation,
            turns: TurnQueue::new(),
            gate: TickGate::from_speed(speed),
            alive: true,
            awaiting_heading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn running_world(mode: SessionMode) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureArena {
                half_extent: 4,
                player_speed: 1.0,
                rival_speed: 1.0,
                reverse_on_eat: false,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StartSession {
                mode,
                player_controller: Controller::Keyboard,
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn start_session_seeds_player_body() {
        let (world, events) = running_world(SessionMode::Classic);
        assert_eq!(
            events,
            vec![Event::SessionStarted {
                mode: SessionMode::Classic
            }]
        );

        let view = query::actor_view(&world);
        let player = view.get(ActorId::PLAYER).expect("player seeded");
        assert_eq!(
            player.body,
            vec![
                GridCell::new(0, 0, 0),
                GridCell::new(0, -1, 0),
                GridCell::new(0, -2, 0),
            ]
        );
        assert_eq!(player.orientation.facing(), Vec3::Y);
        assert_eq!(player.orientation.up(), Vec3::Z);
        assert_eq!(player.strategy, StrategyKind::GravityLocked);
        assert!(view.get(ActorId::RIVAL).is_none());
    }

    #[test]
    fn versus_session_seeds_rival_on_autopilot() {
        let (world, _) = running_world(SessionMode::VersusRival);
        let view = query::actor_view(&world);
        let rival = view.get(ActorId::RIVAL).expect("rival seeded");
        assert_eq!(rival.controller, Controller::Autopilot);
        assert_eq!(rival.head(), GridCell::new(3, 0, 3));
        assert_eq!(rival.body.len(), SEED_BODY_LENGTH);
    }

    #[test]
    fn undersized_arena_refuses_to_seed_actors() {
        for half_extent in 0..MIN_SESSION_HALF_EXTENT {
            let mut world = World::new();
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::ConfigureArena {
                    half_extent,
                    player_speed: 1.0,
                    rival_speed: 1.0,
                    reverse_on_eat: false,
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::StartSession {
                    mode: SessionMode::VersusRival,
                    player_controller: Controller::Keyboard,
                },
                &mut events,
            );

            assert!(events.is_empty(), "half extent {half_extent} started a session");
            assert_eq!(query::phase(&world), Phase::Idle);
            assert!(query::actor_view(&world).into_vec().is_empty());

            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
            assert_eq!(query::phase(&world), Phase::Idle);
        }
    }

    #[test]
    fn smallest_arena_seeds_disjoint_bodies_inside_walls() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureArena {
                half_extent: MIN_SESSION_HALF_EXTENT,
                player_speed: 1.0,
                rival_speed: 1.0,
                reverse_on_eat: false,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StartSession {
                mode: SessionMode::VersusRival,
                player_controller: Controller::Keyboard,
            },
            &mut events,
        );

        assert_eq!(query::phase(&world), Phase::Running);
        let view = query::actor_view(&world);
        let player = view.get(ActorId::PLAYER).expect("player seeded");
        let rival = view.get(ActorId::RIVAL).expect("rival seeded");
        assert_eq!(rival.head(), GridCell::new(2, 0, 2));

        let occupied = query::occupied_cells(&world);
        assert!(occupied
            .iter()
            .all(|cell| cell.extent() <= MIN_SESSION_HALF_EXTENT));
        assert!(player.body.iter().all(|cell| !rival.body.contains(cell)));
    }

    #[test]
    fn configure_arena_discards_running_session() {
        let (mut world, _) = running_world(SessionMode::Classic);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureArena {
                half_extent: 6,
                player_speed: 2.0,
                rival_speed: 2.0,
                reverse_on_eat: true,
            },
            &mut events,
        );

        assert_eq!(query::phase(&world), Phase::Idle);
        assert!(query::actor_view(&world).into_vec().is_empty());
        assert_eq!(query::arena(&world).half_extent(), 6);
        assert!(query::arena(&world).reverse_on_eat());
    }

    #[test]
    fn autopilot_actor_waits_for_heading() {
        let (mut world, _) = running_world(SessionMode::VersusRival);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );

        assert!(events.contains(&Event::ActorReady {
            actor: ActorId::RIVAL
        }));
        let view = query::actor_view(&world);
        let rival = view.get(ActorId::RIVAL).expect("rival present");
        assert!(rival.awaiting_heading);
        assert_eq!(rival.head(), GridCell::new(3, 0, 3));
    }

    #[test]
    fn steer_without_ready_gate_is_ignored() {
        let (mut world, _) = running_world(SessionMode::VersusRival);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SteerActor {
                actor: ActorId::RIVAL,
                heading: Heading::PosX,
            },
            &mut events,
        );

        assert!(events.is_empty());
        let view = query::actor_view(&world);
        assert_eq!(
            view.get(ActorId::RIVAL).map(|rival| rival.head()),
            Some(GridCell::new(3, 0, 3))
        );
    }

    #[test]
    fn steer_rejects_reversal() {
        let (mut world, _) = running_world(SessionMode::VersusRival);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::SteerActor {
                actor: ActorId::RIVAL,
                heading: Heading::NegY,
            },
            &mut events,
        );

        assert!(events.is_empty());
        let view = query::actor_view(&world);
        let rival = view.get(ActorId::RIVAL).expect("rival present");
        assert_eq!(rival.head(), GridCell::new(3, 0, 3));
        assert!(!rival.awaiting_heading);
    }

    #[test]
    fn food_outside_arena_is_rejected() {
        let (mut world, _) = running_world(SessionMode::Classic);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceFood {
                cell: GridCell::new(0, 5, 0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::food(&world), None);
    }
}
