//! Fixed-step frame loop that wires the world to the pilot and spawning systems.

use std::time::Duration;

use cubesnake_core::{
    ActorId, Collision, Command, Controller, Event, GridCell, SessionMode, TurnCommand,
};
use cubesnake_system_pilot::{Config as PilotConfig, Pilot};
use cubesnake_system_spawning::{Config as SpawningConfig, Spawning};
use cubesnake_world::{self as world, query, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::{config::GameConfig, script::KeyScript};

/// Parameters of one headless run that do not come from the config file.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunOptions {
    pub(crate) mode: SessionMode,
    pub(crate) player_controller: Controller,
    pub(crate) duration: Duration,
    pub(crate) frame: Duration,
}

/// Outcome of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) mode: SessionMode,
    pub(crate) frames: u64,
    pub(crate) simulated_ms: u128,
    pub(crate) arena: ArenaSummary,
    pub(crate) end_cause: Option<Collision>,
    pub(crate) turns_dropped: usize,
    pub(crate) food_eaten: usize,
    pub(crate) actors: Vec<ActorSummary>,
}

/// Arena settings the world ran with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct ArenaSummary {
    pub(crate) half_extent: u32,
    pub(crate) player_speed: f32,
    pub(crate) rival_speed: f32,
    pub(crate) reverse_on_eat: bool,
}

/// Final state of one actor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct ActorSummary {
    pub(crate) id: u32,
    pub(crate) controller: Controller,
    pub(crate) alive: bool,
    pub(crate) head: GridCell,
    pub(crate) length: usize,
    pub(crate) score: usize,
    pub(crate) crash: Option<Collision>,
}

/// Owns the world and every system participating in a session.
pub(crate) struct Session {
    world: World,
    pilots: Vec<Pilot>,
    spawning: Spawning,
    script: KeyScript,
    player_controller: Controller,
    tally: Tally,
}

#[derive(Debug, Default)]
struct Tally {
    end_cause: Option<Collision>,
    turns_dropped: usize,
    food_eaten: usize,
    crashes: Vec<(ActorId, Collision)>,
}

impl Session {
    /// Configures the arena, seeds the actors and places the first food item.
    pub(crate) fn start(config: &GameConfig, options: &RunOptions, script: KeyScript) -> Self {
        let mut pilots = Vec::new();
        if options.player_controller == Controller::Autopilot {
            pilots.push(Pilot::new(PilotConfig::new(
                ActorId::PLAYER,
                config.player.seed,
            )));
        }
        if options.mode == SessionMode::VersusRival {
            pilots.push(Pilot::new(
                PilotConfig::new(ActorId::RIVAL, config.rival.seed)
                    .with_aggressive(config.rival.aggressive)
                    .with_hunt_radius(config.rival.hunt_radius),
            ));
        }

        let mut session = Self {
            world: World::new(),
            pilots,
            spawning: Spawning::new(SpawningConfig::new(
                config.food.respawn_delay(),
                config.food.seed,
            )),
            script,
            player_controller: options.player_controller,
            tally: Tally::default(),
        };

        let mut events = Vec::new();
        world::apply(&mut session.world, config.arena_command(), &mut events);
        world::apply(
            &mut session.world,
            Command::StartSession {
                mode: options.mode,
                player_controller: options.player_controller,
            },
            &mut events,
        );
        world::apply(
            &mut session.world,
            Command::QueueTurn {
                actor: ActorId::PLAYER,
                command: TurnCommand::SwitchStrategy(config.player.strategy),
            },
            &mut events,
        );
        session.pump(events);
        session
    }

    /// Advances the session by one frame of simulated time.
    pub(crate) fn step(&mut self, frame: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt: frame }, &mut events);
        self.pump(events);
    }

    /// Reports whether the player is still moving.
    pub(crate) fn is_running(&self) -> bool {
        query::is_running(&self.world)
    }

    fn pump(&mut self, pending_events: Vec<Event>) {
        let mut events = pending_events;

        while !events.is_empty() {
            self.tally.record(&events);
            let mut generated = Vec::new();

            let mut commands = Vec::new();
            self.feed_script(&events, &mut commands);
            apply_all(&mut self.world, commands, &mut generated);

            for index in 0..self.pilots.len() {
                let actor_view = query::actor_view(&self.world);
                let mut commands = Vec::new();
                self.pilots[index].handle(
                    &events,
                    &actor_view,
                    query::food(&self.world),
                    query::arena(&self.world).half_extent(),
                    &mut commands,
                );
                apply_all(&mut self.world, commands, &mut generated);
            }

            let mut commands = Vec::new();
            self.spawning.handle(
                &events,
                query::food(&self.world),
                query::arena(&self.world).half_extent(),
                &query::occupied_cells(&self.world),
                &mut commands,
            );
            apply_all(&mut self.world, commands, &mut generated);

            events = generated;
        }
    }

    // The keyboard actor consumes at most one queued turn per move, so the
    // script releases one key when the session starts and one after each move.
    fn feed_script(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.player_controller != Controller::Keyboard {
            return;
        }

        for event in events {
            let player_moved = match event {
                Event::SessionStarted { .. } => true,
                Event::ActorAdvanced { actor, .. } => *actor == ActorId::PLAYER,
                _ => false,
            };
            if !player_moved {
                continue;
            }
            if let Some(Some(command)) = self.script.next_step() {
                out.push(Command::QueueTurn {
                    actor: ActorId::PLAYER,
                    command,
                });
            }
        }
    }

    /// Collects the outcome of the session so far.
    pub(crate) fn summary(&self, mode: SessionMode, simulated: Duration) -> Summary {
        let arena = query::arena(&self.world);
        let actors = query::actor_view(&self.world)
            .into_vec()
            .into_iter()
            .map(|snapshot| ActorSummary {
                id: snapshot.id.get(),
                controller: snapshot.controller,
                alive: snapshot.alive,
                head: snapshot.head(),
                length: snapshot.body.len(),
                score: snapshot.score(),
                crash: self
                    .tally
                    .crashes
                    .iter()
                    .find(|(actor, _)| *actor == snapshot.id)
                    .map(|(_, collision)| *collision),
            })
            .collect();

        Summary {
            mode,
            frames: query::tick_index(&self.world),
            simulated_ms: simulated.as_millis(),
            arena: ArenaSummary {
                half_extent: arena.half_extent(),
                player_speed: arena.player_speed(),
                rival_speed: arena.rival_speed(),
                reverse_on_eat: arena.reverse_on_eat(),
            },
            end_cause: self.tally.end_cause,
            turns_dropped: self.tally.turns_dropped,
            food_eaten: self.tally.food_eaten,
            actors,
        }
    }
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TurnDropped { actor, command } => {
                    debug!(actor = actor.get(), ?command, "turn dropped");
                    self.turns_dropped += 1;
                }
                Event::FoodEaten { .. } => self.food_eaten += 1,
                Event::ActorCrashed {
                    actor, collision, ..
                } => self.crashes.push((*actor, *collision)),
                Event::SessionEnded { cause } => {
                    info!(?cause, "session ended");
                    self.end_cause = Some(*cause);
                }
                _ => {}
            }
        }
    }
}

fn apply_all(world: &mut World, commands: Vec<Command>, out_events: &mut Vec<Event>) {
    for command in commands {
        world::apply(world, command, out_events);
    }
}

/// Runs a whole session with a fixed frame duration and summarises it.
pub(crate) fn run(config: &GameConfig, options: &RunOptions, script: KeyScript) -> Summary {
    let mut session = Session::start(config, options, script);
    let mut simulated = Duration::ZERO;

    if !options.frame.is_zero() {
        while simulated < options.duration && session.is_running() {
            session.step(options.frame);
            simulated = simulated.saturating_add(options.frame);
        }
    }

    session.summary(options.mode, simulated)
}
