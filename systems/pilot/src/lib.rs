#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autopilot system that chooses a heading for a computer-controlled actor.
//!
//! The pilot reacts to [`Event::ActorReady`] for the actor it drives. It
//! enumerates the axis-aligned moves that do not reverse the actor or run it
//! into a wall or body, weighs seeking food against hunting the opponent, and
//! answers with a single [`Command::SteerActor`]. Ties between equally good
//! moves are broken by a seeded generator, so runs are reproducible.

use cubesnake_core::{ActorId, ActorView, Command, Event, GridCell, Heading};
use cubesnake_world::collision::classify;
use glam::Vec3;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

const FOOD_BASE_PRIORITY: f32 = 10.0;
const FOOD_PROXIMITY_WEIGHT: f32 = 30.0;
const FOOD_CATCH_UP_BONUS: f32 = 15.0;
const HUNT_BASE_PRIORITY: f32 = 12.0;
const HUNT_PROXIMITY_WEIGHT: f32 = 25.0;
const HUNT_LENGTH_BONUS: f32 = 10.0;
const DISTANCE_SOFTENING: f32 = 0.1;
const FOOD_LOCK_DISTANCE: f32 = 2.0;
const OPPONENT_CLOSE_DISTANCE: f32 = 2.0;
const INTERCEPT_STRIDE: f32 = 1.5;
const MIN_INTERCEPT_STEPS: f32 = 1.0;
const MAX_INTERCEPT_STEPS: f32 = 6.0;
const CENTER_BIAS: f32 = 0.1;

/// Configuration parameters required to construct the pilot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    actor: ActorId,
    rng_seed: u64,
    aggressive: bool,
    hunt_radius: Option<f32>,
}

impl Config {
    /// Creates an aggressive configuration for `actor` with an unlimited hunt radius.
    #[must_use]
    pub const fn new(actor: ActorId, rng_seed: u64) -> Self {
        Self {
            actor,
            rng_seed,
            aggressive: true,
            hunt_radius: None,
        }
    }

    /// Enables or disables hunting the opponent.
    #[must_use]
    pub const fn with_aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = aggressive;
        self
    }

    /// Limits hunting to opponents whose head lies within `radius` cells.
    #[must_use]
    pub const fn with_hunt_radius(mut self, radius: Option<f32>) -> Self {
        self.hunt_radius = radius;
        self
    }
}

/// Goal the pilot pursues for the current decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Head for the food.
    Eat,
    /// Head for the predicted interception point ahead of the opponent.
    Hunt,
}

/// Blended weights of the two goals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Priorities {
    /// Weight of reaching the food.
    pub food: f32,
    /// Weight of cutting off the opponent; zero when hunting is ruled out.
    pub hunt: f32,
}

/// Heading chosen for one tick together with the reasoning behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    /// Direction the actor should move along.
    pub heading: Heading,
    /// Goal that won the priority comparison.
    pub mode: Mode,
    /// Point the candidate moves were scored against.
    pub target: Vec3,
    /// Weights that selected the mode.
    pub priorities: Priorities,
}

/// Opponent as seen by the pilot.
#[derive(Clone, Copy, Debug)]
pub struct Opponent<'a> {
    /// Opponent body, head first.
    pub body: &'a [GridCell],
    /// Unit vector the opponent currently travels along.
    pub facing: Vec3,
}

/// Read-only picture of the arena from the piloted actor's point of view.
#[derive(Clone, Debug)]
pub struct Situation<'a> {
    /// Largest absolute coordinate a cell may take on any axis.
    pub half_extent: u32,
    /// Piloted actor's body, head first.
    pub body: &'a [GridCell],
    /// Direction the piloted actor currently travels along.
    pub heading: Heading,
    /// Cell holding the food, if any.
    pub food: Option<GridCell>,
    /// Bodies of every other actor, alive or not.
    pub obstacles: Vec<&'a [GridCell]>,
    /// Living opponent to weigh hunting against, if any.
    pub opponent: Option<Opponent<'a>>,
}

/// Pure system that steers one autopilot actor.
#[derive(Debug)]
pub struct Pilot {
    actor: ActorId,
    aggressive: bool,
    hunt_radius: Option<f32>,
    rng: ChaCha8Rng,
}

impl Pilot {
    /// Creates a new pilot using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            actor: config.actor,
            aggressive: config.aggressive,
            hunt_radius: config.hunt_radius,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit steering commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        actors: &ActorView,
        food: Option<GridCell>,
        half_extent: u32,
        out: &mut Vec<Command>,
    ) {
        let ready = events
            .iter()
            .any(|event| matches!(event, Event::ActorReady { actor } if *actor == self.actor));
        if !ready {
            return;
        }

        let Some(own) = actors.get(self.actor) else {
            return;
        };
        if !own.alive || !own.awaiting_heading {
            return;
        }

        let situation = Situation {
            half_extent,
            body: &own.body,
            heading: own.orientation.heading(),
            food,
            obstacles: actors
                .iter()
                .filter(|snapshot| snapshot.id != self.actor)
                .map(|snapshot| snapshot.body.as_slice())
                .collect(),
            opponent: actors
                .iter()
                .find(|snapshot| snapshot.id != self.actor && snapshot.alive)
                .map(|snapshot| Opponent {
                    body: &snapshot.body,
                    facing: snapshot.orientation.facing(),
                }),
        };

        match self.decide(&situation) {
            Some(decision) => out.push(Command::SteerActor {
                actor: self.actor,
                heading: decision.heading,
            }),
            None => trace!(actor = self.actor.get(), "no safe move, holding position"),
        }
    }

    /// Picks the best safe heading, or `None` when every move is fatal.
    pub fn decide(&mut self, situation: &Situation<'_>) -> Option<Decision> {
        let head = situation.body.first().copied()?;
        let mut candidates = safe_moves(situation);
        if candidates.is_empty() {
            return None;
        }

        let priorities = self.priorities(situation);
        let (mode, target) = match situation.opponent {
            Some(opponent) if priorities.hunt > priorities.food => {
                let opponent_head = opponent.body.first().copied().unwrap_or(head);
                let distance = head.distance(opponent_head);
                (
                    Mode::Hunt,
                    intercept_point(opponent_head, opponent.facing, distance),
                )
            }
            _ => (
                Mode::Eat,
                situation.food.unwrap_or(GridCell::ORIGIN).to_vec3(),
            ),
        };

        candidates.shuffle(&mut self.rng);

        let mut best: Option<(Heading, f32)> = None;
        for heading in candidates {
            let next = head.offset(heading).to_vec3();
            let mut score = next.distance(target);
            if mode == Mode::Hunt {
                score += CENTER_BIAS * next.length();
            }
            let improves = match best {
                Some((_, best_score)) => score < best_score,
                None => true,
            };
            if improves {
                best = Some((heading, score));
            }
        }

        let (heading, score) = best?;
        trace!(
            actor = self.actor.get(),
            ?heading,
            ?mode,
            food = priorities.food,
            hunt = priorities.hunt,
            score,
            "pilot decision"
        );

        Some(Decision {
            heading,
            mode,
            target,
            priorities,
        })
    }

    fn priorities(&self, situation: &Situation<'_>) -> Priorities {
        let Some(head) = situation.body.first().copied() else {
            return Priorities {
                food: FOOD_BASE_PRIORITY,
                hunt: 0.0,
            };
        };
        let own_length = situation.body.len();
        let opponent_length = situation.opponent.map(|opponent| opponent.body.len());

        let food_distance = head.distance(situation.food.unwrap_or(GridCell::ORIGIN));
        let mut food = FOOD_BASE_PRIORITY
            + FOOD_PROXIMITY_WEIGHT / (food_distance + DISTANCE_SOFTENING);
        if opponent_length.is_some_and(|length| own_length < length) {
            food += FOOD_CATCH_UP_BONUS;
        }

        let hunt = match situation.opponent {
            Some(opponent) if self.aggressive => {
                let opponent_distance = opponent
                    .body
                    .first()
                    .map_or(f32::INFINITY, |opponent_head| head.distance(*opponent_head));
                let beyond_radius = self
                    .hunt_radius
                    .is_some_and(|radius| opponent_distance > radius);
                let food_locked = situation.food.is_some()
                    && food_distance < FOOD_LOCK_DISTANCE
                    && opponent_distance > OPPONENT_CLOSE_DISTANCE;

                if beyond_radius || food_locked {
                    0.0
                } else {
                    let mut hunt = HUNT_BASE_PRIORITY
                        + HUNT_PROXIMITY_WEIGHT / (opponent_distance + DISTANCE_SOFTENING);
                    if opponent_length.is_some_and(|length| own_length > length) {
                        hunt += HUNT_LENGTH_BONUS;
                    }
                    hunt
                }
            }
            _ => 0.0,
        };

        Priorities { food, hunt }
    }
}

/// Enumerates the headings that neither reverse the actor nor collide.
#[must_use]
pub fn safe_moves(situation: &Situation<'_>) -> Vec<Heading> {
    let Some(head) = situation.body.first().copied() else {
        return Vec::new();
    };
    let reverse = situation.heading.opposite();

    Heading::ALL
        .into_iter()
        .filter(|heading| *heading != reverse)
        .filter(|heading| {
            classify(
                head.offset(*heading),
                situation.half_extent,
                situation.body,
                situation.obstacles.as_slice(),
            )
            .is_none()
        })
        .collect()
}

/// Predicts where the opponent's head will be when the pilot could reach it.
///
/// The opponent is extrapolated along `facing` by one step per
/// `1.5` cells of separation, clamped to between one and six steps.
#[must_use]
pub fn intercept_point(opponent_head: GridCell, facing: Vec3, distance: f32) -> Vec3 {
    let steps = (distance / INTERCEPT_STRIDE)
        .round()
        .clamp(MIN_INTERCEPT_STEPS, MAX_INTERCEPT_STEPS);
    opponent_head.to_vec3() + facing * steps
}
