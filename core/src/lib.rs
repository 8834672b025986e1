#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cubesnake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Vectors shorter than this are treated as degenerate by orientation math.
pub const DEGENERATE_LENGTH: f32 = 0.01;

/// Number of segments every actor starts a session with.
pub const SEED_BODY_LENGTH: usize = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the arena bounds and the per-actor movement rates.
    ConfigureArena {
        /// Largest absolute coordinate a cell may take on any axis.
        half_extent: u32,
        /// Moves per second granted to the player actor.
        player_speed: f32,
        /// Moves per second granted to the rival actor.
        rival_speed: f32,
        /// Reverses the eater's travel direction instead of plainly growing it.
        reverse_on_eat: bool,
    },
    /// Discards any running session and seeds fresh actors; ignored when the
    /// arena is too small to hold the seed bodies.
    StartSession {
        /// Roster of actors participating in the session.
        mode: SessionMode,
        /// Controller that steers the player actor.
        player_controller: Controller,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Feeds a turn command into an actor's pending turn queue.
    QueueTurn {
        /// Actor receiving the command.
        actor: ActorId,
        /// Command to queue, or strategy switch to perform immediately.
        command: TurnCommand,
    },
    /// Commits an autopilot decision for an actor whose tick gate opened.
    SteerActor {
        /// Actor being steered.
        actor: ActorId,
        /// Axis-aligned direction the actor moves along this tick.
        heading: Heading,
    },
    /// Places the food item at the provided cell.
    PlaceFood {
        /// Cell that holds the food.
        cell: GridCell,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new session was seeded.
    SessionStarted {
        /// Roster the session was started with.
        mode: SessionMode,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Signals that an autopilot actor is due to move and awaits a heading.
    ActorReady {
        /// Actor whose tick gate opened.
        actor: ActorId,
    },
    /// Reports that a turn command was discarded because the queue was full.
    TurnDropped {
        /// Actor whose queue rejected the command.
        actor: ActorId,
        /// Command that was discarded.
        command: TurnCommand,
    },
    /// Confirms that an actor now steers with a different movement strategy.
    StrategySwitched {
        /// Actor that switched strategies.
        actor: ActorId,
        /// Strategy that became active.
        kind: StrategyKind,
    },
    /// Reports that a dequeued turn changed an actor's orientation.
    OrientationChanged {
        /// Actor whose orientation changed.
        actor: ActorId,
        /// Orientation after the turn was applied.
        orientation: Orientation,
    },
    /// Confirms that an actor's head moved between two cells.
    ActorAdvanced {
        /// Actor that advanced.
        actor: ActorId,
        /// Cell the head occupied before moving.
        from: GridCell,
        /// Cell the head occupies after moving.
        to: GridCell,
    },
    /// Confirms that food was placed into the arena.
    FoodPlaced {
        /// Cell that holds the food.
        cell: GridCell,
    },
    /// Reports that an actor's head reached the food cell.
    FoodEaten {
        /// Actor that ate the food.
        actor: ActorId,
        /// Cell the food occupied.
        cell: GridCell,
    },
    /// Confirms that an actor's body gained a segment.
    ActorGrew {
        /// Actor that grew.
        actor: ActorId,
        /// Body length after growing.
        length: usize,
    },
    /// Confirms that an actor's body was reversed so its tail leads.
    ActorReversed {
        /// Actor that reversed.
        actor: ActorId,
        /// Orientation derived for the new head.
        orientation: Orientation,
    },
    /// Reports a terminal collision predicted for an actor's next head cell.
    ActorCrashed {
        /// Actor that crashed.
        actor: ActorId,
        /// Classification of the obstacle.
        collision: Collision,
        /// Candidate head cell that triggered the crash.
        cell: GridCell,
    },
    /// Announces that the session is over.
    SessionEnded {
        /// Collision that ended the session.
        cause: Collision,
    },
}

/// Identifier assigned to an actor within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Identifier reserved for the human-facing player actor.
    pub const PLAYER: ActorId = ActorId(0);
    /// Identifier reserved for the computer-controlled rival actor.
    pub const RIVAL: ActorId = ActorId(1);

    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Source of an actor's steering decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    /// Turn commands arrive through the actor's turn queue.
    Keyboard,
    /// The pilot system answers `ActorReady` with `SteerActor`.
    Autopilot,
}

/// Roster of actors seeded when a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Solo session containing only the player.
    Classic,
    /// Survival session pitting the player against the computer-controlled rival.
    VersusRival,
}

/// Turning convention applied to queued turn commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Full six degree of freedom turning relative to the current basis.
    FreeRoam,
    /// Turning anchored to the world's vertical axis.
    GravityLocked,
}

impl StrategyKind {
    /// Human readable name of the strategy.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FreeRoam => "Free Roam (6DOF)",
            Self::GravityLocked => "Standard (Gravity Locked)",
        }
    }
}

/// Closed set of steering requests an actor can receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnCommand {
    /// Yaw toward the actor's left.
    TurnLeft,
    /// Yaw toward the actor's right.
    TurnRight,
    /// Pitch the nose upward.
    PitchUp,
    /// Pitch the nose downward.
    PitchDown,
    /// Roll the up vector toward the left.
    RollLeft,
    /// Roll the up vector toward the right.
    RollRight,
    /// Switch to a different movement strategy, discarding queued turns.
    SwitchStrategy(StrategyKind),
}

/// Obstacle classes a candidate head cell can collide with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collision {
    /// The cell lies outside the arena bounds.
    Wall,
    /// The cell is occupied by the actor's own body.
    OwnBody,
    /// The cell is occupied by another actor's body.
    Opponent,
}

/// Location of a single integer cell in the arena.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCell {
    x: i32,
    y: i32,
    z: i32,
}

impl GridCell {
    /// Cell at the centre of the arena.
    pub const ORIGIN: GridCell = GridCell::new(0, 0, 0);

    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Coordinate along the y axis.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Cell reached by taking one step along `heading`.
    #[must_use]
    pub const fn offset(self, heading: Heading) -> Self {
        let (dx, dy, dz) = heading.delta();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Largest absolute coordinate across the three axes.
    #[must_use]
    pub fn extent(self) -> u32 {
        self.x
            .unsigned_abs()
            .max(self.y.unsigned_abs())
            .max(self.z.unsigned_abs())
    }

    /// Continuous position of the cell's centre.
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Straight-line distance between two cells.
    #[must_use]
    pub fn distance(self, other: GridCell) -> f32 {
        self.to_vec3().distance(other.to_vec3())
    }
}

/// One of the six axis-aligned unit directions a body may move along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Toward increasing x.
    PosX,
    /// Toward decreasing x.
    NegX,
    /// Toward increasing y, the world's vertical axis.
    PosY,
    /// Toward decreasing y.
    NegY,
    /// Toward increasing z.
    PosZ,
    /// Toward decreasing z.
    NegZ,
}

impl Heading {
    /// Every heading in canonical order.
    pub const ALL: [Heading; 6] = [
        Heading::PosX,
        Heading::NegX,
        Heading::PosY,
        Heading::NegY,
        Heading::PosZ,
        Heading::NegZ,
    ];

    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Integer cell offset produced by one step along the heading.
    #[must_use]
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// Unit vector along the heading.
    #[must_use]
    pub fn unit(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// Snaps a continuous direction onto its dominant axis.
    ///
    /// Returns `None` for degenerate vectors. Axis-aligned inputs map exactly;
    /// diagonal inputs resolve to the component with the largest magnitude,
    /// preferring x, then y, then z on ties.
    #[must_use]
    pub fn nearest(direction: Vec3) -> Option<Self> {
        if !direction.is_finite() || direction.length() < DEGENERATE_LENGTH {
            return None;
        }

        let magnitude = direction.abs();
        let heading = if magnitude.x >= magnitude.y && magnitude.x >= magnitude.z {
            if direction.x > 0.0 {
                Self::PosX
            } else {
                Self::NegX
            }
        } else if magnitude.y >= magnitude.z {
            if direction.y > 0.0 {
                Self::PosY
            } else {
                Self::NegY
            }
        } else if direction.z > 0.0 {
            Self::PosZ
        } else {
            Self::NegZ
        };
        Some(heading)
    }
}

/// Orthonormal facing/up basis describing an actor's 3D orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    facing: Vec3,
    up: Vec3,
}

impl Orientation {
    /// Builds an orientation from a facing vector and an up hint.
    ///
    /// The facing vector is normalised (falling back to `+Z` when degenerate)
    /// and the hint is made perpendicular to it. When the hint is degenerate
    /// or parallel to the facing a fixed reference axis is used instead, so
    /// the result is always a valid orthonormal pair.
    #[must_use]
    pub fn new(facing: Vec3, up_hint: Vec3) -> Self {
        let facing = if facing.is_finite() && facing.length() >= DEGENERATE_LENGTH {
            facing.normalize()
        } else {
            Vec3::Z
        };

        let up = perpendicular_part(up_hint, facing).unwrap_or_else(|| {
            let reference = if facing.y.abs() > 0.9 { Vec3::Z } else { Vec3::Y };
            perpendicular_part(reference, facing).unwrap_or(Vec3::X)
        });

        Self { facing, up }
    }

    /// Orientation facing along `heading` with the given up hint.
    #[must_use]
    pub fn facing_heading(heading: Heading, up_hint: Vec3) -> Self {
        Self::new(heading.unit(), up_hint)
    }

    /// Unit vector the actor travels along.
    #[must_use]
    pub const fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Unit vector pointing out of the actor's back.
    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    /// Axis-aligned heading closest to the facing vector.
    #[must_use]
    pub fn heading(&self) -> Heading {
        Heading::nearest(self.facing).unwrap_or(Heading::PosZ)
    }
}

fn perpendicular_part(vector: Vec3, axis: Vec3) -> Option<Vec3> {
    if !vector.is_finite() {
        return None;
    }
    let projected = vector - axis * vector.dot(axis);
    if projected.length() < DEGENERATE_LENGTH {
        None
    } else {
        Some(projected.normalize())
    }
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier assigned to the actor.
    pub id: ActorId,
    /// Source of the actor's steering decisions.
    pub controller: Controller,
    /// Occupied cells ordered from head to tail.
    pub body: Vec<GridCell>,
    /// Current facing/up basis.
    pub orientation: Orientation,
    /// Movement strategy applied to queued turns.
    pub strategy: StrategyKind,
    /// Indicates whether the actor is still participating.
    pub alive: bool,
    /// Indicates whether the actor awaits a `SteerActor` command.
    pub awaiting_heading: bool,
}

impl ActorSnapshot {
    /// Cell occupied by the head segment.
    #[must_use]
    pub fn head(&self) -> GridCell {
        self.body.first().copied().unwrap_or_default()
    }

    /// Points accumulated beyond the seed body.
    #[must_use]
    pub fn score(&self) -> usize {
        self.body.len().saturating_sub(SEED_BODY_LENGTH)
    }
}

/// Read-only snapshot describing all actors in the session.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the actor with the provided identifier.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == actor)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_one_cell_along_heading() {
        let origin = GridCell::new(1, 2, 3);
        assert_eq!(origin.offset(Heading::NegY), GridCell::new(1, 1, 3));
        assert_eq!(origin.offset(Heading::PosZ), GridCell::new(1, 2, 4));
    }

    #[test]
    fn extent_uses_largest_absolute_axis() {
        assert_eq!(GridCell::new(-5, 2, 3).extent(), 5);
        assert_eq!(GridCell::ORIGIN.extent(), 0);
    }

    #[test]
    fn nearest_heading_snaps_axis_aligned_vectors_exactly() {
        for heading in Heading::ALL {
            assert_eq!(Heading::nearest(heading.unit()), Some(heading));
        }
        assert_eq!(Heading::nearest(Vec3::ZERO), None);
        assert_eq!(Heading::nearest(Vec3::new(0.2, -0.9, 0.1)), Some(Heading::NegY));
    }

    #[test]
    fn orientation_repairs_parallel_up_hint() {
        let orientation = Orientation::new(Vec3::Y, Vec3::NEG_Y);
        assert_eq!(orientation.facing(), Vec3::Y);
        assert!(orientation.facing().dot(orientation.up()).abs() < 1e-5);
        assert!((orientation.up().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orientation_recovers_from_zero_facing() {
        let orientation = Orientation::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(orientation.facing(), Vec3::Z);
        assert_eq!(orientation.up(), Vec3::Y);
    }

    #[test]
    fn score_counts_segments_beyond_seed() {
        let snapshot = ActorSnapshot {
            id: ActorId::PLAYER,
            controller: Controller::Keyboard,
            body: vec![GridCell::ORIGIN; 5],
            orientation: Orientation::new(Vec3::Y, Vec3::Z),
            strategy: StrategyKind::GravityLocked,
            alive: true,
            awaiting_heading: false,
        };
        assert_eq!(snapshot.score(), 2);
        assert_eq!(snapshot.head(), GridCell::ORIGIN);
    }
}
