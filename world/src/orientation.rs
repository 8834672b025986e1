//! Turning conventions that map turn commands onto orientation changes.
//!
//! Both conventions keep the facing/up pair orthonormal and refuse any turn
//! that would point the actor straight back along its previous facing.

use cubesnake_core::{Orientation, StrategyKind, TurnCommand, DEGENERATE_LENGTH};
use glam::Vec3;

/// Fixed vertical axis used by the gravity-locked convention.
pub const WORLD_UP: Vec3 = Vec3::Y;

const VERTICAL_THRESHOLD: f32 = 0.99;
const HORIZONTAL_THRESHOLD: f32 = 0.01;
const REVERSAL_THRESHOLD: f32 = -0.999;

/// Movement strategy bound to an actor together with the state it remembers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementStrategy {
    /// Yaw, pitch and roll relative to the actor's own basis.
    FreeRoam,
    /// Yaw and pitch relative to [`WORLD_UP`].
    GravityLocked {
        /// Last horizontal facing, used to steer while climbing or diving.
        horizontal_forward: Vec3,
    },
}

impl MovementStrategy {
    /// Creates the strategy of the given kind for an actor in `orientation`.
    #[must_use]
    pub fn new(kind: StrategyKind, orientation: &Orientation) -> Self {
        match kind {
            StrategyKind::FreeRoam => Self::FreeRoam,
            StrategyKind::GravityLocked => Self::GravityLocked {
                horizontal_forward: horizontal_reference(orientation),
            },
        }
    }

    /// Kind of the strategy.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::FreeRoam => StrategyKind::FreeRoam,
            Self::GravityLocked { .. } => StrategyKind::GravityLocked,
        }
    }

    /// Applies a turn command, returning the resulting orientation.
    ///
    /// Commands the convention does not understand leave the orientation
    /// untouched, as does any turn that would reverse the facing.
    #[must_use]
    pub fn apply_turn(&mut self, orientation: Orientation, command: TurnCommand) -> Orientation {
        match self {
            Self::FreeRoam => free_roam_turn(orientation, command),
            Self::GravityLocked { horizontal_forward } => {
                gravity_locked_turn(horizontal_forward, orientation, command)
            }
        }
    }

    /// Refreshes remembered state after the orientation changed outside a turn.
    pub fn resync(&mut self, orientation: &Orientation) {
        if let Self::GravityLocked { horizontal_forward } = self {
            if is_horizontal(orientation.facing()) {
                *horizontal_forward = orientation.facing();
            }
        }
    }
}

fn free_roam_turn(orientation: Orientation, command: TurnCommand) -> Orientation {
    let facing = orientation.facing();
    let up = orientation.up();
    let right = unit_or(facing.cross(up), Vec3::X);

    let (next_facing, next_up) = match command {
        TurnCommand::TurnLeft => (-right, up),
        TurnCommand::TurnRight => (right, up),
        TurnCommand::PitchUp => (up, -facing),
        TurnCommand::PitchDown => (-up, facing),
        TurnCommand::RollLeft => (facing, -right),
        TurnCommand::RollRight => (facing, right),
        TurnCommand::SwitchStrategy(_) => return orientation,
    };

    commit(orientation, next_facing, next_up)
}

// A right turn yaws toward `up x facing`, the mirror of free roam's `facing x up`.
fn gravity_locked_turn(
    horizontal_forward: &mut Vec3,
    orientation: Orientation,
    command: TurnCommand,
) -> Orientation {
    let facing = orientation.facing();
    let up = orientation.up();

    match command {
        TurnCommand::TurnLeft | TurnCommand::TurnRight => {
            let toward_right = command == TurnCommand::TurnRight;

            if is_vertical(facing) {
                let reference_right = unit_or(horizontal_forward.cross(WORLD_UP), Vec3::X);
                let next_facing = if toward_right {
                    -reference_right
                } else {
                    reference_right
                };
                return commit(orientation, next_facing, WORLD_UP);
            }

            let right = unit_or(facing.cross(up), Vec3::X);
            let next_facing = if toward_right { -right } else { right };
            if !is_horizontal(next_facing) {
                return commit(orientation, next_facing, up);
            }

            let turned = commit(orientation, next_facing, WORLD_UP);
            if turned != orientation {
                *horizontal_forward = turned.facing();
            }
            turned
        }
        TurnCommand::PitchUp => pitch_toward(*horizontal_forward, orientation, WORLD_UP),
        TurnCommand::PitchDown => pitch_toward(*horizontal_forward, orientation, -WORLD_UP),
        TurnCommand::RollLeft | TurnCommand::RollRight | TurnCommand::SwitchStrategy(_) => {
            orientation
        }
    }
}

fn pitch_toward(horizontal_forward: Vec3, orientation: Orientation, pole: Vec3) -> Orientation {
    if is_vertical(orientation.facing()) {
        return orientation;
    }
    commit(orientation, pole, horizontal_forward)
}

/// Builds the turned orientation unless the proposal is degenerate or a reversal.
fn commit(current: Orientation, facing: Vec3, up: Vec3) -> Orientation {
    if !facing.is_finite() || facing.length() < DEGENERATE_LENGTH {
        return current;
    }
    if !up.is_finite() || up.length() < DEGENERATE_LENGTH {
        return current;
    }

    let facing = facing.normalize();
    if facing.dot(current.facing()) < REVERSAL_THRESHOLD {
        return current;
    }

    Orientation::new(facing, up)
}

fn horizontal_reference(orientation: &Orientation) -> Vec3 {
    if is_horizontal(orientation.facing()) {
        orientation.facing()
    } else if is_horizontal(orientation.up()) {
        orientation.up()
    } else {
        Vec3::Z
    }
}

fn is_vertical(direction: Vec3) -> bool {
    direction.dot(WORLD_UP).abs() >= VERTICAL_THRESHOLD
}

fn is_horizontal(direction: Vec3) -> bool {
    direction.dot(WORLD_UP).abs() < HORIZONTAL_THRESHOLD
}

fn unit_or(vector: Vec3, fallback: Vec3) -> Vec3 {
    if vector.is_finite() && vector.length() >= DEGENERATE_LENGTH {
        vector.normalize()
    } else {
        fallback
    }
}
