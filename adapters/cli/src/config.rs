//! Session configuration loaded from TOML.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use cubesnake_core::{Command, StrategyKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_HALF_EXTENT: u32 = 3;

/// Complete configuration of a headless session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) arena: ArenaConfig,
    pub(crate) player: PlayerConfig,
    pub(crate) rival: RivalConfig,
    pub(crate) food: FoodConfig,
}

/// Arena bounds and the eating rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaConfig {
    pub(crate) half_extent: u32,
    pub(crate) reverse_on_eat: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extent: 4,
            reverse_on_eat: false,
        }
    }
}

/// Player movement rate, turning convention and demo pilot seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerConfig {
    pub(crate) speed: f32,
    pub(crate) strategy: StrategyKind,
    pub(crate) seed: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            strategy: StrategyKind::GravityLocked,
            seed: 0x7a11,
        }
    }
}

/// Rival movement rate and pilot temperament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RivalConfig {
    pub(crate) speed: f32,
    pub(crate) aggressive: bool,
    pub(crate) hunt_radius: Option<f32>,
    pub(crate) seed: u64,
}

impl Default for RivalConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            aggressive: true,
            hunt_radius: None,
            seed: 0x5eed,
        }
    }
}

/// Food respawn cadence and placement seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FoodConfig {
    pub(crate) respawn_delay_ms: u64,
    pub(crate) seed: u64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            respawn_delay_ms: 0,
            seed: 0xf00d,
        }
    }
}

impl FoodConfig {
    pub(crate) fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }
}

/// Reasons a parsed configuration cannot drive a session.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("arena half extent must be at least 3, got {0}")]
    HalfExtentTooSmall(u32),
    #[error("{actor} speed must be a positive finite number, got {speed}")]
    InvalidSpeed { actor: &'static str, speed: f32 },
    #[error("rival hunt radius must be a positive finite number, got {0}")]
    InvalidHuntRadius(f32),
}

impl GameConfig {
    /// Reads, parses and validates the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.arena.half_extent < MIN_HALF_EXTENT {
            return Err(ConfigError::HalfExtentTooSmall(self.arena.half_extent));
        }
        for (actor, speed) in [("player", self.player.speed), ("rival", self.rival.speed)] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ConfigError::InvalidSpeed { actor, speed });
            }
        }
        if let Some(radius) = self.rival.hunt_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ConfigError::InvalidHuntRadius(radius));
            }
        }
        Ok(())
    }

    /// Command that applies the arena section to the world.
    pub(crate) fn arena_command(&self) -> Command {
        Command::ConfigureArena {
            half_extent: self.arena.half_extent,
            player_speed: self.player.speed,
            rival_speed: self.rival.speed,
            reverse_on_eat: self.arena.reverse_on_eat,
        }
    }
}
