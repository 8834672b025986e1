#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for placing food.

use std::time::Duration;

use cubesnake_core::{Command, Event, GridCell};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const RANDOM_ATTEMPTS: usize = 32;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    respawn_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided respawn delay and seed.
    #[must_use]
    pub const fn new(respawn_delay: Duration, rng_seed: u64) -> Self {
        Self {
            respawn_delay,
            rng_seed,
        }
    }
}

/// Pure system that keeps exactly one food item in a running session.
#[derive(Debug)]
pub struct Spawning {
    respawn_delay: Duration,
    accumulator: Duration,
    active: bool,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            respawn_delay: config.respawn_delay,
            accumulator: Duration::ZERO,
            active: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit food placement commands.
    ///
    /// Food is drawn from the cells strictly inside the arena walls and never
    /// lands on an occupied cell.
    pub fn handle(
        &mut self,
        events: &[Event],
        food: Option<GridCell>,
        half_extent: u32,
        occupied: &[GridCell],
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::SessionStarted { .. } => {
                    self.active = true;
                    self.accumulator = Duration::ZERO;
                }
                Event::SessionEnded { .. } => self.active = false,
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if !self.active || food.is_some() {
            self.accumulator = Duration::ZERO;
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator < self.respawn_delay {
            return;
        }

        if let Some(cell) = self.select_cell(half_extent, occupied) {
            self.accumulator = Duration::ZERO;
            out.push(Command::PlaceFood { cell });
        }
    }

    fn select_cell(&mut self, half_extent: u32, occupied: &[GridCell]) -> Option<GridCell> {
        let inner = i32::try_from(half_extent.saturating_sub(1)).unwrap_or(i32::MAX);

        for _ in 0..RANDOM_ATTEMPTS {
            let cell = GridCell::new(
                self.rng.gen_range(-inner..=inner),
                self.rng.gen_range(-inner..=inner),
                self.rng.gen_range(-inner..=inner),
            );
            if !occupied.contains(&cell) {
                return Some(cell);
            }
        }

        let free: Vec<GridCell> = (-inner..=inner)
            .flat_map(|x| (-inner..=inner).flat_map(move |y| (-inner..=inner).map(move |z| (x, y, z))))
            .map(|(x, y, z)| GridCell::new(x, y, z))
            .filter(|cell| !occupied.contains(cell))
            .collect();
        if free.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..free.len());
        Some(free[index])
    }
}
