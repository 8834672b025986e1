//! Rate limiter that converts elapsed simulated time into discrete moves.

use std::time::Duration;

/// Opens at most once per check when a full move interval has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickGate {
    interval: Option<Duration>,
    elapsed: Duration,
}

impl TickGate {
    /// Creates a gate for the provided rate in moves per second.
    ///
    /// Rates that are not strictly positive and finite produce a gate that
    /// never opens.
    #[must_use]
    pub fn from_speed(moves_per_second: f32) -> Self {
        let interval = if moves_per_second.is_finite() && moves_per_second > 0.0 {
            Duration::try_from_secs_f32(moves_per_second.recip())
                .ok()
                .map(|interval| interval.max(Duration::from_nanos(1)))
        } else {
            None
        };

        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Time between two moves, if the gate can open at all.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Accumulates `dt` and reports whether a move is due.
    ///
    /// Only the remainder modulo the interval is carried over, so a long
    /// frame yields a single move rather than a burst.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < interval {
            return false;
        }

        let remainder = self.elapsed.as_nanos() % interval.as_nanos();
        self.elapsed = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
        true
    }
}
