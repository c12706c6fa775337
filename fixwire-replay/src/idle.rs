/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Backoff strategies for publication claim retries.

use std::time::Duration;

/// Controls how the engine waits between failed claim attempts.
pub trait IdleStrategy {
    /// Called once per failed attempt.
    fn idle(&mut self);

    /// Called after a successful attempt to restart the backoff ladder.
    fn reset(&mut self);
}

/// Never waits. Suitable for tests and single-threaded drivers that manage
/// pacing themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpIdleStrategy;

impl IdleStrategy for NoOpIdleStrategy {
    fn idle(&mut self) {}

    fn reset(&mut self) {}
}

/// Spin, then yield, then park with doubling sleeps up to a cap.
#[derive(Debug, Clone)]
pub struct BackoffIdleStrategy {
    max_spins: u32,
    max_yields: u32,
    min_park: Duration,
    max_park: Duration,
    spins: u32,
    yields: u32,
    park: Duration,
}

impl BackoffIdleStrategy {
    /// Creates a strategy with explicit ladder bounds.
    #[must_use]
    pub fn new(max_spins: u32, max_yields: u32, min_park: Duration, max_park: Duration) -> Self {
        Self {
            max_spins,
            max_yields,
            min_park,
            max_park,
            spins: 0,
            yields: 0,
            park: min_park,
        }
    }
}

impl Default for BackoffIdleStrategy {
    fn default() -> Self {
        Self::new(
            10,
            5,
            Duration::from_micros(1),
            Duration::from_millis(1),
        )
    }
}

impl IdleStrategy for BackoffIdleStrategy {
    fn idle(&mut self) {
        if self.spins < self.max_spins {
            self.spins += 1;
            std::hint::spin_loop();
        } else if self.yields < self.max_yields {
            self.yields += 1;
            std::thread::yield_now();
        } else {
            std::thread::sleep(self.park);
            self.park = (self.park * 2).min(self.max_park);
        }
    }

    fn reset(&mut self) {
        self.spins = 0;
        self.yields = 0;
        self.park = self.min_park;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_ladder_progresses_and_resets() {
        let mut strategy = BackoffIdleStrategy::new(
            2,
            1,
            Duration::from_nanos(1),
            Duration::from_nanos(4),
        );

        for _ in 0..5 {
            strategy.idle();
        }
        assert_eq!(strategy.spins, 2);
        assert_eq!(strategy.yields, 1);
        assert_eq!(strategy.park, Duration::from_nanos(4));

        strategy.reset();
        assert_eq!(strategy.spins, 0);
        assert_eq!(strategy.yields, 0);
        assert_eq!(strategy.park, Duration::from_nanos(1));
    }
}
