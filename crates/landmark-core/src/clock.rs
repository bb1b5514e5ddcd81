//! Monotonic clock and stopwatch used for phase and session timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// A clock abstraction for deterministic timing in sessions and tests.
///
/// Readings are durations since an arbitrary, fixed origin; only differences
/// between readings are meaningful.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    /// Real monotonic time.
    #[default]
    System,
    /// Time that only moves when [`Clock::advance`] is called. Clones share
    /// the same reading.
    Manual(Arc<AtomicU64>),
}

impl Clock {
    pub fn system() -> Self {
        Self::System
    }

    /// A manual clock starting at zero.
    pub fn manual() -> Self {
        Self::Manual(Arc::new(AtomicU64::new(0)))
    }

    /// Current reading.
    pub fn now(&self) -> Duration {
        match self {
            Clock::System => ORIGIN.get_or_init(Instant::now).elapsed(),
            Clock::Manual(nanos) => Duration::from_nanos(nanos.load(Ordering::SeqCst)),
        }
    }

    /// Advance a manual clock. Has no effect on `Clock::System`.
    pub fn advance(&self, delta: Duration) {
        if let Clock::Manual(nanos) = self {
            let delta = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
            nanos.fetch_add(delta, Ordering::SeqCst);
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Clock::Manual(_))
    }
}

/// Start/restart/read-elapsed timer over a [`Clock`].
#[derive(Debug, Clone)]
pub struct Stopwatch {
    clock: Clock,
    started_at: Duration,
    stopped_at: Option<Duration>,
}

impl Stopwatch {
    /// Start a stopwatch at the clock's current reading.
    pub fn start(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            started_at: clock.now(),
            stopped_at: None,
        }
    }

    /// Reset to zero and keep running.
    pub fn restart(&mut self) {
        self.started_at = self.clock.now();
        self.stopped_at = None;
    }

    /// Freeze the elapsed reading. Stopping twice keeps the first reading.
    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(self.clock.now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(|| self.clock.now());
        end.saturating_sub(self.started_at)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = Clock::manual();
        let other = clock.clone();
        clock.advance(Duration::from_secs(3));
        assert_eq!(other.now(), Duration::from_secs(3));
    }

    #[test]
    fn stopwatch_restart_and_stop() {
        let clock = Clock::manual();
        let mut watch = Stopwatch::start(&clock);
        clock.advance(Duration::from_millis(1500));
        assert_eq!(watch.elapsed_secs(), 1.5);

        watch.restart();
        clock.advance(Duration::from_secs(2));
        watch.stop();
        clock.advance(Duration::from_secs(10));
        assert_eq!(watch.elapsed(), Duration::from_secs(2));
        assert!(!watch.is_running());

        watch.stop();
        assert_eq!(watch.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = Clock::system();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        clock.advance(Duration::from_secs(100));
        assert!(!clock.is_manual());
    }
}
