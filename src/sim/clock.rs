//! Fixed-interval tick scheduler
//!
//! The host feeds wall-clock time in; the clock answers how many whole ticks
//! are due. There is no variable timestep: every tick is one simulation unit.
//! Stopping or pausing only takes effect between ticks, since the clock is
//! consulted by the level before each one.

use std::time::Duration;

/// Cap on ticks released by a single `advance` call (avoids a catch-up spiral)
pub const MAX_TICKS_PER_ADVANCE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct GameClock {
    period: Duration,
    state: ClockState,
    accumulator: Duration,
}

impl GameClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            state: ClockState::Stopped,
            accumulator: Duration::ZERO,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn start(&mut self) {
        self.state = ClockState::Running;
        self.accumulator = Duration::ZERO;
    }

    /// Suspend without losing the partial period already accumulated
    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
        }
    }

    /// Halt for good; pending time is discarded
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.accumulator = Duration::ZERO;
    }

    /// Feed elapsed wall time and return how many ticks are now due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.is_running() {
            return 0;
        }
        self.accumulator += elapsed;
        let mut due = 0;
        while self.accumulator >= self.period && due < MAX_TICKS_PER_ADVANCE {
            self.accumulator -= self.period;
            due += 1;
        }
        if due == MAX_TICKS_PER_ADVANCE && self.accumulator >= self.period {
            log::warn!(
                "Dropping {:?} of simulation backlog",
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_clock_releases_nothing() {
        let mut clock = GameClock::from_millis(50);
        assert_eq!(clock.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_accumulates_partial_periods() {
        let mut clock = GameClock::from_millis(50);
        clock.start();
        assert_eq!(clock.advance(Duration::from_millis(30)), 0);
        assert_eq!(clock.advance(Duration::from_millis(30)), 1);
        assert_eq!(clock.advance(Duration::from_millis(40)), 1);
        assert_eq!(clock.advance(Duration::from_millis(150)), 3);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut clock = GameClock::from_millis(50);
        clock.start();
        clock.advance(Duration::from_millis(20));
        clock.pause();
        assert_eq!(clock.state(), ClockState::Paused);
        assert_eq!(clock.advance(Duration::from_secs(10)), 0);
        clock.resume();
        assert_eq!(clock.advance(Duration::from_millis(30)), 1);
    }

    #[test]
    fn test_stop_discards_backlog() {
        let mut clock = GameClock::from_millis(50);
        clock.start();
        clock.advance(Duration::from_millis(40));
        clock.stop();
        clock.resume();
        assert!(!clock.is_running());
        clock.start();
        assert_eq!(clock.advance(Duration::from_millis(40)), 0);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut clock = GameClock::from_millis(50);
        clock.start();
        assert_eq!(clock.advance(Duration::from_secs(5)), MAX_TICKS_PER_ADVANCE);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }
}
