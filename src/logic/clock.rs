//! Session clock.
//!
//! Every session owns a fresh clock that starts at zero. It only moves
//! forward, driven by the tick deltas the host passes to the session.

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionClock {
    elapsed: Duration,
}

impl SessionClock {
    pub fn start() -> Self {
        Self::default()
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time truncated to whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_truncate() {
        let mut clock = SessionClock::start();
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.advance(Duration::from_micros(16_667));
        clock.advance(Duration::from_micros(16_667));
        assert_eq!(clock.elapsed(), Duration::from_micros(33_334));
        assert_eq!(clock.elapsed_ms(), 33);
    }
}
