//! Spawns track events as the session clock reaches them.

use crate::models::track::{TimedKeyEvent, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// Every event has been handed out.
    Drained,
    Stopped,
}

/// Walks a track with a cursor; the track itself is never modified.
#[derive(Debug)]
pub struct Scheduler {
    track: Track,
    cursor: usize,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            cursor: 0,
            state: SchedulerState::Idle,
        }
    }

    pub fn start(&mut self) {
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Running;
        }
    }

    /// Returns every event due at `elapsed_ms`, in track order.
    ///
    /// All due events come out at once so slow frames never build a backlog.
    pub fn poll(&mut self, elapsed_ms: u64) -> &[TimedKeyEvent] {
        if self.state != SchedulerState::Running {
            return &[];
        }

        let events = self.track.events();
        let from = self.cursor;
        while self.cursor < events.len() && events[self.cursor].offset_ms <= elapsed_ms {
            self.cursor += 1;
        }
        if self.cursor == events.len() {
            self.state = SchedulerState::Drained;
        }
        &events[from..self.cursor]
    }

    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
    }

    #[cfg(test)]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_drained(&self) -> bool {
        matches!(self.state, SchedulerState::Drained | SchedulerState::Stopped)
    }

    /// Events not spawned yet.
    pub fn remaining(&self) -> usize {
        self.track.len() - self.cursor
    }
}
