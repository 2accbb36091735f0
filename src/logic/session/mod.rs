//! A single record or playback session.
//!
//! The `Session` owns everything that lives for one run: its clock, the
//! scheduler walking the track, the live notes and the score. Nothing
//! survives from one session to the next.

mod judge;
mod recorder;

use crate::logic::clock::SessionClock;
use crate::logic::scheduler::Scheduler;
use crate::models::engine::{Direction, NoteSet, Playfield};
use crate::models::lane::{Lane, NUM_LANES};
use crate::models::stats::{Judgement, Score};
use crate::models::track::Track;
use crate::shared::snapshot::{Scoreboard, SessionMode};
use std::time::Duration;

#[derive(Debug)]
enum SessionKind {
    Record { track: Track },
    Playback { scheduler: Scheduler },
}

#[derive(Debug)]
pub struct Session {
    generation: u64,
    kind: SessionKind,
    clock: SessionClock,
    playfield: Playfield,
    notes: NoteSet,
    score: Score,
    lanes_held: [bool; NUM_LANES],
    status: Option<&'static str>,
    active: bool,
    /// Set whenever the scoreboard changed since the last refresh.
    dirty: bool,
}

impl Session {
    /// Starts playing `track` from time zero.
    pub fn playback(generation: u64, track: Track, playfield: Playfield) -> Self {
        let mut scheduler = Scheduler::new(track);
        scheduler.start();
        Self::with_kind(generation, SessionKind::Playback { scheduler }, playfield, "Playback")
    }

    /// Starts capturing key presses from time zero.
    pub fn record(generation: u64, playfield: Playfield) -> Self {
        let kind = SessionKind::Record {
            track: Track::new(),
        };
        Self::with_kind(generation, kind, playfield, "Recording")
    }

    fn with_kind(
        generation: u64,
        kind: SessionKind,
        playfield: Playfield,
        status: &'static str,
    ) -> Self {
        Self {
            generation,
            kind,
            clock: SessionClock::start(),
            playfield,
            notes: NoteSet::new(),
            score: Score::new(),
            lanes_held: [false; NUM_LANES],
            status: Some(status),
            active: true,
            dirty: true,
        }
    }

    /// Runs one tick: clock, due spawns, note motion, expiry misses.
    ///
    /// Notes spawned by this tick move in this same tick. Returns whether
    /// the session is still active.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.active {
            return false;
        }

        self.clock.advance(dt);

        if let SessionKind::Playback { scheduler } = &mut self.kind {
            let spawn_at = self.playfield.spawn_position(Direction::Down);
            for event in scheduler.poll(self.clock.elapsed_ms()) {
                self.notes.spawn(event.lane, spawn_at, Direction::Down);
            }
        }

        let missed = self.notes.advance(&self.playfield);
        for _ in 0..missed {
            self.score.apply(Judgement::Miss);
        }
        if missed > 0 {
            self.status = Some(Judgement::Miss.label());
            self.dirty = true;
        }
        self.notes.compact();

        self.check_finished();
        self.active
    }

    /// Stops a playback whose track is exhausted and whose notes are gone.
    fn check_finished(&mut self) {
        if let SessionKind::Playback { scheduler } = &mut self.kind
            && scheduler.is_drained()
            && self.notes.is_empty()
        {
            scheduler.stop();
            self.active = false;
            self.status = Some("Stopped");
            self.dirty = true;
            log::info!(
                "LOGIC: Playback #{} finished after {}ms (score {})",
                self.generation,
                self.clock.elapsed_ms(),
                self.score.points
            );
        }
    }

    /// Handles a lane key-down. Returns the judgement in playback mode.
    pub fn key_down(&mut self, lane: Lane) -> Option<Judgement> {
        if !self.active {
            return None;
        }
        self.lanes_held[lane.index()] = true;
        self.dirty = true;

        match self.mode() {
            SessionMode::Record => {
                self.record_press(lane);
                None
            }
            SessionMode::Playback => Some(self.judge_press(lane)),
        }
    }

    pub fn key_up(&mut self, lane: Lane) {
        if self.lanes_held[lane.index()] {
            self.lanes_held[lane.index()] = false;
            self.dirty = true;
        }
    }

    pub fn release_all(&mut self) {
        if self.lanes_held.iter().any(|&held| held) {
            self.lanes_held = [false; NUM_LANES];
            self.dirty = true;
        }
    }

    /// Ends the session without finishing it.
    pub fn stop(&mut self) {
        if let SessionKind::Playback { scheduler } = &mut self.kind {
            if self.active {
                log::info!(
                    "LOGIC: Playback #{} stopped with {} events unplayed",
                    self.generation,
                    scheduler.remaining()
                );
            }
            scheduler.stop();
        }
        if self.active {
            self.active = false;
            self.status = Some("Stopped");
            self.dirty = true;
        }
    }

    pub fn mode(&self) -> SessionMode {
        match self.kind {
            SessionKind::Record { .. } => SessionMode::Record,
            SessionKind::Playback { .. } => SessionMode::Playback,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    #[cfg(test)]
    pub fn notes(&self) -> &NoteSet {
        &self.notes
    }

    #[cfg(test)]
    pub fn lanes_held(&self) -> [bool; NUM_LANES] {
        self.lanes_held
    }

    /// `None` for record sessions.
    #[cfg(test)]
    pub fn scheduler_state(&self) -> Option<crate::logic::scheduler::SchedulerState> {
        match &self.kind {
            SessionKind::Playback { scheduler } => Some(scheduler.state()),
            SessionKind::Record { .. } => None,
        }
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard {
            score: self.score,
            mode: self.active.then(|| self.mode()),
            status: self.status.map(String::from),
            lanes_held: self.lanes_held,
        }
    }

    /// Returns a fresh scoreboard if anything changed since the last call.
    pub fn take_refresh(&mut self) -> Option<Scoreboard> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.scoreboard())
    }
}
