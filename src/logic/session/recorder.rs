//! Record mode: stamping key presses onto a new track.

use super::{Session, SessionKind};
use crate::models::engine::Direction;
use crate::models::lane::Lane;
use crate::models::track::{TimedKeyEvent, Track};

impl Session {
    /// Appends the press at the current clock offset and spawns an echo note.
    pub(super) fn record_press(&mut self, lane: Lane) {
        let offset_ms = self.clock.elapsed_ms();
        if let SessionKind::Record { track } = &mut self.kind {
            track.push(TimedKeyEvent::new(lane, offset_ms));
        }

        let spawn_at = self.playfield.spawn_position(Direction::Up);
        self.notes.spawn(lane, spawn_at, Direction::Up);
        log::debug!("LOGIC: Recorded lane {} at {}ms", lane, offset_ms);
    }

    /// Track captured so far, `None` outside record mode.
    #[cfg(test)]
    pub fn recorded(&self) -> Option<&Track> {
        match &self.kind {
            SessionKind::Record { track } => Some(track),
            SessionKind::Playback { .. } => None,
        }
    }

    /// Ends recording and hands back the frozen track.
    ///
    /// The session keeps nothing: its track and notes are cleared.
    pub fn finish_recording(&mut self) -> Option<Track> {
        let SessionKind::Record { track } = &mut self.kind else {
            return None;
        };
        let track = std::mem::take(track);
        self.notes.clear();
        self.stop();
        Some(track)
    }
}
