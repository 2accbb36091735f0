//! Playfield geometry and note motion.

use super::hit_window::HitWindow;
use super::note::{Direction, Note};
use serde::{Deserialize, Serialize};

/// Vertical layout of the playfield, in pixels from the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub height: f32,
    pub judgment_line: f32,
    pub note_height: f32,
    /// Distance a note travels each tick.
    pub note_speed: f32,
    pub hit_window: HitWindow,
}

impl Playfield {
    pub fn new() -> Self {
        Self {
            height: 800.0,
            judgment_line: 730.0,
            note_height: 100.0,
            note_speed: 12.0,
            hit_window: HitWindow::new(),
        }
    }

    pub fn distance_to_line(&self, position: f32) -> f32 {
        (position - self.judgment_line).abs()
    }

    /// Top edge of the catch band. Notes below it stay catchable until
    /// they expire.
    pub fn catch_edge(&self) -> f32 {
        self.height - self.hit_window.good
    }

    /// Whether a falling note at `position` may be caught.
    pub fn in_catch_band(&self, position: f32) -> bool {
        position > self.catch_edge()
    }

    /// How far past the line a falling note may go before it is dropped.
    pub fn miss_distance(&self) -> f32 {
        self.height + self.note_height - self.judgment_line
    }

    pub fn spawn_position(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Down => 0.0,
            Direction::Up => self.judgment_line,
        }
    }

    pub fn step(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Down => self.note_speed,
            Direction::Up => -self.note_speed,
        }
    }

    /// A note is expired once it has left the visible travel range.
    pub fn is_expired(&self, note: &Note) -> bool {
        match note.direction {
            Direction::Down => note.position - self.judgment_line > self.miss_distance(),
            Direction::Up => note.position < -self.note_height,
        }
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lane::Lane;

    #[test]
    fn test_default_geometry() {
        let playfield = Playfield::new();
        assert_eq!(playfield.miss_distance(), 170.0);
        assert_eq!(playfield.distance_to_line(720.0), 10.0);
        assert_eq!(playfield.distance_to_line(740.0), 10.0);
    }

    #[test]
    fn test_catch_band_is_asymmetric() {
        let playfield = Playfield::new();
        assert_eq!(playfield.catch_edge(), 650.0);
        // 130px before the line is too early.
        assert!(!playfield.in_catch_band(600.0));
        assert!(!playfield.in_catch_band(650.0));
        assert!(playfield.in_catch_band(650.5));
        // 158px past the line is still catchable.
        assert!(playfield.in_catch_band(888.0));
    }

    #[test]
    fn test_expiry_edges() {
        let playfield = Playfield::new();
        let mut note = Note::new(0, Lane::A, 900.0, Direction::Down);
        assert!(!playfield.is_expired(&note));
        note.position = 900.5;
        assert!(playfield.is_expired(&note));

        let mut echo = Note::new(1, Lane::A, -100.0, Direction::Up);
        assert!(!playfield.is_expired(&echo));
        echo.position = -101.0;
        assert!(playfield.is_expired(&echo));
    }
}
