//! In-flight notes and the set that owns them.
//!
//! Notes are never removed while the set is being scanned. Judging or
//! expiring a note only changes its state; `NoteSet::compact` drops the
//! finished ones once per tick, keeping insertion order.

use super::playfield::Playfield;
use crate::models::lane::Lane;
use crate::models::stats::Judgement;

pub type NoteId = u64;

/// Travel direction. Playback notes fall toward the judgment line,
/// record-mode echoes rise away from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Still catchable (playback) or still rising (echo).
    Falling,
    /// Caught by a press.
    Judged(Judgement),
    /// Left the playfield.
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub lane: Lane,
    pub position: f32,
    pub direction: Direction,
    pub state: NoteState,
    /// A stray press already counted a Miss against this note; its expiry
    /// is silent. It can still be caught.
    pub charged: bool,
}

impl Note {
    pub fn new(id: NoteId, lane: Lane, position: f32, direction: Direction) -> Self {
        Self {
            id,
            lane,
            position,
            direction,
            state: NoteState::Falling,
            charged: false,
        }
    }

    /// Only falling playback notes can be judged.
    pub fn is_catchable(&self) -> bool {
        self.state == NoteState::Falling && self.direction == Direction::Down
    }

    fn is_finished(&self) -> bool {
        self.state != NoteState::Falling
    }
}

#[derive(Debug, Default)]
pub struct NoteSet {
    notes: Vec<Note>,
    next_id: NoteId,
}

impl NoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, lane: Lane, position: f32, direction: Direction) -> NoteId {
        let id = self.next_id;
        self.next_id += 1;
        self.notes.push(Note::new(id, lane, position, direction));
        id
    }

    /// Moves every note one tick and marks the ones that left the field.
    ///
    /// Returns how many catchable notes expired; each one is a Miss.
    pub fn advance(&mut self, playfield: &Playfield) -> u32 {
        let mut missed = 0;
        for note in &mut self.notes {
            note.position += playfield.step(note.direction);
            if playfield.is_expired(note) {
                if note.is_catchable() && !note.charged {
                    missed += 1;
                }
                note.state = NoteState::Expired;
            }
        }
        missed
    }

    /// Nearest catchable note of `lane` inside the catch band.
    ///
    /// Ties go to the earliest spawned note.
    pub fn find_catch(&self, lane: Lane, playfield: &Playfield) -> Option<(NoteId, f32)> {
        self.nearest_where(lane, playfield, |note| playfield.in_catch_band(note.position))
    }

    /// Marks the lane's nearest uncharged falling note as owing a Miss.
    pub fn charge_nearest(&mut self, lane: Lane, playfield: &Playfield) -> Option<NoteId> {
        let (id, _) = self.nearest_where(lane, playfield, |note| !note.charged)?;
        if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
            note.charged = true;
        }
        Some(id)
    }

    fn nearest_where(
        &self,
        lane: Lane,
        playfield: &Playfield,
        accept: impl Fn(&Note) -> bool,
    ) -> Option<(NoteId, f32)> {
        let mut best: Option<(NoteId, f32)> = None;
        for note in &self.notes {
            if note.lane != lane || !note.is_catchable() || !accept(note) {
                continue;
            }
            let distance = playfield.distance_to_line(note.position);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((note.id, distance));
            }
        }
        best
    }

    pub fn resolve(&mut self, id: NoteId, judgement: Judgement) {
        if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
            note.state = NoteState::Judged(judgement);
        }
    }

    /// Drops expired and caught notes.
    pub fn compact(&mut self) {
        self.notes.retain(|note| !note.is_finished());
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    #[cfg(test)]
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playfield() -> Playfield {
        Playfield::new()
    }

    #[test]
    fn test_adjacent_expiries_are_all_counted() {
        let pf = playfield();
        let mut set = NoteSet::new();
        // Three neighbours cross the expiry edge on the same tick.
        set.spawn(Lane::A, 895.0, Direction::Down);
        set.spawn(Lane::S, 895.0, Direction::Down);
        set.spawn(Lane::K, 895.0, Direction::Down);
        let survivor = set.spawn(Lane::L, 100.0, Direction::Down);

        assert_eq!(set.advance(&pf), 3);
        set.compact();

        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().map(|n| n.id), Some(survivor));
        assert_eq!(set.get(survivor).unwrap().position, 112.0);
    }

    #[test]
    fn test_echo_expiry_is_not_a_miss() {
        let pf = playfield();
        let mut set = NoteSet::new();
        set.spawn(Lane::A, -95.0, Direction::Up);

        assert_eq!(set.advance(&pf), 0);
        set.compact();
        assert!(set.is_empty());
    }

    #[test]
    fn test_find_catch_prefers_nearest_over_first() {
        let pf = playfield();
        let mut set = NoteSet::new();
        set.spawn(Lane::A, 650.0, Direction::Down);
        let near = set.spawn(Lane::A, 725.0, Direction::Down);
        set.spawn(Lane::S, 730.0, Direction::Down);

        assert_eq!(set.find_catch(Lane::A, &pf), Some((near, 5.0)));
    }

    #[test]
    fn test_find_catch_tie_goes_to_earliest() {
        let pf = playfield();
        let mut set = NoteSet::new();
        let first = set.spawn(Lane::K, 710.0, Direction::Down);
        set.spawn(Lane::K, 750.0, Direction::Down);

        assert_eq!(set.find_catch(Lane::K, &pf), Some((first, 20.0)));
    }

    #[test]
    fn test_find_catch_ignores_out_of_band_and_judged() {
        let pf = playfield();
        let mut set = NoteSet::new();
        set.spawn(Lane::A, 600.0, Direction::Down);
        assert_eq!(set.find_catch(Lane::A, &pf), None);

        let close = set.spawn(Lane::A, 730.0, Direction::Down);
        assert_eq!(set.find_catch(Lane::A, &pf), Some((close, 0.0)));
        set.resolve(close, Judgement::Perfect);
        assert_eq!(set.find_catch(Lane::A, &pf), None);
    }

    #[test]
    fn test_charged_note_stays_catchable_and_expires_silently() {
        let pf = playfield();
        let mut set = NoteSet::new();
        let far = set.spawn(Lane::S, 300.0, Direction::Down);
        let other = set.spawn(Lane::S, 100.0, Direction::Down);

        assert_eq!(set.charge_nearest(Lane::S, &pf), Some(far));
        // The next stray press falls on the next uncharged note.
        assert_eq!(set.charge_nearest(Lane::S, &pf), Some(other));
        assert_eq!(set.charge_nearest(Lane::S, &pf), None);

        for _ in 0..32 {
            set.advance(&pf);
        }
        // 684px: inside the band despite the charge.
        assert_eq!(set.find_catch(Lane::S, &pf), Some((far, 46.0)));

        let mut missed = 0;
        while !set.is_empty() {
            missed += set.advance(&pf);
            set.compact();
        }
        assert_eq!(missed, 0);
    }
}
