//! Playback judgement: matching a key press against the live notes.

use super::Session;
use crate::models::lane::Lane;
use crate::models::stats::Judgement;

impl Session {
    /// Judges a press in `lane` against the nearest note in the catch band.
    ///
    /// A press with nothing in the band is a Miss and removes no note. The
    /// Miss is charged to the lane's nearest uncharged falling note, whose
    /// expiry then does not count a second one.
    pub(super) fn judge_press(&mut self, lane: Lane) -> Judgement {
        let judgement = match self.notes.find_catch(lane, &self.playfield) {
            Some((id, distance)) => {
                let judgement = self.playfield.hit_window.judge(distance);
                self.notes.resolve(id, judgement);
                judgement
            }
            None => {
                if let Some(id) = self.notes.charge_nearest(lane, &self.playfield) {
                    log::debug!("LOGIC: Stray press on lane {} charged to note {}", lane, id);
                }
                Judgement::Miss
            }
        };

        self.score.apply(judgement);
        self.status = Some(judgement.label());
        self.dirty = true;

        self.notes.compact();
        self.check_finished();
        judgement
    }
}
