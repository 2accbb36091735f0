//! Judgement types and the cumulative score of a session.

/// Outcome of a judged note or key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Judgement {
    /// Pressed within the perfect threshold.
    Perfect,
    /// Pressed inside the catch band but outside the perfect threshold.
    Good,
    /// Pressed with nothing to catch, or the note fell past the line.
    Miss,
}

impl Judgement {
    pub fn points(self) -> u32 {
        match self {
            Judgement::Perfect => 100,
            Judgement::Good => 50,
            Judgement::Miss => 0,
        }
    }

    /// Status text flashed after the judgement.
    pub fn label(self) -> &'static str {
        match self {
            Judgement::Perfect => "Perfect!",
            Judgement::Good => "Good!",
            Judgement::Miss => "Miss!",
        }
    }
}

/// Cumulative score and combo, reset at every session start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
    pub points: u32,
    pub combo: u32,
    pub max_combo: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Miss => {
                self.miss += 1;
                self.combo = 0;
            }
            Judgement::Perfect | Judgement::Good => {
                if judgement == Judgement::Perfect {
                    self.perfect += 1;
                } else {
                    self.good += 1;
                }
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
                self.points += judgement.points();
            }
        }
    }

    /// Number of judgements recorded so far.
    pub fn judged(&self) -> u32 {
        self.perfect + self.good + self.miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_hits_and_miss() {
        let mut score = Score::new();
        score.apply(Judgement::Perfect);
        score.apply(Judgement::Good);
        score.apply(Judgement::Perfect);

        assert_eq!(score.points, 250);
        assert_eq!(score.combo, 3);
        assert_eq!((score.perfect, score.good, score.miss), (2, 1, 0));

        score.apply(Judgement::Miss);
        assert_eq!(score.combo, 0);
        assert_eq!(score.max_combo, 3);
        assert_eq!(score.points, 250);
        assert_eq!(score.judged(), 4);

        score.apply(Judgement::Good);
        assert_eq!(score.combo, 1);
        assert_eq!(score.max_combo, 3);
    }
}
