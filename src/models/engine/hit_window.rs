//! Distance thresholds used to classify a key press.

use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};

/// Judgement thresholds, in playfield pixels.
///
/// `perfect` bounds the distance to the judgment line. `good` is the depth
/// of the catch band measured up from the bottom edge of the playfield;
/// a caught note outside the perfect range is a Good.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitWindow {
    pub perfect: f32,
    pub good: f32,
}

impl HitWindow {
    pub fn new() -> Self {
        Self {
            perfect: 30.0,
            good: 150.0,
        }
    }

    /// Classifies a caught note by its distance to the line.
    pub fn judge(&self, distance: f32) -> Judgement {
        if distance.abs() < self.perfect {
            Judgement::Perfect
        } else {
            Judgement::Good
        }
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::new()
    }
}
