//! Scoreboard snapshots for the display.
//!
//! Snapshots are immutable copies of the session's score and lane state,
//! pushed to a `DisplaySink` after every judgement or session change.

use crate::models::lane::{Lane, NUM_LANES};
use crate::models::stats::Score;
use crossbeam_channel::{Sender, TrySendError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Record,
    Playback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: Score,
    /// Active session, `None` when idle.
    pub mode: Option<SessionMode>,
    /// Transient status such as `Perfect!` or `Recording`.
    pub status: Option<String>,
    pub lanes_held: [bool; NUM_LANES],
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.score;
        write!(
            f,
            "Score {} | Combo {} | Perfect {} Good {} Miss {} | ",
            s.points, s.combo, s.perfect, s.good, s.miss
        )?;
        for lane in Lane::ALL {
            if self.lanes_held[lane.index()] {
                write!(f, "{}", lane.symbol().to_ascii_uppercase())?;
            } else {
                f.write_str("_")?;
            }
        }
        if let Some(status) = &self.status {
            write!(f, " | {}", status)?;
        }
        Ok(())
    }
}

/// Receives scoreboard refreshes. Rendering is entirely its business.
pub trait DisplaySink {
    fn refresh(&mut self, board: &Scoreboard);
}

impl DisplaySink for Sender<Scoreboard> {
    fn refresh(&mut self, board: &Scoreboard) {
        match self.try_send(board.clone()) {
            Ok(()) => {}
            // The display only cares about the latest board.
            Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("LOGIC: Display channel closed");
            }
        }
    }
}
