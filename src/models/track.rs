//! Recorded key-timing tracks and their text format.
//!
//! A track file is UTF-8 text with a `key,time` header followed by one
//! `<lane symbol>,<offset in ms>` record per line. Either LF or CRLF line
//! endings are accepted; blank lines are ignored.

use crate::models::lane::Lane;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header line written at the top of every track file.
pub const TRACK_HEADER: &str = "key,time";

/// A single key press, relative to session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedKeyEvent {
    pub lane: Lane,
    pub offset_ms: u64,
}

impl TimedKeyEvent {
    pub fn new(lane: Lane, offset_ms: u64) -> Self {
        Self { lane, offset_ms }
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("line {line}: missing ',' separator")]
    MissingSeparator { line: usize },

    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: invalid offset {value:?}")]
    InvalidOffset { line: usize, value: String },

    #[error("line {line}: offset {offset_ms}ms comes before the previous event at {previous_ms}ms")]
    OutOfOrder {
        line: usize,
        offset_ms: u64,
        previous_ms: u64,
    },

    #[error("track file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Events sorted ascending by offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    events: Vec<TimedKeyEvent>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Offsets must not go backwards.
    pub fn push(&mut self, event: TimedKeyEvent) {
        debug_assert!(
            self.events
                .last()
                .is_none_or(|last| last.offset_ms <= event.offset_ms),
            "track offsets must be non-decreasing"
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[TimedKeyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Renders the track in file format, header included.
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(TRACK_HEADER.len() + 1 + self.events.len() * 8);
        out.push_str(TRACK_HEADER);
        out.push('\n');
        for event in &self.events {
            out.push(event.lane.symbol());
            out.push(',');
            out.push_str(&event.offset_ms.to_string());
            out.push('\n');
        }
        out
    }

    /// Parses a whole track. Any malformed record rejects the entire text.
    pub fn parse(text: &str) -> Result<Self, TrackError> {
        let mut track = Track::new();

        // Line numbers are 1-based; the header is line 1 and is skipped.
        for (idx, raw) in text.lines().enumerate().skip(1) {
            let line = idx + 1;
            let record = raw.trim();
            if record.is_empty() {
                continue;
            }

            let (key, offset) = record
                .split_once(',')
                .ok_or(TrackError::MissingSeparator { line })?;

            let key = key.trim();
            let mut chars = key.chars();
            let lane = match (chars.next(), chars.next()) {
                (Some(symbol), None) => Lane::from_symbol(symbol),
                _ => None,
            }
            .ok_or_else(|| TrackError::UnknownKey {
                line,
                key: key.to_string(),
            })?;

            let offset = offset.trim();
            let offset_ms = offset
                .parse::<u64>()
                .map_err(|_| TrackError::InvalidOffset {
                    line,
                    value: offset.to_string(),
                })?;

            if let Some(previous) = track.events.last()
                && previous.offset_ms > offset_ms
            {
                return Err(TrackError::OutOfOrder {
                    line,
                    offset_ms,
                    previous_ms: previous.offset_ms,
                });
            }

            track.events.push(TimedKeyEvent::new(lane, offset_ms));
        }

        Ok(track)
    }

    pub fn load(path: &Path) -> Result<Self, TrackError> {
        let text = fs::read_to_string(path).map_err(|source| TrackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let track = Self::parse(&text)?;
        log::info!("TRACK: Loaded {} events from {:?}", track.len(), path);
        Ok(track)
    }

    pub fn save(&self, path: &Path) -> Result<(), TrackError> {
        fs::write(path, self.serialize()).map_err(|source| TrackError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
