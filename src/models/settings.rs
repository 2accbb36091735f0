//! User settings loaded from `settings.toml`.

use crate::input::keycode::parse_keycode;
use crate::models::engine::Playfield;
use crate::models::lane::{LaneBindings, NUM_LANES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_PATH: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A bundled song: its audio file and the track played over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongEntry {
    pub name: String,
    pub audio: PathBuf,
    pub track: PathBuf,
}

impl SongEntry {
    fn bundled(name: &str, track: &str) -> Self {
        Self {
            name: name.to_string(),
            audio: PathBuf::from("assets/night.mp3"),
            track: PathBuf::from("assets").join(track),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Physical key names for lanes a, s, k and l.
    pub keybinds: Vec<String>,
    /// Logic ticks per second. Notes move a fixed distance per tick.
    pub tick_rate: u32,
    pub master_volume: f32,
    /// Where a finished recording is written.
    pub export_path: PathBuf,
    pub playfield: Playfield,
    pub songs: Vec<SongEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            keybinds: ["KeyA", "KeyS", "KeyK", "KeyL"]
                .into_iter()
                .map(String::from)
                .collect(),
            tick_rate: 60,
            master_volume: 0.5,
            export_path: PathBuf::from("keypress_mapping.csv"),
            playfield: Playfield::new(),
            songs: vec![
                SongEntry::bundled("Yeee", "yeee.csv"),
                SongEntry::bundled("Super I", "super1.csv"),
                SongEntry::bundled("Super II", "super2.csv"),
                SongEntry::bundled("Super", "super.csv"),
                SongEntry::bundled("Hard", "hard.csv"),
                SongEntry::bundled("Night", "night.csv"),
            ],
        }
    }
}

impl Settings {
    /// Loads settings, falling back to defaults on any failure.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("SETTINGS: {:?} not found, using defaults", path);
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("SETTINGS: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves `keybinds` into a lane table.
    ///
    /// Unknown names, a wrong count or duplicate keys fall back to the
    /// default bindings.
    pub fn lane_bindings(&self) -> LaneBindings {
        let parsed: Option<Vec<_>> = self.keybinds.iter().map(|name| parse_keycode(name)).collect();

        let Some(keys) = parsed.and_then(|keys| <[_; NUM_LANES]>::try_from(keys).ok()) else {
            log::warn!(
                "SETTINGS: Invalid keybinds {:?}, using defaults",
                self.keybinds
            );
            return LaneBindings::default();
        };

        LaneBindings::new(keys).unwrap_or_else(|e| {
            log::warn!("SETTINGS: {}, using default keybinds", e);
            LaneBindings::default()
        })
    }

    /// Duration of one logic tick, in seconds.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }
}
