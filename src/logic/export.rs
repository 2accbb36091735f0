//! Hand-off of finished recordings.

use crate::models::track::{Track, TrackError};
use std::path::PathBuf;

/// Receives the frozen track when a recording stops.
pub trait TrackExporter {
    fn export(&mut self, track: &Track) -> Result<(), TrackError>;
}

/// Writes recordings to a fixed file, replacing the previous one.
pub struct FileExporter {
    path: PathBuf,
}

impl FileExporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TrackExporter for FileExporter {
    fn export(&mut self, track: &Track) -> Result<(), TrackError> {
        track.save(&self.path)?;
        log::info!("TRACK: Exported {} events to {:?}", track.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lane::Lane;
    use crate::models::track::TimedKeyEvent;
    use std::fs;

    #[test]
    fn test_file_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keypress_mapping.csv");
        let mut exporter = FileExporter::new(path.clone());

        let mut track = Track::new();
        track.push(TimedKeyEvent::new(Lane::K, 42));
        exporter.export(&track).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "key,time\nk,42\n");
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = FileExporter::new(dir.path().join("missing").join("out.csv"));
        assert!(matches!(
            exporter.export(&Track::new()),
            Err(TrackError::Io { .. })
        ));
    }
}
