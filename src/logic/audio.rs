//! Audio service used by the session controller.
//!
//! Audio is best-effort: the track clock never waits for it, and a song
//! that fails to load only costs the music, not the session.

use crate::system::bus::{AudioCommand, SystemBus};
use crossbeam_channel::Sender;
use std::path::Path;

/// Plays a single audio stream alongside a session.
pub trait AudioService {
    /// Loads a song; playback waits for `start`.
    fn load(&mut self, source: &Path);
    /// Starts the loaded song from the beginning.
    fn start(&mut self);
    fn stop(&mut self);
}

/// Sends commands to the dedicated audio thread.
///
/// None of these calls block; decoding and device errors are reported by
/// the audio thread itself.
pub struct AudioManager {
    cmd_tx: Sender<AudioCommand>,
}

impl AudioManager {
    pub fn new(bus: &SystemBus) -> Self {
        Self {
            cmd_tx: bus.audio_cmd_tx.clone(),
        }
    }

    /// Sets the master volume (0.0 to 1.0).
    pub fn set_volume(&mut self, volume: f32) {
        self.send(AudioCommand::SetVolume {
            volume: volume.clamp(0.0, 1.0),
        });
    }

    fn send(&self, cmd: AudioCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!("AUDIO: Audio thread is gone, command dropped");
        }
    }
}

impl AudioService for AudioManager {
    fn load(&mut self, source: &Path) {
        self.send(AudioCommand::Load {
            path: source.to_path_buf(),
        });
    }

    fn start(&mut self) {
        self.send(AudioCommand::Play);
    }

    fn stop(&mut self) {
        self.send(AudioCommand::Stop);
    }
}
