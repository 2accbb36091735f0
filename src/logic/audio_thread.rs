//! Dedicated audio thread that handles all audio operations.
//!
//! This keeps file decoding off the logic thread. Failures are logged and
//! never retried.

use crate::system::bus::{AudioCommand, SystemBus};
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, PlayError, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioLoadError {
    #[error("no audio output device")]
    NoDevice,
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecoderError,
    },
    #[error("cannot create sink: {0}")]
    Sink(#[from] PlayError),
}

struct AudioWorker {
    _stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    volume: f32,
}

impl AudioWorker {
    fn new() -> Self {
        match OutputStream::try_default() {
            Ok((stream, stream_handle)) => {
                log::info!("AUDIO: Device found, audio enabled");
                Self {
                    _stream: Some(stream),
                    stream_handle: Some(stream_handle),
                    sink: None,
                    volume: 1.0,
                }
            }
            Err(e) => {
                log::warn!(
                    "AUDIO: No audio device found ({}), running in silent mode",
                    e
                );
                Self {
                    _stream: None,
                    stream_handle: None,
                    sink: None,
                    volume: 1.0,
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Load { path } => {
                self.stop();
                match self.load(&path) {
                    Ok(sink) => {
                        log::info!("AUDIO: Loaded {:?}", path);
                        self.sink = Some(sink);
                    }
                    Err(e) => log::error!("AUDIO: {}", e),
                }
            }
            AudioCommand::Play => {
                if let Some(sink) = &self.sink {
                    sink.play();
                }
            }
            AudioCommand::Stop => self.stop(),
            AudioCommand::SetVolume { volume } => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    /// Decodes `path` into a paused sink.
    fn load(&self, path: &Path) -> Result<Sink, AudioLoadError> {
        let stream_handle = self.stream_handle.as_ref().ok_or(AudioLoadError::NoDevice)?;

        let file = File::open(path).map_err(|source| AudioLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|source| {
            AudioLoadError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let sink = Sink::try_new(stream_handle)?;
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        Ok(sink)
    }
}

/// Starts the dedicated audio thread.
pub fn start_audio_thread(bus: SystemBus) {
    thread::Builder::new()
        .name("Audio Thread".to_string())
        .spawn(move || {
            log::info!("AUDIO: Thread started");

            let mut worker = AudioWorker::new();

            while let Ok(cmd) = bus.audio_cmd_rx.recv() {
                worker.handle_command(cmd);
            }

            log::info!("AUDIO: Thread stopped");
        })
        .expect("Failed to spawn Audio thread");
}
