//! Raw key events from the window and the actions derived from them.

use crate::models::lane::Lane;
use std::path::PathBuf;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputEvent {
    pub keycode: KeyCode,
    pub state: ElementState,
}

impl RawInputEvent {
    #[cfg(test)]
    pub fn pressed(keycode: KeyCode) -> Self {
        Self {
            keycode,
            state: ElementState::Pressed,
        }
    }

    #[cfg(test)]
    pub fn released(keycode: KeyCode) -> Self {
        Self {
            keycode,
            state: ElementState::Released,
        }
    }

    /// Physical, non-repeated keyboard input only.
    pub fn from_winit(event: &WindowEvent) -> Option<Self> {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(keycode),
                    state,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            Some(Self {
                keycode: *keycode,
                state: *state,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    // Gameplay
    KeyDown { lane: Lane },
    KeyUp { lane: Lane },

    // Session control
    ToggleRecording,
    /// Stops playback, or asks the host to pick a track file.
    TogglePlayback,
    LoadTrack { path: PathBuf },
    RunSong(usize),
    Stop,
}
