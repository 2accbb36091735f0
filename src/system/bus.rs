//! Shared channel infrastructure between system threads.
//!
//! The `SystemBus` bundles every channel the window, input, logic and
//! audio threads use to talk to each other.

use crate::input::events::{GameAction, RawInputEvent};
use crate::shared::snapshot::Scoreboard;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::PathBuf;

/// System-level events sent from the window to the logic thread.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Window lost focus; held lanes are released.
    FocusLost,
    /// Application shutdown requested.
    Quit,
}

/// Commands sent to the dedicated audio thread.
#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// Decode a file and keep it paused at the start.
    Load { path: PathBuf },
    /// Start playback of the loaded stream.
    Play,
    /// Stop and drop the current stream.
    Stop,
    /// Change volume level.
    SetVolume { volume: f32 },
}

/// Requests the logic thread makes of the window thread.
#[derive(Debug, Clone)]
pub enum HostRequest {
    /// Show a file picker and answer with `GameAction::LoadTrack`.
    PickTrack,
}

#[derive(Clone)]
pub struct SystemBus {
    /// Window -> Input: raw keyboard events.
    pub raw_input_tx: Sender<RawInputEvent>,
    pub raw_input_rx: Receiver<RawInputEvent>,

    /// Input -> Logic: lane presses and session commands.
    pub action_tx: Sender<GameAction>,
    pub action_rx: Receiver<GameAction>,

    /// Window -> Logic: system events.
    pub sys_tx: Sender<SystemEvent>,
    pub sys_rx: Receiver<SystemEvent>,

    /// Logic -> Audio: audio commands.
    pub audio_cmd_tx: Sender<AudioCommand>,
    pub audio_cmd_rx: Receiver<AudioCommand>,

    /// Logic -> Window: scoreboard refreshes.
    pub display_tx: Sender<Scoreboard>,
    pub display_rx: Receiver<Scoreboard>,

    /// Logic -> Window: host requests.
    pub host_tx: Sender<HostRequest>,
    pub host_rx: Receiver<HostRequest>,
}

impl SystemBus {
    pub fn new() -> Self {
        let (raw_input_tx, raw_input_rx) = unbounded();
        let (action_tx, action_rx) = unbounded();
        let (sys_tx, sys_rx) = unbounded();
        let (audio_cmd_tx, audio_cmd_rx) = unbounded();

        // The window only shows the latest board; a few in flight is plenty.
        let (display_tx, display_rx) = bounded(8);
        let (host_tx, host_rx) = unbounded();

        Self {
            raw_input_tx,
            raw_input_rx,
            action_tx,
            action_rx,
            sys_tx,
            sys_rx,
            audio_cmd_tx,
            audio_cmd_rx,
            display_tx,
            display_rx,
            host_tx,
            host_rx,
        }
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}
