use super::events::{GameAction, RawInputEvent};
use super::keycode::keycode_name;
use crate::models::lane::{Lane, LaneBindings};
use crate::models::settings::Settings;
use std::collections::HashSet;
use std::path::PathBuf;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Number keys starting bundled songs, in song order. The first four
/// double as Ctrl+N rebind shortcuts for lane N.
const SONG_KEYS: [KeyCode; 6] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
];

/// Translates raw key events into game actions.
///
/// Lane keys come from a `LaneBindings` table; session controls are fixed.
/// Ctrl+1..4 arms a rebind and the next key press becomes that lane's key.
pub struct InputManager {
    bindings: LaneBindings,
    /// Settings file updated after every successful rebind.
    persist: Option<(Settings, PathBuf)>,
    ctrl_left: bool,
    ctrl_right: bool,
    /// Keys whose press was consumed; their release is swallowed too.
    suppressed_keys: HashSet<KeyCode>,
    pending_rebind: Option<Lane>,
}

impl InputManager {
    pub fn new(bindings: LaneBindings) -> Self {
        Self {
            bindings,
            persist: None,
            ctrl_left: false,
            ctrl_right: false,
            suppressed_keys: HashSet::new(),
            pending_rebind: None,
        }
    }

    /// Writes rebinds back into `settings` and saves them to `path`.
    pub fn persist_to(mut self, settings: Settings, path: PathBuf) -> Self {
        self.persist = Some((settings, path));
        self
    }

    #[cfg(test)]
    pub fn bindings(&self) -> &LaneBindings {
        &self.bindings
    }

    #[cfg(test)]
    pub fn pending_rebind(&self) -> Option<Lane> {
        self.pending_rebind
    }

    pub fn process(&mut self, event: RawInputEvent) -> Option<GameAction> {
        let pressed = event.state == ElementState::Pressed;

        match event.keycode {
            KeyCode::ControlLeft => {
                self.ctrl_left = pressed;
                return None;
            }
            KeyCode::ControlRight => {
                self.ctrl_right = pressed;
                return None;
            }
            _ => {}
        }

        if self.suppressed_keys.contains(&event.keycode) {
            if !pressed {
                self.suppressed_keys.remove(&event.keycode);
            }
            return None;
        }

        if pressed && (self.ctrl_left || self.ctrl_right) {
            if let Some(lane) = SONG_KEYS[..4]
                .iter()
                .position(|&key| key == event.keycode)
                .and_then(Lane::from_index)
            {
                self.suppressed_keys.insert(event.keycode);
                self.pending_rebind = Some(lane);
                log::info!("INPUT: Press a key for lane {}", lane);
                return None;
            }
        }

        if pressed && let Some(lane) = self.pending_rebind.take() {
            self.suppressed_keys.insert(event.keycode);
            if event.keycode == KeyCode::Escape {
                log::info!("INPUT: Rebind of lane {} cancelled", lane);
                return None;
            }
            // The old key may still be down; its release no longer maps here.
            return self
                .rebind(lane, event.keycode)
                .then_some(GameAction::KeyUp { lane });
        }

        if let Some(lane) = self.bindings.lane_for(event.keycode) {
            return Some(if pressed {
                GameAction::KeyDown { lane }
            } else {
                GameAction::KeyUp { lane }
            });
        }

        if !pressed {
            return None;
        }
        match event.keycode {
            KeyCode::F1 => Some(GameAction::ToggleRecording),
            KeyCode::F2 => Some(GameAction::TogglePlayback),
            KeyCode::Escape => Some(GameAction::Stop),
            code => SONG_KEYS
                .iter()
                .position(|&key| key == code)
                .map(GameAction::RunSong),
        }
    }

    fn rebind(&mut self, lane: Lane, key: KeyCode) -> bool {
        let name = keycode_name(key).unwrap_or("?");
        match self.bindings.rebind(lane, key) {
            Ok(previous) => {
                log::info!(
                    "INPUT: Lane {} rebound {} -> {}",
                    lane,
                    keycode_name(previous).unwrap_or("?"),
                    name
                );
                self.save_bindings();
                true
            }
            Err(e) => {
                log::warn!("INPUT: Cannot bind {} to lane {}: {}", name, lane, e);
                false
            }
        }
    }

    fn save_bindings(&mut self) {
        let Some((settings, path)) = self.persist.as_mut() else {
            return;
        };
        let names: Option<Vec<String>> = Lane::ALL
            .into_iter()
            .map(|lane| keycode_name(self.bindings.key_for(lane)).map(String::from))
            .collect();
        let Some(names) = names else {
            log::warn!("INPUT: Bindings have unnamed keys, not saved");
            return;
        };

        settings.keybinds = names;
        match settings.save(path) {
            Ok(()) => log::info!("SETTINGS: Keybinds saved to {:?}", path),
            Err(e) => log::error!("SETTINGS: {}", e),
        }
    }
}
