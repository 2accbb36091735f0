//! Logical lanes and the physical keys bound to them.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use winit::keyboard::KeyCode;

/// Number of playable lanes.
pub const NUM_LANES: usize = 4;

/// Keys owned by session controls; never bindable to a lane.
pub const RESERVED_KEYS: [KeyCode; 11] = [
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::Escape,
    KeyCode::ControlLeft,
    KeyCode::ControlRight,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
];

/// One of the four fixed input channels.
///
/// Each lane has a one-character symbol used in track files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lane {
    A,
    S,
    K,
    L,
}

impl Lane {
    pub const ALL: [Lane; NUM_LANES] = [Lane::A, Lane::S, Lane::K, Lane::L];

    pub fn index(self) -> usize {
        match self {
            Lane::A => 0,
            Lane::S => 1,
            Lane::K => 2,
            Lane::L => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Lane> {
        Self::ALL.get(index).copied()
    }

    /// Symbol written to track files.
    pub fn symbol(self) -> char {
        match self {
            Lane::A => 'a',
            Lane::S => 's',
            Lane::K => 'k',
            Lane::L => 'l',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Lane> {
        Self::ALL.into_iter().find(|lane| lane.symbol() == symbol)
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("{key:?} is already bound to lane {lane}")]
    KeyInUse { key: KeyCode, lane: Lane },
    #[error("{key:?} is reserved for session controls")]
    Reserved { key: KeyCode },
}

/// Bidirectional lane <-> physical key table.
///
/// Every lane owns exactly one key and no key is shared between lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneBindings {
    keys: [KeyCode; NUM_LANES],
    lanes: HashMap<KeyCode, Lane>,
}

impl LaneBindings {
    /// Builds a table from one key per lane, in lane order.
    pub fn new(keys: [KeyCode; NUM_LANES]) -> Result<Self, BindingError> {
        let mut lanes = HashMap::with_capacity(NUM_LANES);
        for (lane, key) in Lane::ALL.into_iter().zip(keys) {
            if RESERVED_KEYS.contains(&key) {
                return Err(BindingError::Reserved { key });
            }
            if let Some(owner) = lanes.insert(key, lane) {
                return Err(BindingError::KeyInUse { key, lane: owner });
            }
        }
        Ok(Self { keys, lanes })
    }

    pub fn lane_for(&self, key: KeyCode) -> Option<Lane> {
        self.lanes.get(&key).copied()
    }

    pub fn key_for(&self, lane: Lane) -> KeyCode {
        self.keys[lane.index()]
    }

    /// Binds `key` to `lane`, replacing the lane's previous key.
    ///
    /// Fails if another lane already owns `key` or a session control
    /// uses it; the table is left untouched.
    pub fn rebind(&mut self, lane: Lane, key: KeyCode) -> Result<KeyCode, BindingError> {
        if RESERVED_KEYS.contains(&key) {
            return Err(BindingError::Reserved { key });
        }
        match self.lanes.get(&key) {
            Some(&owner) if owner == lane => return Ok(key),
            Some(&owner) => return Err(BindingError::KeyInUse { key, lane: owner }),
            None => {}
        }

        let previous = std::mem::replace(&mut self.keys[lane.index()], key);
        self.lanes.remove(&previous);
        self.lanes.insert(key, lane);
        Ok(previous)
    }
}

impl Default for LaneBindings {
    fn default() -> Self {
        let keys = [KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyK, KeyCode::KeyL];
        let lanes = Lane::ALL.into_iter().map(|lane| (keys[lane.index()], lane)).collect();
        Self { keys, lanes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        for lane in Lane::ALL {
            assert_eq!(Lane::from_symbol(lane.symbol()), Some(lane));
            assert_eq!(Lane::from_index(lane.index()), Some(lane));
        }
        assert_eq!(Lane::from_symbol('x'), None);
        assert_eq!(Lane::from_index(4), None);
    }

    #[test]
    fn test_default_bindings() {
        let bindings = LaneBindings::default();
        assert_eq!(bindings.lane_for(KeyCode::KeyA), Some(Lane::A));
        assert_eq!(bindings.lane_for(KeyCode::KeyL), Some(Lane::L));
        assert_eq!(bindings.lane_for(KeyCode::KeyD), None);
        assert_eq!(bindings.key_for(Lane::K), KeyCode::KeyK);
    }

    #[test]
    fn test_rebind_replaces_lane_key() {
        let mut bindings = LaneBindings::default();
        let previous = bindings.rebind(Lane::A, KeyCode::KeyD).unwrap();

        assert_eq!(previous, KeyCode::KeyA);
        assert_eq!(bindings.lane_for(KeyCode::KeyD), Some(Lane::A));
        assert_eq!(bindings.lane_for(KeyCode::KeyA), None);
        assert_eq!(bindings.key_for(Lane::A), KeyCode::KeyD);
    }

    #[test]
    fn test_rebind_rejects_key_owned_by_other_lane() {
        let mut bindings = LaneBindings::default();
        let err = bindings.rebind(Lane::A, KeyCode::KeyS).unwrap_err();

        assert_eq!(
            err,
            BindingError::KeyInUse {
                key: KeyCode::KeyS,
                lane: Lane::S
            }
        );
        assert_eq!(bindings, LaneBindings::default());
    }

    #[test]
    fn test_rebind_same_key_is_noop() {
        let mut bindings = LaneBindings::default();
        assert_eq!(bindings.rebind(Lane::K, KeyCode::KeyK), Ok(KeyCode::KeyK));
        assert_eq!(bindings, LaneBindings::default());
    }

    #[test]
    fn test_reserved_keys_are_rejected() {
        let mut bindings = LaneBindings::default();
        for key in [KeyCode::F1, KeyCode::Escape, KeyCode::Digit3] {
            assert_eq!(bindings.rebind(Lane::L, key), Err(BindingError::Reserved { key }));
        }
        assert_eq!(bindings, LaneBindings::default());

        let keys = [KeyCode::KeyA, KeyCode::F2, KeyCode::KeyK, KeyCode::KeyL];
        assert!(matches!(
            LaneBindings::new(keys),
            Err(BindingError::Reserved { key: KeyCode::F2 })
        ));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let keys = [KeyCode::KeyA, KeyCode::KeyA, KeyCode::KeyK, KeyCode::KeyL];
        assert!(matches!(
            LaneBindings::new(keys),
            Err(BindingError::KeyInUse { lane: Lane::A, .. })
        ));
    }
}
