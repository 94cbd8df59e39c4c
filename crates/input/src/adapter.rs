use gallery_common::InputConfig;
use std::collections::HashMap;

use crate::state::{InputState, MoveKey};

/// Errors from building key bindings.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("unknown movement action: {0}")]
    UnknownAction(String),
}

/// How the viewer is present in the room.
///
/// Movement math is identical for both; the presentation layer decides
/// whether to add a device-reported head pose on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Embodiment {
    #[default]
    Desktop,
    Vr,
}

impl std::fmt::Display for Embodiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Embodiment::Desktop => f.write_str("desktop"),
            Embodiment::Vr => f.write_str("vr"),
        }
    }
}

/// Turns raw key-down/key-up events into an [`InputState`].
///
/// Keys are identified by physical code names (`"KeyW"`, `"ArrowUp"`), so
/// bindings follow key position rather than keyboard layout.
#[derive(Debug, Clone)]
pub struct InputAdapter {
    bindings: HashMap<String, MoveKey>,
    state: InputState,
}

impl InputAdapter {
    pub fn from_config(config: &InputConfig) -> Result<Self, InputError> {
        let bindings = config
            .bindings
            .iter()
            .map(|(code, action)| Ok((code.clone(), action.parse::<MoveKey>()?)))
            .collect::<Result<HashMap<_, _>, InputError>>()?;
        tracing::debug!(count = bindings.len(), "key bindings loaded");
        Ok(Self {
            bindings,
            state: InputState::new(),
        })
    }

    /// Movement key bound to a physical code, if any.
    pub fn binding(&self, code: &str) -> Option<MoveKey> {
        self.bindings.get(code).copied()
    }

    /// Apply one key event. Returns true if the code is a movement key.
    pub fn handle_key(&mut self, code: &str, pressed: bool) -> bool {
        match self.binding(code) {
            Some(key) => {
                if self.state.set(key, pressed) {
                    tracing::trace!(code, key = key.name(), pressed, "movement key");
                }
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Release every held key (teardown, focus loss).
    pub fn clear(&mut self) {
        self.state.clear();
    }
}

impl Default for InputAdapter {
    fn default() -> Self {
        let bindings = [
            ("KeyW", MoveKey::Forward),
            ("KeyS", MoveKey::Back),
            ("KeyA", MoveKey::StrafeLeft),
            ("KeyD", MoveKey::StrafeRight),
            ("ArrowUp", MoveKey::Forward),
            ("ArrowDown", MoveKey::Back),
            ("ArrowLeft", MoveKey::StrafeLeft),
            ("ArrowRight", MoveKey::StrafeRight),
        ];
        Self {
            bindings: bindings
                .into_iter()
                .map(|(code, key)| (code.to_string(), key))
                .collect(),
            state: InputState::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_bindings() {
        let mut adapter = InputAdapter::default();
        assert!(adapter.handle_key("KeyW", true));
        assert!(adapter.handle_key("KeyD", true));
        assert!(adapter.state().is_held(MoveKey::Forward));
        assert!(adapter.state().is_held(MoveKey::StrafeRight));

        assert!(adapter.handle_key("KeyW", false));
        assert!(!adapter.state().is_held(MoveKey::Forward));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut adapter = InputAdapter::default();
        assert!(!adapter.handle_key("KeyQ", true));
        assert!(!adapter.handle_key("Space", true));
        assert!(adapter.state().is_empty());
    }

    #[test]
    fn config_bindings_match_default() {
        let from_config = InputAdapter::from_config(&InputConfig::default()).unwrap();
        let default = InputAdapter::default();
        for code in ["KeyW", "KeyA", "KeyS", "KeyD", "ArrowUp", "ArrowLeft"] {
            assert_eq!(from_config.binding(code), default.binding(code));
        }
    }

    #[test]
    fn custom_bindings() {
        let mut config = InputConfig::default();
        config.bindings.clear();
        config.bindings.insert("KeyZ".into(), "forward".into());
        let mut adapter = InputAdapter::from_config(&config).unwrap();
        assert!(!adapter.handle_key("KeyW", true));
        assert!(adapter.handle_key("KeyZ", true));
        assert!(adapter.state().is_held(MoveKey::Forward));
    }

    #[test]
    fn bad_binding_is_rejected() {
        let mut config = InputConfig::default();
        config.bindings.insert("Space".into(), "jump".into());
        let err = InputAdapter::from_config(&config).unwrap_err();
        assert!(matches!(err, InputError::UnknownAction(a) if a == "jump"));
    }

    #[test]
    fn clear_releases_everything() {
        let mut adapter = InputAdapter::default();
        adapter.handle_key("KeyW", true);
        adapter.handle_key("KeyA", true);
        adapter.clear();
        assert!(adapter.state().is_empty());
    }

    #[test]
    fn embodiment_defaults_to_desktop() {
        assert_eq!(Embodiment::default(), Embodiment::Desktop);
        assert_eq!(Embodiment::Vr.to_string(), "vr");
    }
}
