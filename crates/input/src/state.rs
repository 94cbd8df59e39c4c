use glam::Vec2;
use std::collections::HashSet;
use std::str::FromStr;

use crate::adapter::InputError;

/// A movement intent. Physical keys are bound to these by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

impl MoveKey {
    pub const ALL: [MoveKey; 4] = [
        MoveKey::Forward,
        MoveKey::Back,
        MoveKey::StrafeLeft,
        MoveKey::StrafeRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MoveKey::Forward => "forward",
            MoveKey::Back => "back",
            MoveKey::StrafeLeft => "strafe_left",
            MoveKey::StrafeRight => "strafe_right",
        }
    }
}

impl FromStr for MoveKey {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| InputError::UnknownAction(s.to_string()))
    }
}

/// Movement keys currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: HashSet<MoveKey>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state with the given keys held.
    pub fn holding(keys: impl IntoIterator<Item = MoveKey>) -> Self {
        Self {
            held: keys.into_iter().collect(),
        }
    }

    /// Returns true if the key was not already held.
    pub fn press(&mut self, key: MoveKey) -> bool {
        self.held.insert(key)
    }

    /// Returns true if the key was held.
    pub fn release(&mut self, key: MoveKey) -> bool {
        self.held.remove(&key)
    }

    pub fn set(&mut self, key: MoveKey, pressed: bool) -> bool {
        if pressed {
            self.press(key)
        } else {
            self.release(key)
        }
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Raw movement axes: `x` is strafe (right positive), `y` is forward
    /// (forward positive). Opposing keys cancel to zero. Not normalized.
    pub fn axes(&self) -> Vec2 {
        let axis = |pos: MoveKey, neg: MoveKey| {
            (self.is_held(pos) as i8 - self.is_held(neg) as i8) as f32
        };
        Vec2::new(
            axis(MoveKey::StrafeRight, MoveKey::StrafeLeft),
            axis(MoveKey::Forward, MoveKey::Back),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let s = InputState::new();
        assert!(s.is_empty());
        assert_eq!(s.axes(), Vec2::ZERO);
    }

    #[test]
    fn press_release_reports_transitions() {
        let mut s = InputState::new();
        assert!(s.press(MoveKey::Forward));
        assert!(!s.press(MoveKey::Forward));
        assert!(s.release(MoveKey::Forward));
        assert!(!s.release(MoveKey::Forward));
    }

    #[test]
    fn axes_from_keys() {
        let s = InputState::holding([MoveKey::Forward, MoveKey::StrafeLeft]);
        assert_eq!(s.axes(), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn opposing_keys_cancel() {
        let s = InputState::holding(MoveKey::ALL);
        assert_eq!(s.axes(), Vec2::ZERO);
    }

    #[test]
    fn parse_move_key() {
        assert_eq!("strafe_right".parse::<MoveKey>().unwrap(), MoveKey::StrafeRight);
        assert!("jump".parse::<MoveKey>().is_err());
    }
}
