//! Embodiment Modes: raw key events mapped to one movement key set.
//!
//! # Invariants
//! - Desktop and VR produce the same `InputState`; the movement core never
//!   sees platform key types.
//! - Held keys are cleared on teardown and focus loss.

pub mod adapter;
pub mod state;

pub use adapter::{Embodiment, InputAdapter, InputError};
pub use state::{MoveKey, InputState};
