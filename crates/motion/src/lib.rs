//! Movement Controller: damped-velocity integration for the viewer.
//!
//! # Invariants
//! - Position satisfies the room bounds after every `advance`.
//! - Without input, velocity decays monotonically toward zero.
//! - Movement stays level whatever the camera pitch.
//! - Camera motion is outside the layout/gallery state; it never mutates it.

mod controller;

pub use controller::{CameraPose, MotionController, MotionState};
