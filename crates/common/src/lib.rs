//! Shared value types and configuration for the gallery workspace.
//!
//! # Invariants
//! - Descriptors are immutable once created.
//! - Wall planes sit exactly on the room's half extent.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, GalleryConfig, InputConfig, LayoutConfig, MotionConfig,
    MAX_SLOTS_PER_WALL,
};
pub use types::{ArtworkDescriptor, ImageHandle, RoomBounds, Wall, DEFAULT_ASPECT_RATIO};
