//! Gallery configuration, loaded from YAML.
//!
//! Every section falls back to its defaults, so a config file only needs the
//! keys it changes.

use crate::types::RoomBounds;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Upper bound on slots generated along one wall.
pub const MAX_SLOTS_PER_WALL: usize = 64;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Wall-slot layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between a wall plane and the line artworks hang on.
    pub wall_inset: f32,
    pub hang_height: f32,
    /// Distance between neighbouring slots on one wall.
    pub spacing: f32,
    /// Slots are generated for offsets in `[-span, span]`.
    pub span: f32,
    /// Frame width; height follows from the aspect ratio.
    pub base_scale: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            wall_inset: 0.5,
            hang_height: 2.0,
            spacing: 4.0,
            span: 6.0,
            base_scale: 2.0,
        }
    }
}

/// Movement tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Acceleration in units per second.
    pub speed: f32,
    /// Velocity decay rate per second.
    pub damping: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            damping: 8.0,
        }
    }
}

/// Initial camera pose and projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub spawn: Vec3,
    pub fov_degrees: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(0.0, 1.6, 5.0),
            fov_degrees: 60.0,
            mouse_sensitivity: 0.003,
        }
    }
}

/// Physical key code to movement action, e.g. `KeyW: forward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub bindings: BTreeMap<String, String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        let pairs = [
            ("KeyW", "forward"),
            ("KeyS", "back"),
            ("KeyA", "strafe_left"),
            ("KeyD", "strafe_right"),
            ("ArrowUp", "forward"),
            ("ArrowDown", "back"),
            ("ArrowLeft", "strafe_left"),
            ("ArrowRight", "strafe_right"),
        ];
        Self {
            bindings: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub room: RoomBounds,
    pub layout: LayoutConfig,
    pub motion: MotionConfig,
    pub camera: CameraConfig,
    pub input: InputConfig,
}

impl GalleryConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Check the relationships the layout and movement code rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let room = &self.room;
        let layout = &self.layout;
        let camera = &self.camera;

        // Comparisons below are all false for NaN.
        let finite = [
            ("room.min_eye_height", room.min_eye_height),
            ("room.max_eye_height", room.max_eye_height),
            ("layout.wall_inset", layout.wall_inset),
            ("layout.hang_height", layout.hang_height),
            ("layout.span", layout.span),
            ("camera.spawn.x", camera.spawn.x),
            ("camera.spawn.y", camera.spawn.y),
            ("camera.spawn.z", camera.spawn.z),
            ("camera.fov_degrees", camera.fov_degrees),
            ("camera.mouse_sensitivity", camera.mouse_sensitivity),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be a finite number, got {value}")));
            }
        }

        let positive = [
            ("room.size", room.size),
            ("room.height", room.height),
            ("room.walk_bound", room.walk_bound),
            ("layout.spacing", layout.spacing),
            ("layout.base_scale", layout.base_scale),
            ("motion.speed", self.motion.speed),
            ("motion.damping", self.motion.damping),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if room.walk_bound >= room.half_extent() {
            return Err(invalid(format!(
                "room.walk_bound ({}) must be less than half the room size ({})",
                room.walk_bound,
                room.half_extent()
            )));
        }
        if room.min_eye_height > room.max_eye_height {
            return Err(invalid(format!(
                "room.min_eye_height ({}) exceeds room.max_eye_height ({})",
                room.min_eye_height, room.max_eye_height
            )));
        }
        if room.max_eye_height > room.height {
            return Err(invalid(format!(
                "room.max_eye_height ({}) is above the ceiling ({})",
                room.max_eye_height, room.height
            )));
        }
        if layout.wall_inset < 0.0 || layout.wall_inset >= room.half_extent() {
            return Err(invalid(format!(
                "layout.wall_inset ({}) must lie in [0, {})",
                layout.wall_inset,
                room.half_extent()
            )));
        }
        if layout.span < 0.0 || layout.span > room.half_extent() {
            return Err(invalid(format!(
                "layout.span ({}) must lie in [0, {}]",
                layout.span,
                room.half_extent()
            )));
        }
        let per_wall = (2.0 * layout.span) / layout.spacing + 1.0;
        if per_wall > MAX_SLOTS_PER_WALL as f32 {
            return Err(invalid(format!(
                "layout.spacing ({}) is too small for layout.span ({}): at most {MAX_SLOTS_PER_WALL} slots per wall",
                layout.spacing, layout.span
            )));
        }
        if !(0.0..=room.height).contains(&layout.hang_height) {
            return Err(invalid(format!(
                "layout.hang_height ({}) must lie between floor and ceiling",
                layout.hang_height
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}
