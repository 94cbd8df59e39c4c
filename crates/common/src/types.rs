use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use uuid::Uuid;

/// Aspect ratio substituted when the source dimensions are unknown or unusable.
pub const DEFAULT_ASPECT_RATIO: f32 = 1.5;

/// Opaque reference to decoded pixel data held by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageHandle(pub Uuid);

impl ImageHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and debug output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ImageHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// One image submitted to the gallery.
///
/// Fields are private so a descriptor cannot change after it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkDescriptor {
    handle: ImageHandle,
    aspect_ratio: f32,
    title: String,
}

impl ArtworkDescriptor {
    /// Build a descriptor. A missing, non-positive or non-finite aspect ratio
    /// becomes [`DEFAULT_ASPECT_RATIO`].
    pub fn new(handle: ImageHandle, aspect_ratio: Option<f32>, title: impl Into<String>) -> Self {
        Self {
            handle,
            aspect_ratio: sanitize_aspect(aspect_ratio),
            title: title.into(),
        }
    }

    /// Build a descriptor from pixel dimensions; a zero dimension means "unknown".
    pub fn from_dimensions(
        handle: ImageHandle,
        width: u32,
        height: u32,
        title: impl Into<String>,
    ) -> Self {
        let aspect = (width > 0 && height > 0).then(|| width as f32 / height as f32);
        Self::new(handle, aspect, title)
    }

    pub fn handle(&self) -> ImageHandle {
        self.handle
    }

    /// Width over height, always positive and finite.
    pub fn aspect_ratio(&self) -> f32 {
        // Deserialized descriptors bypass `new`.
        sanitize_aspect(Some(self.aspect_ratio))
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

fn sanitize_aspect(aspect: Option<f32>) -> f32 {
    match aspect {
        Some(a) if a.is_finite() && a > 0.0 => a,
        _ => DEFAULT_ASPECT_RATIO,
    }
}

/// The four walls of the room.
///
/// Left and right are named from a visitor standing in the entrance doorway
/// (the front wall, at -Z) looking into the room (+Z), so the left wall is
/// at +X and the right wall at -X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Wall {
    Front,
    Back,
    Left,
    Right,
}

impl Wall {
    /// Slot visitation order used by the layout engine.
    pub const ALL: [Wall; 4] = [Wall::Front, Wall::Back, Wall::Left, Wall::Right];

    /// Rotation about +Y (radians) that turns a +Z-facing quad toward the room interior.
    pub fn yaw(self) -> f32 {
        match self {
            Wall::Front => 0.0,
            Wall::Back => PI,
            Wall::Left => -FRAC_PI_2,
            Wall::Right => FRAC_PI_2,
        }
    }

    /// Unit normal pointing from the wall into the room.
    pub fn inward_normal(self) -> Vec3 {
        match self {
            Wall::Front => Vec3::Z,
            Wall::Back => Vec3::NEG_Z,
            Wall::Left => Vec3::NEG_X,
            Wall::Right => Vec3::X,
        }
    }

    /// Point on the line parallel to this wall at `offset` from the room center.
    ///
    /// `along` runs along X for the front/back walls and along Z for the side walls.
    pub fn point(self, offset: f32, along: f32, height: f32) -> Vec3 {
        match self {
            Wall::Front => Vec3::new(along, height, -offset),
            Wall::Back => Vec3::new(along, height, offset),
            Wall::Left => Vec3::new(offset, height, along),
            Wall::Right => Vec3::new(-offset, height, along),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Wall::Front => "front",
            Wall::Back => "back",
            Wall::Left => "left",
            Wall::Right => "right",
        }
    }
}

impl std::fmt::Display for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Room geometry and the volume the camera may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomBounds {
    /// Edge length of the square floor.
    pub size: f32,
    /// Floor to ceiling.
    pub height: f32,
    /// Camera x/z stay within `[-walk_bound, walk_bound]`; must be below `size / 2`.
    pub walk_bound: f32,
    pub min_eye_height: f32,
    pub max_eye_height: f32,
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self {
            size: 20.0,
            height: 5.0,
            walk_bound: 9.2,
            min_eye_height: 1.2,
            max_eye_height: 3.5,
        }
    }
}

impl RoomBounds {
    pub fn half_extent(&self) -> f32 {
        self.size * 0.5
    }

    /// Distance from the room center to every wall plane.
    pub fn wall_offset(&self) -> f32 {
        self.half_extent()
    }

    /// Clamp a camera position into the navigable volume.
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(-self.walk_bound, self.walk_bound),
            p.y.clamp(self.min_eye_height, self.max_eye_height),
            p.z.clamp(-self.walk_bound, self.walk_bound),
        )
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x.abs() <= self.walk_bound
            && p.z.abs() <= self.walk_bound
            && (self.min_eye_height..=self.max_eye_height).contains(&p.y)
    }
}
