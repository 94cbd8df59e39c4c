use gallery_common::CameraConfig;
use gallery_motion::CameraPose;
use glam::{Mat4, Vec3};

const PITCH_LIMIT: f32 = 89.0;

/// First-person camera with position, yaw, pitch, and projection parameters.
/// Translation comes from the motion controller through `CameraPose`; the
/// camera itself only turns.
#[derive(Debug, Clone)]
pub struct GalleryCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
}

impl Default for GalleryCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl GalleryCamera {
    /// Camera at the configured spawn point, looking down -Z at the entrance
    /// wall.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: config.spawn,
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            sensitivity: config.mouse_sensitivity,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-PITCH_LIMIT.to_radians(), PITCH_LIMIT.to_radians());
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to window pixels, `None` when it is behind the
    /// camera or outside the view volume.
    pub fn project(&self, point: Vec3, width: f32, height: f32) -> Option<glam::Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(glam::Vec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        ))
    }
}

impl CameraPose for GalleryCamera {
    fn look_direction(&self) -> Vec3 {
        self.forward()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}
