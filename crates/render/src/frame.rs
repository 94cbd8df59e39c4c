use gallery_layout::Placement;
use glam::{Mat4, Quat, Vec2, Vec3};

/// Added to the canvas width and height to get the border size.
pub const FRAME_MARGIN: f32 = 0.15;
/// Border thickness front to back.
pub const FRAME_DEPTH: f32 = 0.1;
/// Border center sits this far behind the canvas plane.
const FRAME_SETBACK: f32 = 0.05;
/// Canvas is lifted off the border's front face to avoid depth fighting.
const CANVAS_LIFT: f32 = 0.002;
/// Caption text height in world units.
pub const CAPTION_FONT_SIZE: f32 = 0.25;
/// Gap between the canvas bottom edge and the caption top.
const CAPTION_GAP: f32 = 0.25;
/// Extra caption width allowed beyond the canvas.
const CAPTION_OVERHANG: f32 = 0.5;
/// Dark grey (#262626).
pub const FRAME_COLOR: [f32; 4] = [0.149, 0.149, 0.149, 1.0];

/// World-space geometry for one framed artwork.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub canvas: Vec2,
    /// Maps a unit quad in the XY plane, facing +Z, onto the canvas.
    pub canvas_transform: Mat4,
    /// Width, height and depth of the border box.
    pub border_size: Vec3,
    /// Maps a unit cube centered at the origin onto the border.
    pub border_transform: Mat4,
    /// Top center of the caption text.
    pub caption_anchor: Vec3,
    pub caption_max_width: f32,
}

impl FrameGeometry {
    pub fn new(placement: &Placement) -> Self {
        let canvas = placement.frame_size;
        let rotation = Quat::from_rotation_y(placement.yaw);
        let local = |v: Vec3| placement.position + rotation * v;

        let border_size = Vec3::new(canvas.x + FRAME_MARGIN, canvas.y + FRAME_MARGIN, FRAME_DEPTH);
        let border_transform = Mat4::from_scale_rotation_translation(
            border_size,
            rotation,
            local(Vec3::new(0.0, 0.0, -FRAME_SETBACK)),
        );
        let canvas_transform = Mat4::from_scale_rotation_translation(
            canvas.extend(1.0),
            rotation,
            local(Vec3::new(0.0, 0.0, CANVAS_LIFT)),
        );

        Self {
            canvas,
            canvas_transform,
            border_size,
            border_transform,
            caption_anchor: local(Vec3::new(0.0, -canvas.y * 0.5 - CAPTION_GAP, 0.0)),
            caption_max_width: canvas.x + CAPTION_OVERHANG,
        }
    }
}
