use gallery_common::{RoomBounds, Wall};
use glam::{Mat4, Vec3};

/// Thickness of the boxes used to draw the room shell.
const SHELL_THICKNESS: f32 = 0.02;

const FLOOR_COLOR: [f32; 4] = [0.749, 0.749, 0.749, 1.0];
const CEILING_COLOR: [f32; 4] = [0.937, 0.937, 0.937, 1.0];
const WALL_COLOR: [f32; 4] = [0.851, 0.851, 0.851, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Ceiling,
    Wall(Wall),
}

/// One face of the room shell, drawn as a thin box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub kind: SurfaceKind,
    /// Maps a unit cube centered at the origin onto the surface box.
    pub transform: Mat4,
    pub color: [f32; 4],
}

/// Floor, ceiling and four walls. The inner faces lie exactly on the room
/// bounds so the walls enclose the floor.
pub fn room_surfaces(room: &RoomBounds) -> Vec<Surface> {
    let half = room.half_extent();
    let t = SHELL_THICKNESS;
    let size = room.size;
    let height = room.height;

    let boxed = |kind, scale: Vec3, center: Vec3, color| Surface {
        kind,
        transform: Mat4::from_scale_rotation_translation(scale, glam::Quat::IDENTITY, center),
        color,
    };

    let mut surfaces = vec![
        boxed(
            SurfaceKind::Floor,
            Vec3::new(size, t, size),
            Vec3::new(0.0, -t * 0.5, 0.0),
            FLOOR_COLOR,
        ),
        boxed(
            SurfaceKind::Ceiling,
            Vec3::new(size, t, size),
            Vec3::new(0.0, height + t * 0.5, 0.0),
            CEILING_COLOR,
        ),
    ];

    for wall in Wall::ALL {
        // Push the box outward so its inner face lands on the wall plane.
        let center = wall.point(half + t * 0.5, 0.0, height * 0.5);
        let scale = match wall {
            Wall::Front | Wall::Back => Vec3::new(size, height, t),
            Wall::Left | Wall::Right => Vec3::new(t, height, size),
        };
        surfaces.push(boxed(SurfaceKind::Wall(wall), scale, center, WALL_COLOR));
    }
    surfaces
}
