use gallery_kernel::Gallery;
use glam::Vec3;
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// View direction.
    pub look: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.6, 5.0),
            look: Vec3::NEG_Z,
            fov_degrees: 60.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads gallery state and a view, then produces output. It
/// never mutates the gallery.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given gallery and view.
    fn render(&self, gallery: &Gallery, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the gallery layout. Used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, gallery: &Gallery, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Gallery (artworks={}, placed={}, dropped={}, capacity={}) ===",
            gallery.len(),
            gallery.placements().len(),
            gallery.dropped(),
            gallery.capacity()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) look=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.look.x, view.look.y, view.look.z,
            view.fov_degrees
        );

        for artwork in gallery.artworks() {
            let p = artwork.placement;
            let _ = writeln!(
                out,
                "  [{:>2}] {:<5} pos=({:.2}, {:.2}, {:.2}) yaw={:>4.0} size={:.2}x{:.2} \"{}\"",
                p.slot,
                p.wall,
                p.position.x,
                p.position.y,
                p.position.z,
                p.yaw.to_degrees(),
                p.frame_size.x,
                p.frame_size.y,
                artwork.descriptor.title()
            );
        }

        for d in gallery.descriptors().iter().skip(gallery.placements().len()) {
            let _ = writeln!(out, "  [--] not shown \"{}\"", d.title());
        }

        out
    }
}
