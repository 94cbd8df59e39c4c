//! Rendering Adapter: what the gallery looks like, independent of a GPU API.
//!
//! # Invariants
//! - Renderers read gallery state and never mutate it.
//! - Frame borders, captions and room surfaces derive from placements and
//!   room bounds only.
//! - Texture filtering is configured once, when an image is bound.

mod frame;
mod renderer;
mod room;
mod sampling;

pub use frame::{FrameGeometry, CAPTION_FONT_SIZE, FRAME_COLOR, FRAME_DEPTH, FRAME_MARGIN};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use room::{room_surfaces, Surface, SurfaceKind};
pub use sampling::TextureSampling;
