//! wgpu render backend for the gallery.
//!
//! Draws the room shell and frame borders as instanced lit boxes and each
//! artwork as a textured quad. The camera turns with the mouse; translation
//! is owned by the motion controller.
//!
//! # Invariants
//! - Renderer never mutates gallery state.
//! - Textures are created and destroyed only through `TextureUploader`, so
//!   the gallery's image registry stays the single owner of every handle.

mod camera;
mod gpu;
mod shaders;
mod textures;

pub use camera::GalleryCamera;
pub use gpu::WgpuRenderer;
pub use textures::{ArtworkTextures, TextureUploader};
