//! Asset intake: uploaded files become artwork descriptors plus GPU-bound pixels.
//!
//! Every accepted image gets an [`ImageHandle`](gallery_common::ImageHandle)
//! from the [`ImageRegistry`]. The presentation layer consumes pixels by
//! handle through [`TextureHost`], never by file path.
//!
//! # Invariants
//! - Only `image/*` files produce descriptors; everything else is skipped.
//! - A handle is released exactly once, on removal or teardown.

mod ingest;
mod registry;

pub use ingest::{
    ingest, is_image_mime, mime_for_path, title_from_file_name, AssetError, IngestReport,
    UploadedFile,
};
pub use registry::{HeadlessTextureHost, ImageRegistry, TextureHost};
