//! Gallery Kernel: the ordered artwork list and the placements derived from it.
//!
//! # Invariants
//! - Placements are recomputed in full after every change, never patched.
//! - Every descriptor's image handle is live until removal or teardown.
//! - All state mutations flow through explicit operations and are logged.

pub mod gallery;

pub use gallery::{Artwork, Gallery, GalleryEvent, EVENT_LOG_LIMIT};
