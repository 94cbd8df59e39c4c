//! Layout Engine: maps an ordered artwork list onto wall slots.
//!
//! # Invariants
//! - Pure and deterministic: same input order, same placements.
//! - The first artwork always hangs at the center of the entrance wall.
//! - Artworks beyond the slot capacity are dropped, never wrapped.

mod engine;

pub use engine::{
    compute_placements, frame_size, LayoutEngine, LayoutPlan, Placement, Slot,
};
