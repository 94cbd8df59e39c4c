use gallery_common::{ArtworkDescriptor, LayoutConfig, RoomBounds, Wall};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A position on a wall where one artwork can hang.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub wall: Wall,
    pub position: Vec3,
}

/// Where and how large an artwork is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Index into the slot list; equals the descriptor's index in the input.
    pub slot: usize,
    pub wall: Wall,
    /// Center of the canvas in world space.
    pub position: Vec3,
    /// Rotation about +Y in radians.
    pub yaw: f32,
    /// Canvas width and height, border excluded.
    pub frame_size: Vec2,
}

/// Placements plus how many descriptors did not fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub placements: Vec<Placement>,
    pub dropped: usize,
}

/// Canvas size for an aspect ratio: fixed width, height keeps the proportions.
pub fn frame_size(aspect_ratio: f32, base_scale: f32) -> Vec2 {
    Vec2::new(base_scale, base_scale / aspect_ratio)
}

/// Slot generator bound to one room and layout configuration.
///
/// The slot list is computed once; every `plan` call only zips descriptors
/// onto it.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    slots: Vec<Slot>,
}

impl LayoutEngine {
    pub fn new(room: RoomBounds, config: LayoutConfig) -> Self {
        let slots = wall_slots(&room, &config);
        tracing::debug!(capacity = slots.len(), "layout slots generated");
        Self { config, slots }
    }

    /// All slots in assignment order. Slot 0 is the entrance center.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Maximum number of artworks on display.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Assign descriptors to slots in order and report the overflow.
    pub fn plan(&self, descriptors: &[ArtworkDescriptor]) -> LayoutPlan {
        let _span = tracing::debug_span!("layout_plan", artworks = descriptors.len()).entered();

        let placements: Vec<Placement> = descriptors
            .iter()
            .zip(&self.slots)
            .enumerate()
            .map(|(slot, (descriptor, s))| Placement {
                slot,
                wall: s.wall,
                position: s.position,
                yaw: s.wall.yaw(),
                frame_size: frame_size(descriptor.aspect_ratio(), self.config.base_scale),
            })
            .collect();

        let dropped = descriptors.len() - placements.len();
        if dropped > 0 {
            tracing::debug!(dropped, capacity = self.capacity(), "artworks exceed wall capacity");
        }
        LayoutPlan {
            placements,
            dropped,
        }
    }

    /// Placements only; overflow is silently truncated.
    pub fn compute(&self, descriptors: &[ArtworkDescriptor]) -> Vec<Placement> {
        self.plan(descriptors).placements
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(RoomBounds::default(), LayoutConfig::default())
    }
}

/// Lay out `descriptors` in the default room.
pub fn compute_placements(descriptors: &[ArtworkDescriptor]) -> Vec<Placement> {
    LayoutEngine::default().compute(descriptors)
}

/// Offsets from `-span` to `span` at `spacing`, counted in whole steps so
/// float accumulation cannot add or lose an end point.
fn wall_offsets(span: f32, spacing: f32) -> impl Iterator<Item = f32> {
    let steps = ((2.0 * span) / spacing + 1e-4).floor() as usize;
    (0..=steps).map(move |i| -span + i as f32 * spacing)
}

fn wall_slots(room: &RoomBounds, config: &LayoutConfig) -> Vec<Slot> {
    let offset = room.wall_offset() - config.wall_inset;
    let y = config.hang_height;

    let mut slots = vec![Slot {
        wall: Wall::Front,
        position: Wall::Front.point(offset, 0.0, y),
    }];

    for wall in Wall::ALL {
        for along in wall_offsets(config.span, config.spacing) {
            // Entrance center is slot 0.
            if wall == Wall::Front && along.abs() < 1e-4 {
                continue;
            }
            slots.push(Slot {
                wall,
                position: wall.point(offset, along, y),
            });
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_common::ImageHandle;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn artwork(aspect: f32) -> ArtworkDescriptor {
        ArtworkDescriptor::new(ImageHandle::new(), Some(aspect), "")
    }

    fn many(n: usize) -> Vec<ArtworkDescriptor> {
        (0..n).map(|i| artwork(1.0 + i as f32 * 0.1)).collect()
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(compute_placements(&[]).is_empty());
    }

    #[test]
    fn default_capacity_is_seventeen() {
        let engine = LayoutEngine::default();
        assert_eq!(engine.capacity(), 17);
    }

    #[test]
    fn first_artwork_greets_at_entrance() {
        for n in 1..20 {
            let placements = compute_placements(&many(n));
            let first = placements[0];
            assert_eq!(first.position, Vec3::new(0.0, 2.0, -9.5));
            assert_eq!(first.wall, Wall::Front);
            assert_eq!(first.yaw, 0.0);
        }
    }

    #[test]
    fn slot_visitation_order() {
        let engine = LayoutEngine::default();
        let walls: Vec<Wall> = engine.slots().iter().map(|s| s.wall).collect();
        let expected: Vec<Wall> = std::iter::repeat_n(Wall::Front, 5)
            .chain(std::iter::repeat_n(Wall::Back, 4))
            .chain(std::iter::repeat_n(Wall::Left, 4))
            .chain(std::iter::repeat_n(Wall::Right, 4))
            .collect();
        assert_eq!(walls, expected);

        let front_x: Vec<f32> = engine.slots()[1..5].iter().map(|s| s.position.x).collect();
        assert_eq!(front_x, vec![-6.0, -2.0, 2.0, 6.0]);
        let left: Vec<Vec3> = engine.slots()[9..13].iter().map(|s| s.position).collect();
        assert_eq!(left[0], Vec3::new(9.5, 2.0, -6.0));
        assert_eq!(left[3], Vec3::new(9.5, 2.0, 6.0));
    }

    #[test]
    fn back_wall_includes_center_when_spacing_hits_it() {
        let config = LayoutConfig {
            spacing: 3.0,
            ..LayoutConfig::default()
        };
        let engine = LayoutEngine::new(RoomBounds::default(), config);
        let back_center = engine
            .slots()
            .iter()
            .any(|s| s.wall == Wall::Back && s.position.x == 0.0);
        let front_centers = engine
            .slots()
            .iter()
            .filter(|s| s.wall == Wall::Front && s.position.x == 0.0)
            .count();
        assert!(back_center);
        assert_eq!(front_centers, 1);
        // 1 entrance + 4 front + 5 back + 5 left + 5 right
        assert_eq!(engine.capacity(), 20);
    }

    #[test]
    fn three_artwork_scenario() {
        let a = artwork(2.0);
        let b = artwork(1.0);
        let c = artwork(1.5);
        let placements = compute_placements(&[a, b, c]);
        assert_eq!(placements.len(), 3);

        assert_eq!(placements[0].position, Vec3::new(0.0, 2.0, -9.5));
        assert_eq!(placements[0].frame_size, Vec2::new(2.0, 1.0));

        assert_eq!(placements[1].position, Vec3::new(-6.0, 2.0, -9.5));
        assert_eq!(placements[1].yaw, Wall::Front.yaw());
        assert_eq!(placements[1].frame_size, Vec2::new(2.0, 2.0));

        assert_eq!(placements[2].position, Vec3::new(-2.0, 2.0, -9.5));
        assert_eq!(placements[2].yaw, Wall::Front.yaw());
        assert!((placements[2].frame_size.y - 2.0 / 1.5).abs() < 1e-6);
    }

    #[test]
    fn yaw_follows_wall() {
        let placements = compute_placements(&many(17));
        for p in &placements {
            let expected = match p.wall {
                Wall::Front => 0.0,
                Wall::Back => PI,
                Wall::Left => -FRAC_PI_2,
                Wall::Right => FRAC_PI_2,
            };
            assert_eq!(p.yaw, expected);
        }
        assert_eq!(placements[5].wall, Wall::Back);
        assert_eq!(placements[9].wall, Wall::Left);
        assert_eq!(placements[13].wall, Wall::Right);
    }

    #[test]
    fn capacity_truncates_in_order() {
        let input = many(25);
        let plan = LayoutEngine::default().plan(&input);
        assert_eq!(plan.placements.len(), 17);
        assert_eq!(plan.dropped, 8);
        for (i, p) in plan.placements.iter().enumerate() {
            assert_eq!(p.slot, i);
            let expected = frame_size(input[i].aspect_ratio(), 2.0);
            assert_eq!(p.frame_size, expected);
        }
    }

    #[test]
    fn fewer_artworks_than_slots() {
        let plan = LayoutEngine::default().plan(&many(4));
        assert_eq!(plan.placements.len(), 4);
        assert_eq!(plan.dropped, 0);
    }

    #[test]
    fn aspect_is_preserved() {
        for aspect in [0.5_f32, 0.75, 1.0, 4.0 / 3.0, 16.0 / 9.0, 3.0] {
            let p = compute_placements(&[artwork(aspect)])[0];
            let ratio = p.frame_size.x / p.frame_size.y;
            assert!((ratio - aspect).abs() < 1e-5, "{aspect} vs {ratio}");
        }
    }

    #[test]
    fn unknown_aspect_defaults() {
        let d = ArtworkDescriptor::new(ImageHandle::new(), None, "untitled");
        let p = compute_placements(&[d])[0];
        assert!((p.frame_size.x / p.frame_size.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn deterministic_by_value() {
        let input = many(12);
        let copy = input.clone();
        assert_eq!(compute_placements(&input), compute_placements(&copy));
    }

    #[test]
    fn no_two_placements_share_a_slot() {
        let placements = compute_placements(&many(17));
        for (i, a) in placements.iter().enumerate() {
            for b in &placements[i + 1..] {
                assert_ne!(a.position, b.position);
            }
        }
    }
}
