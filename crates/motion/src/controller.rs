use gallery_common::{MotionConfig, RoomBounds};
use gallery_input::InputState;
use glam::Vec3;

/// Camera access the controller needs from the presentation layer.
pub trait CameraPose {
    /// World-space view direction; need not be level or normalized.
    fn look_direction(&self) -> Vec3;
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
}

/// Viewer position and horizontal velocity.
///
/// `velocity` is a per-frame displacement: `advance` scales acceleration by
/// the elapsed time before adding it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl MotionState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
        }
    }
}

/// Damped-velocity integrator with room clamping.
#[derive(Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    room: RoomBounds,
    spawn: Vec3,
}

impl MotionController {
    pub fn new(config: MotionConfig, room: RoomBounds, spawn: Vec3) -> Self {
        Self {
            config,
            room,
            spawn: room.clamp(spawn),
        }
    }

    pub fn room(&self) -> &RoomBounds {
        &self.room
    }

    /// Resting state at the spawn point.
    pub fn spawn_state(&self) -> MotionState {
        MotionState::at(self.spawn)
    }

    /// Advance one frame.
    ///
    /// `dt` must be finite and non-negative. Debug builds assert it; release
    /// builds treat a bad value as zero elapsed time.
    pub fn advance(
        &self,
        state: MotionState,
        input: &InputState,
        look: Vec3,
        dt: f32,
    ) -> MotionState {
        debug_assert!(
            dt.is_finite() && dt >= 0.0,
            "elapsed time must be finite and non-negative, got {dt}"
        );
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let mut velocity = if state.velocity.is_finite() {
            state.velocity
        } else {
            Vec3::ZERO
        };
        // Floored so a long frame stops the viewer instead of reversing it.
        let retain = (1.0 - self.config.damping * dt).max(0.0);
        velocity.x *= retain;
        velocity.z *= retain;
        velocity.y = 0.0;

        let wish = input.axes().normalize_or_zero();
        let (forward, right) = level_basis(look);
        velocity += (forward * wish.y + right * wish.x) * self.config.speed * dt;

        let position = if state.position.is_finite() {
            state.position
        } else {
            tracing::warn!(position = ?state.position, "non-finite camera position, respawning");
            self.spawn
        };

        MotionState {
            position: self.room.clamp(position + velocity),
            velocity,
        }
    }

    /// Advance one frame against a live camera.
    ///
    /// The camera's current position wins over `state.position`, so a pose
    /// moved from outside (teleport, head tracking) is clamped on this frame.
    pub fn drive<C: CameraPose>(
        &self,
        state: MotionState,
        input: &InputState,
        camera: &mut C,
        dt: f32,
    ) -> MotionState {
        let state = MotionState {
            position: camera.position(),
            ..state
        };
        let next = self.advance(state, input, camera.look_direction(), dt);
        camera.set_position(next.position);
        next
    }
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(
            MotionConfig::default(),
            RoomBounds::default(),
            Vec3::new(0.0, 1.6, 5.0),
        )
    }
}

/// Level forward and right unit vectors for a look direction.
///
/// Both are zero when looking straight up or down.
pub(crate) fn level_basis(look: Vec3) -> (Vec3, Vec3) {
    let forward = Vec3::new(look.x, 0.0, look.z).normalize_or_zero();
    let right = forward.cross(Vec3::Y);
    (forward, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_input::MoveKey;

    const LOOK: Vec3 = Vec3::NEG_Z;

    fn center() -> MotionState {
        MotionState::at(Vec3::new(0.0, 1.6, 0.0))
    }

    /// Splitmix64 step, for reproducible pseudo-random sequences.
    fn splitmix64(state: &mut u64) -> u64 {
        *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = *state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn unit(state: &mut u64) -> f32 {
        (splitmix64(state) >> 40) as f32 / (1u64 << 24) as f32
    }

    struct TestCamera {
        position: Vec3,
        look: Vec3,
    }

    impl CameraPose for TestCamera {
        fn look_direction(&self) -> Vec3 {
            self.look
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn set_position(&mut self, position: Vec3) {
            self.position = position;
        }
    }

    #[test]
    fn basis_is_level() {
        let (f, r) = level_basis(Vec3::new(0.0, -0.8, -0.6));
        assert!(f.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(r.abs_diff_eq(Vec3::X, 1e-6));

        let (f, r) = level_basis(Vec3::Y);
        assert_eq!(f, Vec3::ZERO);
        assert_eq!(r, Vec3::ZERO);
    }

    #[test]
    fn forward_moves_along_look() {
        let c = MotionController::default();
        let input = InputState::holding([MoveKey::Forward]);
        let next = c.advance(center(), &input, LOOK, 0.1);
        assert!(next.position.z < 0.0);
        assert_eq!(next.position.x, 0.0);
        assert_eq!(next.position.y, 1.6);
    }

    #[test]
    fn strafe_right_moves_positive_x_facing_negative_z() {
        let c = MotionController::default();
        let input = InputState::holding([MoveKey::StrafeRight]);
        let next = c.advance(center(), &input, LOOK, 0.1);
        assert!(next.position.x > 0.0);
        assert!(next.position.z.abs() < 1e-6);
    }

    #[test]
    fn looking_down_keeps_height() {
        let c = MotionController::default();
        let input = InputState::holding([MoveKey::Forward]);
        let look = Vec3::new(0.0, -0.95, -0.3).normalize();
        let mut state = center();
        for _ in 0..10 {
            state = c.advance(state, &input, look, 0.05);
        }
        assert_eq!(state.position.y, 1.6);
        assert!(state.position.z < 0.0);
    }

    #[test]
    fn diagonal_is_not_faster() {
        let c = MotionController::default();
        let straight = c.advance(center(), &InputState::holding([MoveKey::Forward]), LOOK, 0.1);
        let diagonal = c.advance(
            center(),
            &InputState::holding([MoveKey::Forward, MoveKey::StrafeLeft]),
            LOOK,
            0.1,
        );
        assert!((straight.velocity.length() - diagonal.velocity.length()).abs() < 1e-6);
    }

    #[test]
    fn opposing_keys_do_not_accelerate() {
        let c = MotionController::default();
        let input = InputState::holding([MoveKey::Forward, MoveKey::Back]);
        let next = c.advance(center(), &input, LOOK, 0.1);
        assert_eq!(next.velocity, Vec3::ZERO);
        assert_eq!(next.position, center().position);
    }

    #[test]
    fn velocity_decays_to_rest() {
        let c = MotionController::default();
        let empty = InputState::new();
        for dt in [0.005_f32, 0.016, 0.05, 0.1, 0.2, 0.5] {
            let mut state = MotionState {
                position: Vec3::new(0.0, 1.6, 0.0),
                velocity: Vec3::new(3.0, 0.0, -2.0),
            };
            let mut last = state.velocity.length();
            for _ in 0..400 {
                state = c.advance(state, &empty, LOOK, dt);
                let now = state.velocity.length();
                assert!(now <= last, "dt={dt}: {now} > {last}");
                last = now;
            }
            assert!(last < 1e-3, "dt={dt}: still moving at {last}");
        }
    }

    #[test]
    fn long_frame_stops_instead_of_reversing() {
        let c = MotionController::default();
        let state = MotionState {
            position: Vec3::new(0.0, 1.6, 0.0),
            velocity: Vec3::new(0.0, 0.0, -1.0),
        };
        let next = c.advance(state, &InputState::new(), LOOK, 1.0);
        assert_eq!(next.velocity, Vec3::ZERO);
    }

    #[test]
    fn bounds_hold_under_arbitrary_input() {
        let c = MotionController::default();
        let room = *c.room();
        let mut rng = 0x5eed_u64;
        let mut state = c.spawn_state();
        for _ in 0..20_000 {
            let mask = splitmix64(&mut rng);
            let input = InputState::holding(
                MoveKey::ALL
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, k)| k),
            );
            let look = Vec3::new(
                unit(&mut rng) * 2.0 - 1.0,
                unit(&mut rng) * 2.0 - 1.0,
                unit(&mut rng) * 2.0 - 1.0,
            );
            let dt = unit(&mut rng) * 0.5;
            state = c.advance(state, &input, look, dt);
            assert!(room.contains(state.position), "{:?}", state.position);
        }
    }

    #[test]
    fn walk_forward_then_settle() {
        let c = MotionController::default();
        let room = *c.room();
        let forward = InputState::holding([MoveKey::Forward]);
        let mut state = center();
        for _ in 0..50 {
            state = c.advance(state, &forward, LOOK, 0.1);
            assert!(room.contains(state.position));
        }
        assert_eq!(state.position.x, 0.0);
        assert!(state.position.z < -9.0);
        assert_eq!(state.position.z, -room.walk_bound);

        let empty = InputState::new();
        let mut settled_after = None;
        for frame in 1..=10 {
            let prev = state.position;
            state = c.advance(state, &empty, LOOK, 0.1);
            if (state.position - prev).length() < 1e-3 {
                settled_after = Some(frame);
                break;
            }
        }
        assert!(settled_after.is_some());
    }

    #[test]
    fn short_walk_settles_within_a_second() {
        let c = MotionController::default();
        let forward = InputState::holding([MoveKey::Forward]);
        let mut state = center();
        for _ in 0..5 {
            state = c.advance(state, &forward, LOOK, 0.1);
        }
        assert!(state.position.z < 0.0 && state.position.z > -c.room().walk_bound);

        let empty = InputState::new();
        let mut prev = state.position;
        let mut settled = false;
        for _ in 0..10 {
            state = c.advance(state, &empty, LOOK, 0.1);
            let delta = (state.position - prev).length();
            prev = state.position;
            if delta < 1e-3 {
                settled = true;
                break;
            }
        }
        assert!(settled);
    }

    #[test]
    fn injected_position_is_clamped() {
        let c = MotionController::default();
        let mut camera = TestCamera {
            position: Vec3::new(40.0, 10.0, -40.0),
            look: LOOK,
        };
        let state = c.drive(c.spawn_state(), &InputState::new(), &mut camera, 0.016);
        assert_eq!(camera.position, Vec3::new(9.2, 3.5, -9.2));
        assert_eq!(state.position, camera.position);
    }

    #[test]
    fn drive_uses_camera_look() {
        let c = MotionController::default();
        let mut camera = TestCamera {
            position: Vec3::new(0.0, 1.6, 0.0),
            look: Vec3::X,
        };
        let input = InputState::holding([MoveKey::Forward]);
        c.drive(MotionState::default(), &input, &mut camera, 0.1);
        assert!(camera.position.x > 0.0);
        assert!(camera.position.z.abs() < 1e-6);
    }

    #[test]
    fn zero_dt_only_moves_by_existing_velocity() {
        let c = MotionController::default();
        let state = MotionState {
            position: Vec3::new(0.0, 1.6, 0.0),
            velocity: Vec3::new(0.1, 0.0, 0.0),
        };
        let next = c.advance(state, &InputState::holding([MoveKey::Forward]), LOOK, 0.0);
        assert_eq!(next.velocity, state.velocity);
        assert!((next.position.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn non_finite_position_respawns() {
        let c = MotionController::default();
        let state = MotionState::at(Vec3::new(f32::NAN, 1.6, 0.0));
        let next = c.advance(state, &InputState::new(), LOOK, 0.016);
        assert_eq!(next.position, c.spawn_state().position);
    }
}
