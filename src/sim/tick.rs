//! Per-frame orchestration
//!
//! One `frame` call per rendered frame, single-threaded. Input-derived state
//! actions run first, then the course sync, then physics commands and camera
//! smoothing, then finish/fall detection; state mutation strictly precedes
//! same-frame consumption.

use rand::Rng;

use crate::physics::{KinematicBody, RayCast, RigidBody};
use crate::sim::level::{CourseKey, CourseLayout, ObstacleKind};
use crate::sim::motion::Obstacle;
use crate::sim::player::{CameraRig, Player};
use crate::sim::state::{RunPhase, RunState};
use glam::Vec3;

/// Input sampled once per frame. Movement keys are level-triggered; the rest
/// are one-shot edges the driver clears after the frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
    /// One-shot: jump attempt this frame
    pub jump: bool,
    /// One-shot: restart requested (key or UI)
    pub restart: bool,
    /// One-shot: menu toggle (handled by the UI layer, not the sim)
    pub menu: bool,
}

impl FrameInput {
    /// Any input that should start a ready run
    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.leftward || self.rightward || self.jump
    }

    /// Clear the edge-triggered flags once a frame has consumed them
    pub fn clear_one_shot(&mut self) {
        self.jump = false;
        self.restart = false;
        self.menu = false;
    }
}

/// Clock values for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    /// Wall clock, milliseconds since epoch (timer stamps)
    pub now_ms: f64,
    /// Scene clock, seconds since startup (obstacle animation)
    pub elapsed_secs: f32,
    /// Frame delta in seconds
    pub dt: f32,
}

/// The built course plus its rebuild key.
///
/// `sync` is the memoization seam: the course is regenerated exactly when the
/// `(segment_count, toggles, course_seed)` key changes and reused otherwise.
pub struct CourseRuntime<K: KinematicBody> {
    key: Option<CourseKey>,
    layout: Option<CourseLayout>,
    obstacles: Vec<Obstacle<K>>,
}

impl<K: KinematicBody> Default for CourseRuntime<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KinematicBody> CourseRuntime<K> {
    pub fn new() -> Self {
        Self {
            key: None,
            layout: None,
            obstacles: Vec::new(),
        }
    }

    pub fn layout(&self) -> Option<&CourseLayout> {
        self.layout.as_ref()
    }

    pub fn obstacles(&self) -> &[Obstacle<K>] {
        &self.obstacles
    }

    /// Rebuild if the run parameters changed; returns whether a rebuild ran
    pub fn sync<R, F>(&mut self, state: &RunState, rng: &mut R, spawn: &mut F) -> bool
    where
        R: Rng,
        F: FnMut(ObstacleKind, Vec3) -> K,
    {
        let key = CourseKey::of(state);
        if self.key == Some(key) {
            return false;
        }

        let layout =
            CourseLayout::generate(state.segment_count, &state.toggles.enabled_kinds(), rng);
        self.obstacles = layout
            .obstacles
            .iter()
            .map(|slot| Obstacle::new(slot.kind, slot.position, spawn(slot.kind, slot.position), rng))
            .collect();
        log::info!(
            "course rebuilt: {} segments, kinds {:?}",
            layout.segment_count,
            state.toggles.enabled_kinds()
        );
        self.layout = Some(layout);
        self.key = Some(key);
        true
    }

    /// Command every obstacle's kinematic pose for this frame
    pub fn drive(&mut self, elapsed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.drive(elapsed);
        }
    }
}

/// Advance one frame. Returns the camera rig for the renderer.
#[allow(clippy::too_many_arguments)]
pub fn frame<B, K, Q, R, F>(
    state: &mut RunState,
    course: &mut CourseRuntime<K>,
    player: &mut Player<B>,
    input: &FrameInput,
    ground: &Q,
    spawn: &mut F,
    rng: &mut R,
    clock: FrameClock,
) -> CameraRig
where
    B: RigidBody,
    K: KinematicBody,
    Q: RayCast,
    R: Rng,
    F: FnMut(ObstacleKind, Vec3) -> K,
{
    // 1. Input-derived actions
    if input.restart {
        player.reset();
        state.restart(rng);
    }
    if input.any_movement() {
        state.start(clock.now_ms);
    }

    // 2. Course sync; a rebuild while Ready also respawns the marble
    // (covers restarts requested outside the frame, e.g. from the menu)
    if course.sync(state, rng, spawn) && state.phase == RunPhase::Ready {
        player.reset();
    }

    // 3. Player forces
    player.apply_movement(input, clock.dt);
    if input.jump {
        player.try_jump(ground);
    }

    // 4. Obstacle kinematics
    course.drive(clock.elapsed_secs);

    // 5. Camera
    let camera = player.update_camera(clock.dt);

    // 6. Lifecycle events from the new body position
    if player.reached_finish(state.segment_count) {
        state.end(clock.now_ms);
    }
    if player.fell_off() {
        player.reset();
        state.restart(rng);
    }

    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{CommandPose, CourseGround, MarbleBody};
    use crate::sim::state::ToggleUpdate;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Harness {
        state: RunState,
        course: CourseRuntime<CommandPose>,
        player: Player<MarbleBody>,
        ground: CourseGround,
        rng: Pcg32,
        spawned: usize,
        now_ms: f64,
        elapsed: f32,
    }

    impl Harness {
        fn new(segment_count: u32) -> Self {
            Self {
                state: RunState::new(segment_count),
                course: CourseRuntime::new(),
                player: Player::new(MarbleBody::new()),
                ground: CourseGround::new(segment_count),
                rng: Pcg32::seed_from_u64(17),
                spawned: 0,
                now_ms: 1_000.0,
                elapsed: 0.0,
            }
        }

        fn frame(&mut self, input: FrameInput) -> CameraRig {
            let dt = 1.0 / 60.0;
            self.now_ms += f64::from(dt) * 1000.0;
            self.elapsed += dt;
            let spawned = &mut self.spawned;
            frame(
                &mut self.state,
                &mut self.course,
                &mut self.player,
                &input,
                &self.ground,
                &mut |_, _| {
                    *spawned += 1;
                    CommandPose::default()
                },
                &mut self.rng,
                FrameClock {
                    now_ms: self.now_ms,
                    elapsed_secs: self.elapsed,
                    dt,
                },
            )
        }
    }

    #[test]
    fn test_first_frame_builds_course() {
        let mut h = Harness::new(5);
        h.frame(FrameInput::default());
        assert_eq!(h.course.obstacles().len(), 5);
        assert_eq!(h.spawned, 5);
        assert_eq!(h.course.layout().unwrap().segment_count, 5);
    }

    #[test]
    fn test_idle_frames_reuse_course() {
        let mut h = Harness::new(5);
        for _ in 0..10 {
            h.frame(FrameInput::default());
        }
        // Built once, memoized after
        assert_eq!(h.spawned, 5);
    }

    #[test]
    fn test_first_movement_starts_run() {
        let mut h = Harness::new(5);
        h.frame(FrameInput::default());
        assert_eq!(h.state.phase, RunPhase::Ready);

        h.frame(FrameInput {
            forward: true,
            ..Default::default()
        });
        assert_eq!(h.state.phase, RunPhase::Playing);
        assert!(h.state.start_time > 0.0);
        assert!(h.player.body.linvel().z < 0.0);
    }

    #[test]
    fn test_crossing_finish_ends_run() {
        let mut h = Harness::new(3);
        h.frame(FrameInput {
            forward: true,
            ..Default::default()
        });

        // Teleport past the finish line (z < -14 for 3 segments)
        h.player
            .body
            .set_translation(glam::Vec3::new(0.0, 1.0, -14.5), false);
        h.frame(FrameInput::default());
        assert_eq!(h.state.phase, RunPhase::Ended);

        let frozen = h.state.elapsed_secs(h.now_ms);
        for _ in 0..20 {
            h.frame(FrameInput::default());
        }
        assert_eq!(h.state.elapsed_secs(h.now_ms), frozen);
    }

    #[test]
    fn test_falling_restarts_and_rebuilds() {
        let mut h = Harness::new(5);
        h.frame(FrameInput {
            forward: true,
            ..Default::default()
        });
        let seed_before = h.state.course_seed;

        h.player
            .body
            .set_translation(glam::Vec3::new(0.0, -5.0, -8.0), false);
        h.frame(FrameInput::default());
        assert_eq!(h.state.phase, RunPhase::Ready);
        assert_ne!(h.state.course_seed, seed_before);
        assert_eq!(h.player.body.translation(), crate::consts::PLAYER_SPAWN);

        // Seed change forces a rebuild on the following frame
        let spawned_before = h.spawned;
        h.frame(FrameInput::default());
        assert_eq!(h.spawned, spawned_before + 5);
    }

    #[test]
    fn test_restart_key_resets_run() {
        let mut h = Harness::new(5);
        h.frame(FrameInput {
            forward: true,
            ..Default::default()
        });
        assert_eq!(h.state.phase, RunPhase::Playing);

        h.frame(FrameInput {
            restart: true,
            ..Default::default()
        });
        // restart wins even though the frame carries no movement; the marble
        // is back on the pad with both stamps cleared
        assert_eq!(h.state.phase, RunPhase::Ready);
        assert_eq!(h.state.start_time, 0.0);
        assert_eq!(h.player.body.translation(), crate::consts::PLAYER_SPAWN);
    }

    #[test]
    fn test_toggle_change_rebuilds_course() {
        let mut h = Harness::new(4);
        h.frame(FrameInput::default());
        assert_eq!(h.spawned, 4);

        h.state.update_toggles(ToggleUpdate {
            spinner: Some(false),
            axe: Some(false),
            ..Default::default()
        });
        h.frame(FrameInput::default());
        assert_eq!(h.spawned, 8);
        assert!(
            h.course
                .obstacles()
                .iter()
                .all(|o| o.kind == ObstacleKind::Limbo)
        );
    }

    #[test]
    fn test_obstacles_receive_poses() {
        let mut h = Harness::new(2);
        h.frame(FrameInput::default());
        for obstacle in h.course.obstacles() {
            // Every bar was commanded somewhere above its slot
            assert!(obstacle.body.translation.y > 0.0);
            assert_eq!(obstacle.body.translation.z, obstacle.base.z);
        }
    }

    #[test]
    fn test_camera_follows_marble() {
        let mut h = Harness::new(5);
        let mut last = h.frame(FrameInput::default());
        for _ in 0..240 {
            last = h.frame(FrameInput::default());
        }
        // Marble rests near spawn; rig has converged to the fixed offsets
        let pos = h.player.body.translation();
        assert!(last.position.distance(pos + crate::consts::CAMERA_OFFSET) < 0.2);
    }
}
