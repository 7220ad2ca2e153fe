//! Marble Run - a browser-based 3D obstacle-course race
//!
//! Core modules:
//! - `sim`: run lifecycle, level generation, obstacle motion, player control
//! - `physics`: collaborator seam (rigid-body / ray-cast traits) plus the
//!   reference in-crate backing used by the demo loop and tests
//! - `settings`: persisted preferences (LocalStorage on web)

pub mod physics;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{CourseLayout, FrameInput, ObstacleKind, ObstacleToggles, RunPhase, RunState};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Number of intermediate obstacle segments in a fresh run
    pub const DEFAULT_SEGMENT_COUNT: u32 = 20;
    /// World-unit length of one course segment along -Z
    pub const SEGMENT_SPACING: f32 = 4.0;

    /// Marble defaults
    pub const PLAYER_RADIUS: f32 = 0.3;
    pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    /// Movement impulse per second of frame time
    pub const IMPULSE_STRENGTH: f32 = 0.6;
    /// Rolling torque impulse per second of frame time
    pub const TORQUE_STRENGTH: f32 = 0.2;
    /// Upward impulse applied on a grounded jump
    pub const JUMP_IMPULSE: f32 = 0.5;
    /// Ground ray starts this far below the body centre
    pub const JUMP_RAY_OFFSET: f32 = 0.31;
    /// Grounded when the downward ray hits within this time of impact
    pub const GROUNDED_TOI: f32 = 0.15;
    /// Falling below this height aborts the run
    pub const FALL_LIMIT_Y: f32 = -4.0;

    /// Camera rig
    pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 0.65, 2.25);
    pub const CAMERA_TARGET_OFFSET: Vec3 = Vec3::new(0.0, 0.25, 0.0);
    /// Lerp rate per second for camera smoothing
    pub const CAMERA_SMOOTHING: f32 = 5.0;

    /// Obstacle bars rest this high above their segment floor
    pub const OBSTACLE_REST_HEIGHT: f32 = 0.3;
    /// Spinner angular speed magnitude is at least this
    pub const SPINNER_MIN_SPEED: f32 = 0.2;
    /// Limbo bar oscillates around this height
    pub const LIMBO_BASE_HEIGHT: f32 = 1.15;
    /// Axe pendulum swing amplitude along X
    pub const AXE_AMPLITUDE: f32 = 1.25;
    /// Axe pendulum pivot height
    pub const AXE_HEIGHT: f32 = 0.75;

    /// Side walls sit at x = +/- this
    pub const WALL_OFFSET_X: f32 = 2.15;
    pub const WALL_HEIGHT: f32 = 1.5;
    pub const WALL_THICKNESS: f32 = 0.3;
    /// Half-width of the playable floor
    pub const FLOOR_HALF_WIDTH: f32 = 2.0;
}

/// Exponential smoothing step toward `target` at `rate` per second
#[inline]
pub fn smooth_toward(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, (rate * dt).clamp(0.0, 1.0))
}
