//! Player marble controller
//!
//! Impulse-based movement, grounded jump via a downward ray, spawn reset,
//! finish/fall detection and the single camera smoothing rule. All physics
//! access goes through the collaborator traits.

use glam::Vec3;

use crate::consts::*;
use crate::physics::{RayCast, RigidBody};
use crate::sim::level::CourseLayout;
use crate::sim::tick::FrameInput;
use crate::smooth_toward;

/// Smoothed camera pose handed to the renderer each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// The player marble and its camera state
#[derive(Debug, Clone)]
pub struct Player<B: RigidBody> {
    pub body: B,
    cam_position: Vec3,
    cam_target: Vec3,
}

impl<B: RigidBody> Player<B> {
    pub fn new(body: B) -> Self {
        Self {
            body,
            // Far away on purpose; the first frames sweep the camera in
            cam_position: Vec3::new(10.0, 10.0, 10.0),
            cam_target: Vec3::ZERO,
        }
    }

    /// Apply movement impulses and rolling torque for the held keys
    pub fn apply_movement(&mut self, input: &FrameInput, dt: f32) {
        let impulse_strength = IMPULSE_STRENGTH * dt;
        let torque_strength = TORQUE_STRENGTH * dt;

        let mut impulse = Vec3::ZERO;
        let mut torque = Vec3::ZERO;

        if input.forward {
            impulse.z -= impulse_strength;
            torque.x -= torque_strength;
        }
        if input.rightward {
            impulse.x += impulse_strength;
            torque.z -= torque_strength;
        }
        if input.backward {
            impulse.z += impulse_strength;
            torque.x += torque_strength;
        }
        if input.leftward {
            impulse.x -= impulse_strength;
            torque.z += torque_strength;
        }

        self.body.apply_impulse(impulse, true);
        self.body.apply_torque_impulse(torque, true);
    }

    /// Jump if the downward ray says we are grounded
    pub fn try_jump(&mut self, ground: &impl RayCast) {
        let mut origin = self.body.translation();
        origin.y -= JUMP_RAY_OFFSET;

        if let Some(toi) = ground.cast_ray_down(origin, 10.0) {
            if toi < GROUNDED_TOI {
                self.body
                    .apply_impulse(Vec3::new(0.0, JUMP_IMPULSE, 0.0), true);
            }
        }
    }

    /// Put the marble back on the start pad, motionless
    pub fn reset(&mut self) {
        self.body.set_translation(PLAYER_SPAWN, false);
        self.body.set_linvel(Vec3::ZERO, false);
        self.body.set_angvel(Vec3::ZERO, false);
    }

    /// Advance camera smoothing toward the marble and return the rig
    pub fn update_camera(&mut self, dt: f32) -> CameraRig {
        let pos = self.body.translation();
        self.cam_position = smooth_toward(self.cam_position, pos + CAMERA_OFFSET, CAMERA_SMOOTHING, dt);
        self.cam_target =
            smooth_toward(self.cam_target, pos + CAMERA_TARGET_OFFSET, CAMERA_SMOOTHING, dt);

        CameraRig {
            position: self.cam_position,
            look_at: self.cam_target,
        }
    }

    /// Past the finish line for a course of `segment_count` segments
    pub fn reached_finish(&self, segment_count: u32) -> bool {
        self.body.translation().z < CourseLayout::finish_line_z(segment_count)
    }

    /// Fallen off the course (expected gameplay event, triggers a restart)
    pub fn fell_off(&self) -> bool {
        self.body.translation().y < FALL_LIMIT_Y
    }
}
