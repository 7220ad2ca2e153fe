//! Obstacle motion policies
//!
//! Each obstacle bar follows a pure function of elapsed time plus per-instance
//! parameters drawn once at construction. Every frame the resulting pose is
//! pushed to the physics collaborator as a kinematic target; nothing here is
//! velocity-driven.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::Rng;

use crate::consts::*;
use crate::physics::KinematicBody;
use crate::sim::level::ObstacleKind;

/// Pose commanded to a kinematic body for the next physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Per-instance motion parameters. Drawn once, never re-randomized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionPolicy {
    /// Yaw = elapsed * speed; speed magnitude >= 0.2, sign random
    Spinner { speed: f32 },
    /// Bar height = sin(elapsed + phase) + rest height
    Limbo { phase: f32 },
    /// Pendulum x = sin(elapsed + phase) * amplitude
    Axe { phase: f32 },
}

impl MotionPolicy {
    pub fn draw(kind: ObstacleKind, rng: &mut impl Rng) -> Self {
        match kind {
            ObstacleKind::Spinner => {
                let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                MotionPolicy::Spinner {
                    speed: (rng.random::<f32>() + SPINNER_MIN_SPEED) * sign,
                }
            }
            ObstacleKind::Limbo => MotionPolicy::Limbo {
                phase: rng.random::<f32>() * TAU,
            },
            ObstacleKind::Axe => MotionPolicy::Axe {
                phase: rng.random::<f32>() * TAU,
            },
        }
    }

    /// Pose for a bar whose segment floor is centred at `base`, `elapsed`
    /// seconds into the scene clock.
    pub fn pose_at(&self, base: Vec3, elapsed: f32) -> KinematicPose {
        match *self {
            MotionPolicy::Spinner { speed } => KinematicPose {
                translation: base + Vec3::new(0.0, OBSTACLE_REST_HEIGHT, 0.0),
                rotation: Quat::from_rotation_y(elapsed * speed),
            },
            MotionPolicy::Limbo { phase } => KinematicPose {
                translation: base
                    + Vec3::new(0.0, (elapsed + phase).sin() + LIMBO_BASE_HEIGHT, 0.0),
                rotation: Quat::IDENTITY,
            },
            MotionPolicy::Axe { phase } => KinematicPose {
                translation: base
                    + Vec3::new((elapsed + phase).sin() * AXE_AMPLITUDE, AXE_HEIGHT, 0.0),
                rotation: Quat::IDENTITY,
            },
        }
    }
}

/// A placed obstacle: segment slot, sampled policy and the exclusively-owned
/// kinematic body it drives.
#[derive(Debug, Clone)]
pub struct Obstacle<B: KinematicBody> {
    pub kind: ObstacleKind,
    pub base: Vec3,
    policy: MotionPolicy,
    pub body: B,
}

impl<B: KinematicBody> Obstacle<B> {
    pub fn new(kind: ObstacleKind, base: Vec3, body: B, rng: &mut impl Rng) -> Self {
        Self {
            kind,
            base,
            policy: MotionPolicy::draw(kind, rng),
            body,
        }
    }

    /// Re-evaluate the policy and command the pose for this frame
    pub fn drive(&mut self, elapsed: f32) {
        let pose = self.policy.pose_at(self.base, elapsed);
        self.body.set_next_kinematic_translation(pose.translation);
        self.body.set_next_kinematic_rotation(pose.rotation);
    }
}
