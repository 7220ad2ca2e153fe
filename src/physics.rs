//! Physics collaborator seam
//!
//! The simulation never talks to a physics engine directly; it goes through the
//! narrow traits below (body transforms, impulses, kinematic targets, a single
//! downward ray query). The structs in this module are the reference backing:
//! plain value stores plus a deliberately minimal integrator, enough to drive
//! the browser demo and the test suite. A real engine slots in behind the same
//! traits.

use glam::{Quat, Vec3};

use crate::consts::*;

/// A force-integrated body (the marble)
pub trait RigidBody {
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, pos: Vec3, wake: bool);
    fn linvel(&self) -> Vec3;
    fn set_linvel(&mut self, vel: Vec3, wake: bool);
    fn angvel(&self) -> Vec3;
    fn set_angvel(&mut self, vel: Vec3, wake: bool);
    fn apply_impulse(&mut self, impulse: Vec3, wake: bool);
    fn apply_torque_impulse(&mut self, torque: Vec3, wake: bool);
}

/// A pose-commanded body (obstacle bars), not driven by force integration
pub trait KinematicBody {
    fn set_next_kinematic_translation(&mut self, pos: Vec3);
    fn set_next_kinematic_rotation(&mut self, rot: Quat);
}

/// Downward ray query against the course geometry
pub trait RayCast {
    /// Cast a ray straight down from `origin`. Returns the time of impact in
    /// world units, or `None` if nothing is hit within `max_toi`.
    fn cast_ray_down(&self, origin: Vec3, max_toi: f32) -> Option<f32>;
}

/// Reference dynamic body: unit mass, value semantics.
///
/// `step` integrates gravity, rapier-style velocity damping and floor contact.
/// That is all the "engine" the demo needs; it is not a collision solver.
#[derive(Debug, Clone)]
pub struct MarbleBody {
    pos: Vec3,
    linvel: Vec3,
    angvel: Vec3,
    linear_damping: f32,
    angular_damping: f32,
}

impl Default for MarbleBody {
    fn default() -> Self {
        Self {
            pos: PLAYER_SPAWN,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            linear_damping: 0.5,
            angular_damping: 0.5,
        }
    }
}

impl MarbleBody {
    const GRAVITY: f32 = -9.81;

    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame: gravity, damping, floor contact.
    pub fn step(&mut self, dt: f32, ground: &impl RayCast) {
        self.linvel.y += Self::GRAVITY * dt;
        self.linvel *= 1.0 / (1.0 + self.linear_damping * dt);
        self.angvel *= 1.0 / (1.0 + self.angular_damping * dt);
        self.pos += self.linvel * dt;

        // Rest on the course floor while over it
        if let Some(toi) = ground.cast_ray_down(self.pos, PLAYER_RADIUS * 2.0) {
            if toi < PLAYER_RADIUS && self.linvel.y < 0.0 {
                self.pos.y += PLAYER_RADIUS - toi;
                self.linvel.y = 0.0;
            }
        }
    }
}

impl RigidBody for MarbleBody {
    fn translation(&self) -> Vec3 {
        self.pos
    }

    fn set_translation(&mut self, pos: Vec3, _wake: bool) {
        self.pos = pos;
    }

    fn linvel(&self) -> Vec3 {
        self.linvel
    }

    fn set_linvel(&mut self, vel: Vec3, _wake: bool) {
        self.linvel = vel;
    }

    fn angvel(&self) -> Vec3 {
        self.angvel
    }

    fn set_angvel(&mut self, vel: Vec3, _wake: bool) {
        self.angvel = vel;
    }

    fn apply_impulse(&mut self, impulse: Vec3, _wake: bool) {
        self.linvel += impulse;
    }

    fn apply_torque_impulse(&mut self, torque: Vec3, _wake: bool) {
        self.angvel += torque;
    }
}

/// Reference kinematic body: stores the last commanded pose for the renderer
/// (and the physics engine, when one is attached) to read back.
#[derive(Debug, Clone, Default)]
pub struct CommandPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl KinematicBody for CommandPose {
    fn set_next_kinematic_translation(&mut self, pos: Vec3) {
        self.translation = pos;
    }

    fn set_next_kinematic_rotation(&mut self, rot: Quat) {
        self.rotation = rot;
    }
}

/// Analytic ray query against the flat course floor.
///
/// The floor top sits at y = 0 and spans the bounds rectangle computed from the
/// segment count; anything cast from outside that rectangle misses.
#[derive(Debug, Clone, Copy)]
pub struct CourseGround {
    half_width: f32,
    /// Near edge of the floor (start-segment side, +Z)
    z_near: f32,
    /// Far edge past the finish segment (-Z)
    z_far: f32,
}

/// Full thickness of the floor collider slab (top at y = 0)
const FLOOR_THICKNESS: f32 = 0.2;

impl CourseGround {
    pub fn new(segment_count: u32) -> Self {
        let length = (segment_count + 2) as f32;
        Self {
            half_width: FLOOR_HALF_WIDTH,
            z_near: SEGMENT_SPACING / 2.0,
            z_far: SEGMENT_SPACING / 2.0 - length * SEGMENT_SPACING,
        }
    }
}

impl RayCast for CourseGround {
    fn cast_ray_down(&self, origin: Vec3, max_toi: f32) -> Option<f32> {
        if origin.x.abs() > self.half_width {
            return None;
        }
        if origin.z > self.z_near || origin.z < self.z_far {
            return None;
        }
        // Solid cast: starting inside the floor slab reports immediate impact
        if origin.y < 0.0 {
            return (origin.y >= -FLOOR_THICKNESS).then_some(0.0);
        }
        if origin.y > max_toi {
            return None;
        }
        Some(origin.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_accumulates_velocity() {
        let mut body = MarbleBody::new();
        body.apply_impulse(Vec3::new(0.0, 0.0, -0.6), true);
        body.apply_impulse(Vec3::new(0.0, 0.0, -0.4), true);
        assert!((body.linvel().z - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_ground_ray_over_floor() {
        let ground = CourseGround::new(5);
        // Spawn height, over the start segment
        let toi = ground.cast_ray_down(Vec3::new(0.0, 1.0, 0.0), 10.0);
        assert_eq!(toi, Some(1.0));
    }

    #[test]
    fn test_ground_ray_off_course() {
        let ground = CourseGround::new(5);
        // Past the side wall
        assert!(ground.cast_ray_down(Vec3::new(3.0, 1.0, 0.0), 10.0).is_none());
        // Past the far wall (course length 7 segments -> far edge at -26)
        assert!(
            ground
                .cast_ray_down(Vec3::new(0.0, 1.0, -30.0), 10.0)
                .is_none()
        );
    }

    #[test]
    fn test_ground_ray_solid_inside_floor() {
        let ground = CourseGround::new(5);
        // Jump rays start just below a rested marble, inside the slab
        assert_eq!(
            ground.cast_ray_down(Vec3::new(0.0, -0.01, 0.0), 10.0),
            Some(0.0)
        );
        assert!(
            ground
                .cast_ray_down(Vec3::new(0.0, -1.0, 0.0), 10.0)
                .is_none()
        );
    }

    #[test]
    fn test_marble_settles_on_floor() {
        let ground = CourseGround::new(5);
        let mut body = MarbleBody::new();
        for _ in 0..600 {
            body.step(1.0 / 60.0, &ground);
        }
        let y = body.translation().y;
        assert!((y - PLAYER_RADIUS).abs() < 0.05, "rested at y = {y}");
        assert!(body.linvel().y.abs() < 0.01);
    }
}
