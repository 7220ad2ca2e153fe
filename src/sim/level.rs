//! Course generation
//!
//! A course is a start pad, `segment_count` obstacle segments and a finish
//! pad laid out along -Z at a fixed spacing, fenced by boundary geometry that
//! is a pure function of the segment count. Obstacle kinds are drawn uniformly
//! (with replacement) from the enabled-kind list; the draws use fresh
//! randomness per build, the run's `course_seed` only decides *when* to build.

use glam::Vec3;
use rand::Rng;

use crate::consts::*;
use crate::sim::state::{ObstacleToggles, RunState};

/// The three obstacle varieties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Bar oscillating vertically
    Limbo,
    /// Bar rotating about the vertical axis
    Spinner,
    /// Pendulum swinging across the track
    Axe,
}

/// One generated obstacle segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSlot {
    pub kind: ObstacleKind,
    /// Segment origin (floor centre)
    pub position: Vec3,
}

/// Side walls and floor collider spanning the whole course.
/// Everything here derives from the segment count alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Total segments including start and finish pads
    pub length: u32,
    /// Z extent of the side walls
    pub wall_length: f32,
    /// Z centre of the side walls
    pub wall_center_z: f32,
    /// Back wall behind the finish pad
    pub far_wall_z: f32,
    pub floor_center: Vec3,
    pub floor_half_extents: Vec3,
}

impl Bounds {
    pub fn new(segment_count: u32) -> Self {
        let length = segment_count + 2;
        let len = length as f32;
        Self {
            length,
            wall_length: SEGMENT_SPACING * len,
            wall_center_z: -(len * 2.0) + 2.0,
            far_wall_z: -(len * SEGMENT_SPACING) + 2.0,
            floor_center: Vec3::new(0.0, -0.1, -(len * 2.0) + 2.0),
            floor_half_extents: Vec3::new(FLOOR_HALF_WIDTH, 0.1, 2.0 * len),
        }
    }
}

/// A fully assembled course. Recomputed whole whenever the segment count, the
/// toggle set or the course seed changes; never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseLayout {
    pub segment_count: u32,
    /// Start pad origin
    pub start_position: Vec3,
    pub obstacles: Vec<ObstacleSlot>,
    /// Finish pad origin
    pub finish_position: Vec3,
    pub bounds: Bounds,
}

impl CourseLayout {
    /// Generate a course of `segment_count` obstacle segments.
    ///
    /// Precondition: `kinds` is non-empty. The toggle guard on [`RunState`]
    /// guarantees this; no validation happens here.
    pub fn generate(segment_count: u32, kinds: &[ObstacleKind], rng: &mut impl Rng) -> Self {
        let obstacles = (0..segment_count)
            .map(|i| ObstacleSlot {
                kind: kinds[rng.random_range(0..kinds.len())],
                position: Vec3::new(0.0, 0.0, -((i + 1) as f32) * SEGMENT_SPACING),
            })
            .collect();

        Self {
            segment_count,
            start_position: Vec3::ZERO,
            obstacles,
            finish_position: Vec3::new(
                0.0,
                0.0,
                -((segment_count + 1) as f32) * SEGMENT_SPACING,
            ),
            bounds: Bounds::new(segment_count),
        }
    }

    /// Crossing below this Z counts as reaching the finish
    pub fn finish_line_z(segment_count: u32) -> f32 {
        -(segment_count as f32 * SEGMENT_SPACING + 2.0)
    }
}

/// Rebuild trigger: the course is regenerated exactly when this key changes
/// and reused otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseKey {
    segment_count: u32,
    toggles: ObstacleToggles,
    seed_bits: u64,
}

impl CourseKey {
    pub fn of(state: &RunState) -> Self {
        Self {
            segment_count: state.segment_count,
            toggles: state.toggles,
            seed_bits: state.course_seed.to_bits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(99)
    }

    #[test]
    fn test_singleton_kind_fills_every_slot() {
        let course = CourseLayout::generate(5, &[ObstacleKind::Axe], &mut rng());
        assert_eq!(course.obstacles.len(), 5);
        assert!(course.obstacles.iter().all(|s| s.kind == ObstacleKind::Axe));
    }

    #[test]
    fn test_selection_stays_within_available() {
        let kinds = [ObstacleKind::Limbo, ObstacleKind::Spinner];
        let mut rng = rng();
        for count in [0u32, 1, 7, 40] {
            let course = CourseLayout::generate(count, &kinds, &mut rng);
            assert_eq!(course.obstacles.len(), count as usize);
            assert!(course.obstacles.iter().all(|s| kinds.contains(&s.kind)));
        }
    }

    #[test]
    fn test_limbo_only_scenario() {
        // 3 segments, only limbo enabled: slots at -4/-8/-12, finish at -16
        let toggles = ObstacleToggles {
            limbo: true,
            spinner: false,
            axe: false,
        };
        let course = CourseLayout::generate(3, &toggles.enabled_kinds(), &mut rng());

        assert_eq!(course.start_position, Vec3::ZERO);
        assert_eq!(course.obstacles.len(), 3);
        for (i, slot) in course.obstacles.iter().enumerate() {
            assert_eq!(slot.kind, ObstacleKind::Limbo);
            assert_eq!(slot.position.z, -((i + 1) as f32) * 4.0);
        }
        assert_eq!(course.finish_position.z, -16.0);
    }

    #[test]
    fn test_bounds_scale_with_count() {
        let bounds = Bounds::new(5);
        assert_eq!(bounds.length, 7);
        assert_eq!(bounds.wall_length, 28.0);
        assert_eq!(bounds.wall_center_z, -12.0);
        assert_eq!(bounds.far_wall_z, -26.0);
        assert_eq!(bounds.floor_half_extents, Vec3::new(2.0, 0.1, 14.0));
        assert_eq!(bounds.floor_center, Vec3::new(0.0, -0.1, -12.0));
    }

    #[test]
    fn test_finish_line_past_last_obstacle() {
        // The threshold sits between the last obstacle and the finish pad
        let z = CourseLayout::finish_line_z(5);
        assert_eq!(z, -22.0);
        let course = CourseLayout::generate(5, &[ObstacleKind::Spinner], &mut rng());
        assert!(z < course.obstacles.last().unwrap().position.z);
        assert!(z > course.finish_position.z);
    }

    #[test]
    fn test_key_changes_with_seed_and_toggles() {
        let mut state = RunState::new(5);
        let key = CourseKey::of(&state);
        assert_eq!(key, CourseKey::of(&state));

        state.course_seed = 0.25;
        let reseeded = CourseKey::of(&state);
        assert_ne!(key, reseeded);

        state.toggles.axe = false;
        assert_ne!(reseeded, CourseKey::of(&state));
    }
}
