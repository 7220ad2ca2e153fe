//! Game simulation core
//!
//! Everything gameplay-shaped lives here, free of rendering and platform
//! dependencies:
//! - `state`: run lifecycle state machine (ready -> playing -> ended)
//! - `level`: procedural course generation and rebuild keying
//! - `motion`: kinematic obstacle motion policies
//! - `player`: marble controller and camera rig
//! - `tick`: per-frame orchestration

pub mod level;
pub mod motion;
pub mod player;
pub mod state;
pub mod tick;

pub use level::{Bounds, CourseKey, CourseLayout, ObstacleKind, ObstacleSlot};
pub use motion::{KinematicPose, MotionPolicy, Obstacle};
pub use player::{CameraRig, Player};
pub use state::{ObstacleToggles, RunPhase, RunState, ToggleUpdate};
pub use tick::{CourseRuntime, FrameClock, FrameInput, frame};
