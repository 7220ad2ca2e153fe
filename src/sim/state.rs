//! Run lifecycle state
//!
//! `RunState` is the single state-context object for a run: phase, timing,
//! level parameters and obstacle toggles. It is owned by the top-level game
//! and passed into `frame`; the action methods below are the only mutators of
//! the phase-dependent fields.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SEGMENT_COUNT;
use crate::sim::level::ObstacleKind;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Marble on the start pad, timer not running
    Ready,
    /// Timer running
    Playing,
    /// Finish line crossed, timer frozen
    Ended,
}

/// Which obstacle kinds are eligible for course generation.
///
/// Invariant: at least one toggle stays enabled. Enforced by
/// [`RunState::update_toggles`], assumed (not re-checked) by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleToggles {
    pub limbo: bool,
    pub spinner: bool,
    pub axe: bool,
}

impl Default for ObstacleToggles {
    fn default() -> Self {
        Self {
            limbo: true,
            spinner: true,
            axe: true,
        }
    }
}

impl ObstacleToggles {
    /// Enabled kinds in fixed priority order (limbo, spinner, axe). The order
    /// carries no gameplay meaning but keeps generation reproducible in tests.
    pub fn enabled_kinds(&self) -> Vec<ObstacleKind> {
        let mut kinds = Vec::with_capacity(3);
        if self.limbo {
            kinds.push(ObstacleKind::Limbo);
        }
        if self.spinner {
            kinds.push(ObstacleKind::Spinner);
        }
        if self.axe {
            kinds.push(ObstacleKind::Axe);
        }
        kinds
    }

    pub fn enabled_count(&self) -> usize {
        usize::from(self.limbo) + usize::from(self.spinner) + usize::from(self.axe)
    }

    fn merged(self, update: ToggleUpdate) -> Self {
        Self {
            limbo: update.limbo.unwrap_or(self.limbo),
            spinner: update.spinner.unwrap_or(self.spinner),
            axe: update.axe.unwrap_or(self.axe),
        }
    }
}

/// Partial toggle change; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleUpdate {
    pub limbo: Option<bool>,
    pub spinner: Option<bool>,
    pub axe: Option<bool>,
}

impl ToggleUpdate {
    /// Update that sets every toggle (menu "save" semantics)
    pub fn all(toggles: ObstacleToggles) -> Self {
        Self {
            limbo: Some(toggles.limbo),
            spinner: Some(toggles.spinner),
            axe: Some(toggles.axe),
        }
    }
}

/// Complete run state
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub phase: RunPhase,
    /// Milliseconds since epoch; 0 = unset
    pub start_time: f64,
    /// Milliseconds since epoch; 0 = unset
    pub end_time: f64,
    /// Number of intermediate obstacle segments
    pub segment_count: u32,
    /// Change-detection token in [0, 1); forces a course rebuild after restart.
    /// Not fed into segment selection, which draws fresh randomness per build.
    pub course_seed: f64,
    pub toggles: ObstacleToggles,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_COUNT)
    }
}

impl RunState {
    pub fn new(segment_count: u32) -> Self {
        Self {
            phase: RunPhase::Ready,
            start_time: 0.0,
            end_time: 0.0,
            segment_count,
            course_seed: 0.0,
            toggles: ObstacleToggles::default(),
        }
    }

    pub fn with_toggles(segment_count: u32, toggles: ObstacleToggles) -> Self {
        Self {
            toggles,
            ..Self::new(segment_count)
        }
    }

    /// Ready -> Playing, stamping the run start. No-op from any other phase.
    pub fn start(&mut self, now_ms: f64) {
        if self.phase == RunPhase::Ready {
            self.phase = RunPhase::Playing;
            self.start_time = now_ms;
        }
    }

    /// Playing -> Ended, stamping the finish. No-op from any other phase.
    pub fn end(&mut self, now_ms: f64) {
        if self.phase == RunPhase::Playing {
            self.phase = RunPhase::Ended;
            self.end_time = now_ms;
        }
    }

    /// Playing|Ended -> Ready: clears both timestamps and redraws the course
    /// seed so the next frame rebuilds the course. No-op from Ready.
    pub fn restart(&mut self, rng: &mut impl Rng) {
        if matches!(self.phase, RunPhase::Playing | RunPhase::Ended) {
            self.phase = RunPhase::Ready;
            self.start_time = 0.0;
            self.end_time = 0.0;
            self.course_seed = rng.random::<f64>();
        }
    }

    /// Merge a partial toggle change. Rejected wholesale (returns false) when
    /// the prior set had exactly one enabled entry and the merge would leave
    /// none; matches the reference guard, asymmetry included.
    pub fn update_toggles(&mut self, update: ToggleUpdate) -> bool {
        let merged = self.toggles.merged(update);
        if self.toggles.enabled_count() == 1 && merged.enabled_count() == 0 {
            return false;
        }
        self.toggles = merged;
        true
    }

    /// Timer value in seconds: live while playing, frozen once ended, zero
    /// before the first start.
    pub fn elapsed_secs(&self, now_ms: f64) -> f64 {
        let ms = if self.phase == RunPhase::Playing {
            now_ms - self.start_time
        } else {
            self.end_time - self.start_time
        };
        ms / 1000.0
    }
}
