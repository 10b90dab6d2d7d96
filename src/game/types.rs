// Shared enums and helper structs used by the game world and the main loop

use crate::config::{FIXED_DT, MAX_FRAME_TIME};
use glam::Vec2;

/// What a world tick ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Running,
    /// The ship was destroyed and respawned with a life less
    LifeLost,
    GameOver,
    Victory,
}

/// Score earned at a spot, shown as floating text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePopup {
    pub position: Vec2,
    pub score: u32,
}

/// Fixed timestep accumulator
///
/// Frame times are clamped to `MAX_FRAME_TIME` so a stall never turns into a
/// burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_frame: f32,
    accumulator: f32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        FixedTimestep::new(FIXED_DT, MAX_FRAME_TIME)
    }
}

impl FixedTimestep {
    pub fn new(step: f32, max_frame: f32) -> Self {
        FixedTimestep {
            step,
            max_frame,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Adds a frame's time and returns how many fixed ticks to run
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.clamp(0.0, self.max_frame);
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }

    /// Leftover fraction of a step, for interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
