//! Score-driven difficulty ramp
//!
//! Every `everyScore` points the world gets one step harder: faster scroll,
//! tighter gaps, closer chimneys. Each value is clamped to its configured bound.

use crate::chapter::{BaseConfig, RampConfig};
use crate::consts::{TICKS_PER_SECOND, VELOCITY_SCALE};

/// Difficulty values derived from the current score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// Completed ramp steps
    pub steps: u64,
    /// Scroll speed in px per 60 Hz frame
    pub scroll_speed: f32,
    /// Vertical gap (px)
    pub obstacle_gap: f32,
    /// Horizontal distance between pairs (px)
    pub obstacle_spacing: f32,
}

impl Difficulty {
    /// Horizontal velocity of newly spawned entities (px/s, leftward)
    pub fn entity_velocity_x(&self) -> f32 {
        -self.scroll_speed * VELOCITY_SCALE
    }

    /// Ticks between spawn events: time for the world to scroll one spacing
    pub fn spawn_interval_ticks(&self) -> u64 {
        let px_per_sec = self.scroll_speed * VELOCITY_SCALE;
        if px_per_sec <= 0.0 {
            return TICKS_PER_SECOND;
        }
        let secs = self.obstacle_spacing / px_per_sec;
        ((secs * TICKS_PER_SECOND as f32).round() as u64).max(1)
    }
}

/// Compute difficulty for a cumulative score
pub fn difficulty_for_score(score: u64, base: &BaseConfig, ramp: &RampConfig) -> Difficulty {
    let every = ramp.every_score.max(1) as u64;
    let steps = score / every;
    let s = steps as f32;

    // Bounded on both sides so a ramp can never run backwards
    let scroll_speed = (base.scroll_speed + s * ramp.scroll_speed_add)
        .max(base.scroll_speed)
        .min(ramp.max_scroll_speed);
    let obstacle_gap = (base.obstacle_gap - s * ramp.gap_subtract)
        .min(base.obstacle_gap)
        .max(ramp.min_gap);
    let obstacle_spacing = (base.obstacle_spacing - s * ramp.spacing_subtract)
        .min(base.obstacle_spacing)
        .max(ramp.min_spacing);

    Difficulty {
        steps,
        scroll_speed,
        obstacle_gap,
        obstacle_spacing,
    }
}
