//! Ho-Ho-Honk - An endless chimney-flapper
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ramp, spawning, fire gates, combo, player)
//! - `chapter`: Data-driven chapter config (difficulty, variants, collectibles)
//! - `session`: Engine adapter owning one run, restart and mute

pub mod chapter;
pub mod session;
pub mod sim;

pub use chapter::{Chapter, ChapterConfig, ChapterError};
pub use session::Session;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Simulation ticks per second (all timestamps are in ticks)
    pub const TICKS_PER_SECOND: u64 = 120;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Screen dimensions
    pub const SCREEN_WIDTH: f32 = 480.0;
    pub const SCREEN_HEIGHT: f32 = 800.0;

    /// Chapter speeds are "pixels per frame at 60 fps"; multiply to get px/s
    pub const VELOCITY_SCALE: f32 = 60.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 140.0;
    pub const PLAYER_HALF_WIDTH: f32 = 20.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 16.0;
    /// Extra upward kick on the very first flap (px/s)
    pub const START_IMPULSE: f32 = 200.0;
    /// Downward speed cap (px/s)
    pub const TERMINAL_VELOCITY: f32 = 900.0;

    /// Obstacle (chimney) geometry
    pub const OBSTACLE_WIDTH: f32 = 80.0;
    pub const OBSTACLE_HALF_HEIGHT: f32 = 300.0;
    /// Spawn x (just past the right edge)
    pub const SPAWN_X: f32 = SCREEN_WIDTH + 60.0;
    /// Entities left of this are released
    pub const REMOVE_X: f32 = -OBSTACLE_WIDTH;
    /// Vertical margin keeping the whole gap on screen
    pub const GAP_BAND_MARGIN: f32 = 145.0;

    /// Pickup hitbox half-size
    pub const PICKUP_HALF_SIZE: f32 = 18.0;

    /// Combo tuning
    pub const COMBO_THRESHOLD: u32 = 3;
    pub const COMBO_TIMEOUT_MS: u32 = 1500;
    pub const DOUBLE_SCORE_MS: u32 = 5000;
}

/// Convert milliseconds to simulation ticks (rounded to nearest)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u64 {
    (ms as u64 * consts::TICKS_PER_SECOND + 500) / 1000
}

/// Convert simulation ticks to seconds
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 / consts::TICKS_PER_SECOND as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(1000), 120);
        assert_eq!(ms_to_ticks(1500), 180);
        // 220 ms = 26.4 ticks
        assert_eq!(ms_to_ticks(220), 26);
    }

    #[test]
    fn test_ticks_to_secs() {
        assert!((ticks_to_secs(240) - 2.0).abs() < 1e-6);
    }
}
