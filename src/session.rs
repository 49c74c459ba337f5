//! Engine adapter: one chapter, one run at a time
//!
//! Owns the fixed-step accumulator and the things that outlive a single run
//! (mute, best score, run counter). The frontend feeds it frame deltas and
//! input presses, then drains `GameEvent`s for sound and tweens.

use crate::chapter::Chapter;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{GameEvent, RunState, TickInput, tick};

/// Multiplier for deriving per-run seeds from the session seed
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct Session {
    chapter: Chapter,
    state: RunState,
    accumulator: f32,
    input: TickInput,
    /// Events from completed ticks, in order
    events: Vec<GameEvent>,
    pub muted: bool,
    pub best_score: u64,
    /// Runs started so far (including the current one)
    pub runs: u32,
    base_seed: u64,
}

impl Session {
    pub fn new(chapter: Chapter, seed: u64) -> Self {
        log::info!("Session started: chapter '{}', seed {}", chapter.name, seed);
        Self {
            chapter,
            state: RunState::new(seed),
            accumulator: 0.0,
            input: TickInput::default(),
            events: Vec::new(),
            muted: false,
            best_score: 0,
            runs: 1,
            base_seed: seed,
        }
    }

    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Let the AI fly (demo / headless mode)
    pub fn set_autopilot(&mut self, on: bool) {
        self.input.autopilot = on;
    }

    pub fn autopilot(&self) -> bool {
        self.input.autopilot
    }

    /// Run simulation ticks for one rendered frame.
    ///
    /// Returns the number of ticks run.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.chapter, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.flap = false;
            self.events.append(&mut self.state.events);
        }

        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Pointer down / key press
    pub fn press_flap(&mut self) {
        self.input.flap = true;
    }

    /// Flip mute. Purely a frontend concern; the run never sees it.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        log::debug!("Muted: {}", self.muted);
        self.muted
    }

    /// Start a fresh run. Only honoured once the player is dead.
    pub fn request_restart(&mut self) -> bool {
        if !self.state.player.is_dead() {
            return false;
        }

        self.best_score = self.best_score.max(self.state.score);
        self.events.append(&mut self.state.events);

        let seed = self
            .base_seed
            .wrapping_add(SEED_STRIDE.wrapping_mul(self.runs as u64));
        self.runs += 1;
        self.state = RunState::new(seed);
        self.accumulator = 0.0;
        self.input.flap = false;

        log::info!(
            "Run {} restarted with seed {} (best {})",
            self.runs,
            seed,
            self.best_score
        );
        true
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{LethalSource, PlayerPhase};

    fn session() -> Session {
        Session::new(Chapter::default(), 1234)
    }

    #[test]
    fn test_update_runs_fixed_ticks() {
        let mut s = session();
        assert_eq!(s.update(1.0 / 60.0), 2);
        assert_eq!(s.state().time_ticks, 2);

        // Huge frame is capped
        assert_eq!(s.update(5.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_flap_is_one_shot() {
        let mut s = session();
        s.press_flap();
        s.update(1.0 / 60.0);
        assert_eq!(s.state().player.phase, PlayerPhase::Active);
        let events = s.drain_events();
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::Flapped).count(),
            1
        );
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_restart_only_when_dead() {
        let mut s = session();
        s.press_flap();
        s.update(1.0 / 60.0);
        assert!(!s.request_restart());

        s.state.score = 17;
        s.state.end_run(LethalSource::Ground);
        let old_seed = s.state().seed;
        assert!(s.request_restart());

        assert_eq!(s.best_score, 17);
        assert_eq!(s.runs, 2);
        assert_ne!(s.state().seed, old_seed);
        assert_eq!(s.state().player.phase, PlayerPhase::Idle);
        assert_eq!(s.state().score, 0);
        assert!(s.state().timers.is_empty());
        // The death is still reported after the restart
        assert!(
            s.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Died { score: 17, .. }))
        );
    }

    #[test]
    fn test_best_score_keeps_maximum() {
        let mut s = session();
        for score in [5, 12, 3] {
            s.state.player.phase = PlayerPhase::Active;
            s.state.score = score;
            s.state.end_run(LethalSource::Ground);
            s.request_restart();
        }
        assert_eq!(s.best_score, 12);
    }

    #[test]
    fn test_mute_survives_restart_and_does_not_touch_run() {
        let mut s = session();
        assert!(s.toggle_mute());
        s.state.player.phase = PlayerPhase::Active;
        s.state.end_run(LethalSource::Ground);
        s.request_restart();
        assert!(s.muted);
        assert_eq!(s.state().player.phase, PlayerPhase::Idle);
        assert!(!s.toggle_mute());
    }

    #[test]
    fn test_restart_seeds_are_reproducible() {
        let mut a = session();
        let mut b = session();
        for s in [&mut a, &mut b] {
            s.state.player.phase = PlayerPhase::Active;
            s.state.end_run(LethalSource::Ground);
            s.request_restart();
        }
        assert_eq!(a.state().seed, b.state().seed);
    }

    #[test]
    fn test_autopilot_session_plays() {
        let mut s = session();
        s.set_autopilot(true);
        assert!(s.autopilot());
        for _ in 0..60 {
            s.update(1.0 / 60.0);
        }
        assert!(s.state().is_started());
        assert!(s.drain_events().contains(&GameEvent::RunStarted));
    }
}
