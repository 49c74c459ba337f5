//! Fire gate hazard cycle
//!
//! A fire gate fills the gap of a burning chimney pair and flips between
//! inactive and active on its own randomized timers:
//!
//! Inactive --(startup / rest elapsed)--> Active --(burst elapsed)--> Inactive
//!
//! Any phase goes to Removed when the gate leaves the screen or the run ends.
//! Only an Active gate is lethal.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::timer::{TimerEvent, TimerHandle, Timers};
use crate::chapter::HazardTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePhase {
    Inactive,
    Active,
    Removed,
}

/// A lethal zone co-located with a pair's gap
#[derive(Debug, Clone)]
pub struct FireGate {
    pub id: u32,
    /// Owning obstacle pair
    pub pair_id: u32,
    /// Zone center
    pub pos: Vec2,
    /// Width x gap height
    pub size: Vec2,
    /// Same velocity as the owning pair (px/s)
    pub vel_x: f32,
    pub phase: GatePhase,
    /// Pending phase flip
    pub timer: Option<TimerHandle>,
    /// Number of Inactive -> Active transitions so far
    pub activations: u32,
}

impl FireGate {
    pub fn new(id: u32, pair_id: u32, pos: Vec2, size: Vec2, vel_x: f32) -> Self {
        Self {
            id,
            pair_id,
            pos,
            size,
            vel_x,
            phase: GatePhase::Inactive,
            timer: None,
            activations: 0,
        }
    }

    /// Schedule the first ignition after the startup delay
    pub fn arm<R: Rng>(&mut self, now: u64, timing: &HazardTiming, timers: &mut Timers, rng: &mut R) {
        let delay = timing.startup.sample(rng);
        timers.replace(
            &mut self.timer,
            now,
            delay,
            TimerEvent::HazardPhase { gate: self.id },
        );
    }

    /// Phase timer fired: flip and schedule the next flip.
    ///
    /// Returns the new phase, or `None` if the gate is already removed or the
    /// handle is stale.
    pub fn on_timer<R: Rng>(
        &mut self,
        handle: TimerHandle,
        now: u64,
        timing: &HazardTiming,
        timers: &mut Timers,
        rng: &mut R,
    ) -> Option<GatePhase> {
        if self.timer != Some(handle) {
            return None;
        }
        self.timer = None;

        let (next, duration) = match self.phase {
            GatePhase::Inactive => {
                self.activations += 1;
                (GatePhase::Active, timing.active.sample(rng))
            }
            GatePhase::Active => (GatePhase::Inactive, timing.rest.sample(rng)),
            GatePhase::Removed => return None,
        };

        self.phase = next;
        self.timer = Some(timers.schedule(now, duration, TimerEvent::HazardPhase { gate: self.id }));
        log::debug!("Fire gate {} -> {:?} for {} ticks", self.id, next, duration);
        Some(next)
    }

    /// Cancel pending timers and mark removed
    pub fn remove(&mut self, timers: &mut Timers) {
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
        }
        self.phase = GatePhase::Removed;
    }

    pub fn is_lethal(&self) -> bool {
        self.phase == GatePhase::Active
    }

    pub fn step(&mut self, dt: f32) {
        self.pos.x += self.vel_x * dt;
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_size(self.pos, self.size)
    }

    /// Whole-pixel anchor for flame / glow overlays
    pub fn overlay_anchor(&self) -> Vec2 {
        self.pos.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::HazardConfig;
    use crate::chapter::TickRange;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn timing() -> HazardTiming {
        let h = HazardConfig::default();
        HazardTiming {
            startup: TickRange::from_ms(h.startup_delay_ms),
            active: TickRange::from_ms(h.active_ms),
            rest: TickRange::from_ms(h.rest_ms),
            width: h.width,
        }
    }

    fn gate() -> FireGate {
        FireGate::new(7, 3, Vec2::new(540.0, 400.0), Vec2::new(70.0, 150.0), -180.0)
    }

    /// Fire due timers for this gate, returning transitions
    fn run(
        gate: &mut FireGate,
        timers: &mut Timers,
        rng: &mut Pcg32,
        from: u64,
        to: u64,
    ) -> Vec<(u64, GatePhase)> {
        let timing = timing();
        let mut out = Vec::new();
        for now in from..to {
            while let Some((handle, _)) = timers.pop_due(now) {
                if let Some(phase) = gate.on_timer(handle, now, &timing, timers, rng) {
                    out.push((now, phase));
                }
            }
        }
        out
    }

    #[test]
    fn test_starts_inactive_and_ignites_after_startup() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut timers = Timers::new();
        let mut gate = gate();
        assert_eq!(gate.phase, GatePhase::Inactive);
        assert!(!gate.is_lethal());

        gate.arm(0, &timing(), &mut timers, &mut rng);
        let transitions = run(&mut gate, &mut timers, &mut rng, 0, 200);
        let (first_tick, first) = transitions[0];
        assert_eq!(first, GatePhase::Active);
        assert!(first_tick >= timing().startup.min && first_tick <= timing().startup.max);
    }

    #[test]
    fn test_active_phase_bounded() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut timers = Timers::new();
        let mut gate = gate();
        gate.arm(0, &timing(), &mut timers, &mut rng);

        let transitions = run(&mut gate, &mut timers, &mut rng, 0, 120 * 20);
        let max_active = timing().active.max;
        let max_rest = timing().rest.max;
        assert!(gate.activations >= 5);

        for pair in transitions.windows(2) {
            let (t0, p0) = pair[0];
            let (t1, p1) = pair[1];
            assert_ne!(p0, p1, "phases must alternate");
            match p0 {
                GatePhase::Active => assert!(t1 - t0 <= max_active),
                GatePhase::Inactive => assert!(t1 - t0 <= max_rest),
                GatePhase::Removed => unreachable!(),
            }
        }
    }

    #[test]
    fn test_durations_vary() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut timers = Timers::new();
        let mut gate = gate();
        gate.arm(0, &timing(), &mut timers, &mut rng);

        let transitions = run(&mut gate, &mut timers, &mut rng, 0, 120 * 30);
        let rests: Vec<u64> = transitions
            .windows(2)
            .filter(|w| w[0].1 == GatePhase::Inactive)
            .map(|w| w[1].0 - w[0].0)
            .collect();
        assert!(rests.len() > 3);
        assert!(rests.iter().any(|&r| r != rests[0]));
    }

    #[test]
    fn test_removed_gate_never_ignites() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut timers = Timers::new();
        let mut gate = gate();
        gate.arm(0, &timing(), &mut timers, &mut rng);

        gate.remove(&mut timers);
        assert!(timers.is_empty());
        let transitions = run(&mut gate, &mut timers, &mut rng, 0, 120 * 5);
        assert!(transitions.is_empty());
        assert_eq!(gate.activations, 0);
    }

    #[test]
    fn test_overlay_tracks_position() {
        let mut gate = gate();
        for _ in 0..37 {
            gate.step(1.0 / 120.0);
        }
        assert_eq!(gate.overlay_anchor(), gate.pos.round());
        assert!(gate.hitbox().contains_point(gate.overlay_anchor()));
    }
}
