//! Spawn scheduling
//!
//! Each spawn tick creates one chimney pair at the right edge, optionally with
//! a fire gate in its gap, and at most one pickup at the gap center. The next
//! tick is scheduled from the ramped spacing at the current score.

use glam::Vec2;
use rand::Rng;

use super::hazard::FireGate;
use super::state::{GameEvent, ObstacleKind, ObstaclePair, Pickup, PickupKind, RunState};
use super::timer::TimerEvent;
use super::variant::pick_variant;
use crate::chapter::Chapter;
use crate::consts::*;

/// Arm the spawn timer when a run starts
pub fn start_spawning(state: &mut RunState, chapter: &Chapter) {
    let interval = state.difficulty(chapter).spawn_interval_ticks();
    let now = state.time_ticks;
    state
        .timers
        .replace(&mut state.spawn_timer, now, interval, TimerEvent::Spawn);
}

/// Spawn timer fired: spawn a pair and schedule the next tick
pub fn on_spawn_timer(state: &mut RunState, chapter: &Chapter) {
    state.spawn_timer = None;
    if !state.player.is_active() {
        return;
    }
    spawn_pair(state, chapter);
    start_spawning(state, chapter);
}

/// Gap center band for a given gap height
pub fn gap_center_band(gap: f32) -> (f32, f32) {
    let lo = GAP_BAND_MARGIN + gap / 2.0;
    let hi = SCREEN_HEIGHT - GAP_BAND_MARGIN - gap / 2.0;
    if lo > hi {
        let mid = SCREEN_HEIGHT / 2.0;
        (mid, mid)
    } else {
        (lo, hi)
    }
}

/// Create one obstacle pair (plus fire gate / pickup). No-op unless active.
pub fn spawn_pair(state: &mut RunState, chapter: &Chapter) -> Option<u32> {
    if !state.player.is_active() {
        return None;
    }

    let now = state.time_ticks;
    let difficulty = state.difficulty(chapter);
    let gap = difficulty.obstacle_gap;
    let vel_x = difficulty.entity_velocity_x();

    let (lo, hi) = gap_center_band(gap);
    let gap_center = if hi > lo {
        state.rng.random_range(lo..=hi)
    } else {
        lo
    };

    let variant = pick_variant(&chapter.variants, &chapter.default_variant, &mut state.rng)
        .to_string();
    let hazard = chapter.is_hazard_variant(&variant);

    let pair_id = state.next_entity_id();
    let kind = if hazard {
        let gate_id = state.next_entity_id();
        let mut gate = FireGate::new(
            gate_id,
            pair_id,
            Vec2::new(SPAWN_X, gap_center),
            Vec2::new(chapter.hazard.width, gap),
            vel_x,
        );
        gate.arm(now, &chapter.hazard, &mut state.timers, &mut state.rng);
        state.gates.push(gate);
        ObstacleKind::Fire { gate: gate_id }
    } else {
        ObstacleKind::Plain
    };

    state.pairs.push(ObstaclePair {
        id: pair_id,
        variant: variant.clone(),
        kind,
        x: SPAWN_X,
        gap_center,
        gap,
        vel_x,
        passed: false,
    });

    log::debug!(
        "Spawned pair {} '{}' gap {:.0} at y {:.0}, vx {:.0} (step {})",
        pair_id,
        variant,
        gap,
        gap_center,
        vel_x,
        difficulty.steps
    );
    state.events.push(GameEvent::PairSpawned {
        pair: pair_id,
        variant,
        hazard,
    });

    if let Some(kind) = roll_pickup(state, chapter) {
        let id = state.next_entity_id();
        state.pickups.push(Pickup {
            id,
            kind,
            pos: Vec2::new(SPAWN_X, gap_center),
            vel: Vec2::new(vel_x, 0.0),
        });
        state.events.push(GameEvent::PickupSpawned { pickup: id, kind });
    }

    Some(pair_id)
}

/// Decide what (if anything) sits in the new gap.
///
/// Power-ups are rolled first, in chapter order, only once the cooldown has
/// elapsed; the first success wins and restarts the cooldown. A score item is
/// rolled only if no power-up spawned.
fn roll_pickup(state: &mut RunState, chapter: &Chapter) -> Option<PickupKind> {
    let now = state.time_ticks;
    if now >= state.powerup_cooldown_until {
        for spawn in &chapter.powerups {
            if state.rng.random_bool(spawn.chance as f64) {
                state.powerup_cooldown_until = now + chapter.powerup_cooldown_ticks;
                return Some(spawn.kind);
            }
        }
    }

    if state.rng.random_bool(chapter.score_item_chance as f64) {
        Some(PickupKind::ScoreItem)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::{ChapterConfig, PowerupSpawn, VariantConfig};
    use crate::sim::player::PlayerPhase;

    fn active_state(seed: u64) -> RunState {
        let mut state = RunState::new(seed);
        state.player.phase = PlayerPhase::Active;
        state
    }

    fn fire_only() -> Chapter {
        let mut chapter = Chapter::default();
        chapter.variants = vec![VariantConfig {
            id: "chimney_fire".into(),
            weight: 1.0,
            hazard: true,
        }];
        chapter
    }

    #[test]
    fn test_no_spawn_before_start_or_after_death() {
        let chapter = Chapter::default();
        let mut state = RunState::new(1);
        assert!(spawn_pair(&mut state, &chapter).is_none());

        state.player.phase = PlayerPhase::Dead;
        on_spawn_timer(&mut state, &chapter);
        assert!(state.pairs.is_empty());
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_pair_geometry_and_velocity() {
        let chapter = Chapter::default();
        let mut state = active_state(2);
        for _ in 0..50 {
            spawn_pair(&mut state, &chapter);
        }
        let (lo, hi) = gap_center_band(155.0);
        for pair in &state.pairs {
            assert!(pair.gap_center >= lo && pair.gap_center <= hi);
            assert_eq!(pair.gap, 155.0);
            assert_eq!(pair.vel_x, -180.0);
            assert_eq!(pair.x, SPAWN_X);
            // Gap fully on screen
            assert!(pair.gap_center - pair.gap / 2.0 >= GAP_BAND_MARGIN);
            assert!(pair.gap_center + pair.gap / 2.0 <= SCREEN_HEIGHT - GAP_BAND_MARGIN);
        }
        for pickup in &state.pickups {
            assert_eq!(pickup.vel, Vec2::new(-180.0, 0.0));
        }
    }

    #[test]
    fn test_fire_variant_creates_gate_in_gap() {
        let chapter = fire_only();
        let mut state = active_state(3);
        let pair_id = spawn_pair(&mut state, &chapter).unwrap();

        let pair = &state.pairs[0];
        let ObstacleKind::Fire { gate } = pair.kind else {
            panic!("expected a fire pair");
        };
        let gate = state.gate(gate).unwrap();
        assert_eq!(gate.pair_id, pair_id);
        assert_eq!(gate.pos, Vec2::new(pair.x, pair.gap_center));
        assert_eq!(gate.size.y, pair.gap);
        assert_eq!(gate.vel_x, pair.vel_x);
        assert!(gate.timer.is_some());
        assert!(!gate.is_lethal());
    }

    #[test]
    fn test_at_most_one_pickup_per_spawn() {
        let mut chapter = Chapter::default();
        chapter.score_item_chance = 1.0;
        chapter.powerups = vec![
            PowerupSpawn { kind: PickupKind::Invincibility, chance: 1.0 },
            PowerupSpawn { kind: PickupKind::Float, chance: 1.0 },
        ];
        let mut state = active_state(4);

        spawn_pair(&mut state, &chapter);
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(state.pickups[0].kind, PickupKind::Invincibility);
        assert_eq!(state.powerup_cooldown_until, chapter.powerup_cooldown_ticks);

        // Cooldown still running: falls through to the score item
        spawn_pair(&mut state, &chapter);
        assert_eq!(state.pickups.len(), 2);
        assert_eq!(state.pickups[1].kind, PickupKind::ScoreItem);

        state.time_ticks = chapter.powerup_cooldown_ticks;
        spawn_pair(&mut state, &chapter);
        assert_eq!(state.pickups[2].kind, PickupKind::Invincibility);
    }

    #[test]
    fn test_zero_chances_spawn_nothing() {
        let mut config = ChapterConfig::default();
        config.collectibles.clear();
        let chapter = config.resolve();
        let mut state = active_state(5);
        for _ in 0..20 {
            spawn_pair(&mut state, &chapter);
        }
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_ramped_gap_used_after_score() {
        let chapter = Chapter::default();
        let mut state = active_state(6);
        state.score = 20;
        spawn_pair(&mut state, &chapter);
        assert_eq!(state.pairs[0].gap, 155.0 - 2.0 * chapter.ramp.gap_subtract);
        assert!(state.pairs[0].vel_x < -180.0);
    }

    #[test]
    fn test_spawn_timer_reschedules() {
        let chapter = Chapter::default();
        let mut state = active_state(7);
        start_spawning(&mut state, &chapter);
        let handle = state.spawn_timer.unwrap();
        assert_eq!(state.timers.due_of(handle), Some(193));

        state.time_ticks = 193;
        let (fired, event) = state.timers.pop_due(193).unwrap();
        assert_eq!(fired, handle);
        assert_eq!(event, TimerEvent::Spawn);
        on_spawn_timer(&mut state, &chapter);
        assert_eq!(state.pairs.len(), 1);
        assert_eq!(state.timers.due_of(state.spawn_timer.unwrap()), Some(386));
    }

    #[test]
    fn test_empty_variant_pool_uses_default() {
        let mut chapter = Chapter::default();
        chapter.variants.clear();
        let mut state = active_state(8);
        spawn_pair(&mut state, &chapter);
        assert_eq!(state.pairs[0].variant, "chimney");
        assert_eq!(state.pairs[0].kind, ObstacleKind::Plain);
    }
}
