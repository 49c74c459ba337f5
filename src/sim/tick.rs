//! Fixed timestep simulation tick
//!
//! Order within a tick: input, buffs, movement, overlaps (collection and
//! lethal contact), due timers, off-screen cleanup. Overlaps resolve before
//! timers so a callback never sees a half-moved world.

use super::hazard::GatePhase;
use super::player::HitOutcome;
use super::spawn::{on_spawn_timer, start_spawning};
use super::state::{GameEvent, LethalSource, ObstacleKind, PickupKind, RunState};
use super::timer::{TimerEvent, TimerHandle};
use crate::chapter::Chapter;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (click/tap/space)
    pub flap: bool,
    /// Idle/demo mode - AI flies the run
    pub autopilot: bool,
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunState, chapter: &Chapter, input: &TickInput, dt: f32) {
    // Dead runs are frozen until the session restarts them
    if state.player.is_dead() {
        return;
    }

    state.time_ticks += 1;
    let now = state.time_ticks;

    let flap = if input.autopilot {
        autopilot_wants_flap(state)
    } else {
        input.flap
    };

    if flap {
        if state.player.flap(&chapter.base) {
            log::info!("Run started (seed {})", state.seed);
            state.events.push(GameEvent::RunStarted);
            start_spawning(state, chapter);
        }
        state.events.push(GameEvent::Flapped);
    }

    if !state.player.is_active() {
        return;
    }

    // Buffs: restore gravity / tint exactly when a window closes
    let expiry = state.player.update_buffs(now);
    if expiry.invincibility {
        state.events.push(GameEvent::BuffEnded {
            kind: PickupKind::Invincibility,
        });
    }
    if expiry.float {
        state.events.push(GameEvent::BuffEnded {
            kind: PickupKind::Float,
        });
    }

    // Movement
    let gravity = state.player.effective_gravity(chapter);
    state.player.integrate(gravity, dt);
    for pair in &mut state.pairs {
        pair.step(dt);
    }
    for gate in &mut state.gates {
        gate.step(dt);
    }
    for pickup in &mut state.pickups {
        pickup.pos += pickup.vel * dt;
    }
    let difficulty = state.difficulty(chapter);
    state.scroll_offset += difficulty.scroll_speed * VELOCITY_SCALE * dt;

    resolve_overlaps(state, chapter);

    // Timers (spawn, fire gate phases, combo timeout)
    while state.player.is_active() {
        let Some((handle, event)) = state.timers.pop_due(now) else {
            break;
        };
        fire_timer(state, chapter, handle, event);
    }

    if state.player.is_active() {
        remove_offscreen(state);
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Collection, lethal contact and pass-through for this tick
fn resolve_overlaps(state: &mut RunState, chapter: &Chapter) {
    let player_box = state.player.hitbox();

    let touched: Vec<u32> = state
        .pickups
        .iter()
        .filter(|p| p.hitbox().overlaps(&player_box))
        .map(|p| p.id)
        .collect();
    for id in touched {
        collect_pickup(state, chapter, id);
    }

    let player_left = state.player.pos.x - PLAYER_HALF_WIDTH;
    for pair in &mut state.pairs {
        if !pair.passed && pair.trailing_edge() < player_left {
            pair.passed = true;
            state.pairs_passed += 1;
            state.events.push(GameEvent::PairPassed { pair: pair.id });
        }
    }

    if state.player.is_below_floor() {
        if lethal_contact(state, LethalSource::Ground) == HitOutcome::Shielded {
            state.player.clamp_to_floor();
        }
        if !state.player.is_active() {
            return;
        }
    }

    let player_box = state.player.hitbox();
    let source = state
        .pairs
        .iter()
        .find(|pair| pair.hitboxes().iter().any(|b| b.overlaps(&player_box)))
        .map(|pair| LethalSource::Obstacle { pair: pair.id })
        .or_else(|| {
            state
                .gates
                .iter()
                .find(|gate| gate.is_lethal() && gate.hitbox().overlaps(&player_box))
                .map(|gate| LethalSource::FireGate { gate: gate.id })
        });

    if let Some(source) = source {
        lethal_contact(state, source);
    }
}

/// Player picked up `pickup_id`. Returns false if nothing was collected
/// (unknown id, or the player is not active).
pub fn collect_pickup(state: &mut RunState, chapter: &Chapter, pickup_id: u32) -> bool {
    if !state.player.is_active() {
        return false;
    }
    let Some(idx) = state.pickups.iter().position(|p| p.id == pickup_id) else {
        return false;
    };
    let pickup = state.pickups.remove(idx);
    let now = state.time_ticks;

    match pickup.kind {
        PickupKind::ScoreItem => {
            let award = state.combo.register(now, &mut state.timers);
            state.score += award.points as u64;
            state.events.push(GameEvent::Collected {
                kind: pickup.kind,
                points: award.points,
            });
            if let Some(until_tick) = award.double_until {
                log::debug!("Combo x{}: double score until tick {}", state.combo.count, until_tick);
                state.events.push(GameEvent::DoubleScoreStarted { until_tick });
            }
        }
        kind => {
            state.player.grant(kind, now, chapter);
            log::debug!("Power-up {} active", kind.as_str());
            state.events.push(GameEvent::Collected { kind, points: 0 });
        }
    }
    true
}

/// Player touched something lethal
pub fn lethal_contact(state: &mut RunState, source: LethalSource) -> HitOutcome {
    let outcome = state.player.hit(state.time_ticks);
    match outcome {
        HitOutcome::Killed => state.release_after_death(source),
        HitOutcome::Shielded => state.events.push(GameEvent::Shielded { source }),
        HitOutcome::Ignored => {}
    }
    outcome
}

fn fire_timer(state: &mut RunState, chapter: &Chapter, handle: TimerHandle, event: TimerEvent) {
    let now = state.time_ticks;
    match event {
        TimerEvent::Spawn => {
            if state.spawn_timer == Some(handle) {
                on_spawn_timer(state, chapter);
            }
        }
        TimerEvent::HazardPhase { gate } => {
            let Some(idx) = state.gates.iter().position(|g| g.id == gate) else {
                return;
            };
            let flipped = state.gates[idx].on_timer(
                handle,
                now,
                &chapter.hazard,
                &mut state.timers,
                &mut state.rng,
            );
            match flipped {
                Some(GatePhase::Active) => {
                    state.events.push(GameEvent::FireIgnited { gate })
                }
                Some(GatePhase::Inactive) => {
                    state.events.push(GameEvent::FireDoused { gate })
                }
                _ => {}
            }
        }
        TimerEvent::ComboTimeout => {
            if state.combo.on_timeout(handle) {
                state.events.push(GameEvent::ComboReset);
            }
        }
    }
}

/// Release entities that scrolled past the left edge
fn remove_offscreen(state: &mut RunState) {
    state.pairs.retain(|p| p.x >= REMOVE_X);
    state.pickups.retain(|p| p.pos.x >= REMOVE_X);

    let pairs = &state.pairs;
    let timers = &mut state.timers;
    state.gates.retain_mut(|gate| {
        let owned = pairs
            .iter()
            .any(|p| p.id == gate.pair_id && p.kind == ObstacleKind::Fire { gate: gate.id });
        if gate.pos.x < REMOVE_X || !owned {
            gate.remove(timers);
            false
        } else {
            true
        }
    });
}

/// Demo pilot: hold just below the next gap center
fn autopilot_wants_flap(state: &RunState) -> bool {
    if !state.player.is_started() {
        return true;
    }

    let player = &state.player;
    let player_left = player.pos.x - PLAYER_HALF_WIDTH;
    let target_y = state
        .pairs
        .iter()
        .filter(|p| p.trailing_edge() >= player_left)
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|p| {
            let offset = (p.gap / 2.0 - PLAYER_HALF_HEIGHT - 10.0).clamp(0.0, p.gap * 0.3);
            p.gap_center + offset
        })
        .unwrap_or(SCREEN_HEIGHT / 2.0);

    player.vel.y >= 0.0 && player.pos.y > target_y
}
