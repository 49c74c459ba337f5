//! Player state machine and buffs
//!
//! Idle (hovering, waiting for the first flap) -> Active -> Dead.
//! Buffs are "active until tick T" windows checked every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::chapter::{BaseConfig, Chapter};
use crate::consts::*;
use crate::sim::PickupKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPhase {
    /// Gravity off, waiting for the first input
    Idle,
    /// Flying
    Active,
    /// Terminal until restart
    Dead,
}

/// Result of a lethal contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Not active (idle or already dead)
    Ignored,
    /// Absorbed by invincibility
    Shielded,
    Killed,
}

/// Buff windows that closed this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuffExpiry {
    pub invincibility: bool,
    pub float: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Velocity in px/s (+y is down)
    pub vel: Vec2,
    pub phase: PlayerPhase,
    pub invincible_until: u64,
    pub float_until: u64,
    /// Buff flags as of the last `update_buffs` (drive tint / gravity)
    pub invincible: bool,
    pub floating: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, SCREEN_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            phase: PlayerPhase::Idle,
            invincible_until: 0,
            float_until: 0,
            invincible: false,
            floating: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase != PlayerPhase::Idle
    }

    pub fn is_active(&self) -> bool {
        self.phase == PlayerPhase::Active
    }

    pub fn is_dead(&self) -> bool {
        self.phase == PlayerPhase::Dead
    }

    /// Apply a flap. Returns true if this flap started the run.
    pub fn flap(&mut self, base: &BaseConfig) -> bool {
        let impulse = base.flap_strength * VELOCITY_SCALE;
        match self.phase {
            PlayerPhase::Idle => {
                self.phase = PlayerPhase::Active;
                self.vel.y = -impulse - START_IMPULSE;
                true
            }
            PlayerPhase::Active => {
                self.vel.y = -impulse;
                false
            }
            PlayerPhase::Dead => false,
        }
    }

    pub fn is_invincible_at(&self, now: u64) -> bool {
        now < self.invincible_until
    }

    pub fn is_floating_at(&self, now: u64) -> bool {
        now < self.float_until
    }

    /// Start (or extend) a buff window
    pub fn grant(&mut self, kind: PickupKind, now: u64, chapter: &Chapter) {
        match kind {
            PickupKind::Invincibility => {
                self.invincible_until = self.invincible_until.max(now + chapter.invincible_ticks);
                self.invincible = true;
            }
            PickupKind::Float => {
                self.float_until = self.float_until.max(now + chapter.float_ticks);
                self.floating = true;
            }
            PickupKind::ScoreItem => {}
        }
    }

    /// Re-evaluate buff windows, reporting any that closed
    pub fn update_buffs(&mut self, now: u64) -> BuffExpiry {
        let invincible = self.is_invincible_at(now);
        let floating = self.is_floating_at(now);
        let expiry = BuffExpiry {
            invincibility: self.invincible && !invincible,
            float: self.floating && !floating,
        };
        self.invincible = invincible;
        self.floating = floating;
        expiry
    }

    /// Gravity in px/s² with the float buff applied
    pub fn effective_gravity(&self, chapter: &Chapter) -> f32 {
        let g = chapter.base.gravity * VELOCITY_SCALE * VELOCITY_SCALE;
        if self.floating {
            g * chapter.float_gravity_factor
        } else {
            g
        }
    }

    /// Integrate one step. Idle and dead players do not move.
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        if !self.is_active() {
            return;
        }
        self.vel.y = (self.vel.y + gravity * dt).min(TERMINAL_VELOCITY);
        self.pos.y += self.vel.y * dt;

        let ceiling = PLAYER_HALF_HEIGHT;
        if self.pos.y < ceiling {
            self.pos.y = ceiling;
            self.vel.y = self.vel.y.max(0.0);
        }
    }

    /// Below the bottom edge of the screen
    pub fn is_below_floor(&self) -> bool {
        self.pos.y + PLAYER_HALF_HEIGHT >= SCREEN_HEIGHT
    }

    /// Keep a shielded player standing on the floor
    pub fn clamp_to_floor(&mut self) {
        self.pos.y = SCREEN_HEIGHT - PLAYER_HALF_HEIGHT;
        self.vel.y = self.vel.y.min(0.0);
    }

    /// Lethal contact at `now`; kills unless invincible
    pub fn hit(&mut self, now: u64) -> HitOutcome {
        if !self.is_active() {
            return HitOutcome::Ignored;
        }
        if self.is_invincible_at(now) {
            return HitOutcome::Shielded;
        }
        self.kill();
        HitOutcome::Killed
    }

    /// Enter Dead and freeze
    pub fn kill(&mut self) {
        self.phase = PlayerPhase::Dead;
        self.vel = Vec2::ZERO;
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT))
    }
}
