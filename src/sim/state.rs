//! Run state and entity types
//!
//! One `RunState` per playthrough. A restart throws it away and builds a new
//! one, so nothing (timers included) leaks between runs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::combo::Combo;
use super::hazard::{FireGate, GatePhase};
use super::player::Player;
use super::ramp::{Difficulty, difficulty_for_score};
use super::timer::{TimerHandle, Timers};
use crate::chapter::Chapter;
use crate::consts::*;

/// Collectible / power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupKind {
    /// Worth points, feeds the combo
    #[serde(rename = "score")]
    ScoreItem,
    /// Ignore lethal contact for a while
    Invincibility,
    /// Reduced gravity for a while
    Float,
}

impl PickupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupKind::ScoreItem => "score",
            PickupKind::Invincibility => "invincibility",
            PickupKind::Float => "float",
        }
    }

    /// Map a chapter collectible id to a kind
    pub fn from_id(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "score" | "score-item" | "score_item" | "gift" | "present" => {
                Some(PickupKind::ScoreItem)
            }
            "invincibility" | "invincible" | "shield" | "star" => Some(PickupKind::Invincibility),
            "float" | "feather" | "balloon" => Some(PickupKind::Float),
            _ => None,
        }
    }

    pub fn is_powerup(&self) -> bool {
        !matches!(self, PickupKind::ScoreItem)
    }
}

/// Obstacle pair behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Plain,
    /// Carries the fire gate with this id
    Fire { gate: u32 },
}

/// Two chimneys sharing one gap and one velocity
#[derive(Debug, Clone)]
pub struct ObstaclePair {
    pub id: u32,
    /// Chapter variant id (art lookup)
    pub variant: String,
    pub kind: ObstacleKind,
    /// Horizontal center
    pub x: f32,
    /// Vertical center of the gap
    pub gap_center: f32,
    /// Gap height at spawn time
    pub gap: f32,
    /// Horizontal velocity (px/s)
    pub vel_x: f32,
    /// Player has flown past this pair
    pub passed: bool,
}

impl ObstaclePair {
    /// Center of the top chimney
    pub fn top_center(&self) -> Vec2 {
        Vec2::new(self.x, self.gap_center - self.gap / 2.0 - OBSTACLE_HALF_HEIGHT)
    }

    /// Center of the bottom chimney
    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.x, self.gap_center + self.gap / 2.0 + OBSTACLE_HALF_HEIGHT)
    }

    pub fn hitboxes(&self) -> [Aabb; 2] {
        let half = Vec2::new(OBSTACLE_WIDTH / 2.0, OBSTACLE_HALF_HEIGHT);
        [
            Aabb::new(self.top_center(), half),
            Aabb::new(self.bottom_center(), half),
        ]
    }

    /// Right edge of the chimneys
    pub fn trailing_edge(&self) -> f32 {
        self.x + OBSTACLE_WIDTH / 2.0
    }

    pub fn step(&mut self, dt: f32) {
        self.x += self.vel_x * dt;
    }
}

/// A collectible or power-up entity
#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Pickup {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(PICKUP_HALF_SIZE))
    }
}

/// What the player ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LethalSource {
    Obstacle { pair: u32 },
    FireGate { gate: u32 },
    /// Fell off the bottom of the screen
    Ground,
}

/// Events emitted for the engine adapter (sounds, tweens, HUD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Flapped,
    PairSpawned { pair: u32, variant: String, hazard: bool },
    PairPassed { pair: u32 },
    PickupSpawned { pickup: u32, kind: PickupKind },
    Collected { kind: PickupKind, points: u32 },
    ComboReset,
    DoubleScoreStarted { until_tick: u64 },
    BuffEnded { kind: PickupKind },
    FireIgnited { gate: u32 },
    FireDoused { gate: u32 },
    /// Lethal contact absorbed by invincibility
    Shielded { source: LethalSource },
    Died { source: LethalSource, score: u64 },
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation tick counter (the run clock)
    pub time_ticks: u64,
    /// Cumulative score
    pub score: u64,
    pub combo: Combo,
    pub player: Player,
    /// No power-up may spawn before this tick
    pub powerup_cooldown_until: u64,
    /// Active obstacle pairs (sorted by id)
    pub pairs: Vec<ObstaclePair>,
    /// Active fire gates (sorted by id)
    pub gates: Vec<FireGate>,
    /// Active pickups (sorted by id)
    pub pickups: Vec<Pickup>,
    pub timers: Timers,
    /// Pending spawn tick
    pub spawn_timer: Option<TimerHandle>,
    /// Background scroll distance (px)
    pub scroll_offset: f32,
    /// Pairs flown through this run
    pub pairs_passed: u32,
    /// Events produced since the adapter last drained them
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl RunState {
    /// Create a fresh run in the Idle phase
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            score: 0,
            combo: Combo::default(),
            player: Player::new(),
            powerup_cooldown_until: 0,
            pairs: Vec::new(),
            gates: Vec::new(),
            pickups: Vec::new(),
            timers: Timers::new(),
            spawn_timer: None,
            scroll_offset: 0.0,
            pairs_passed: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_started(&self) -> bool {
        self.player.is_started()
    }

    pub fn is_alive(&self) -> bool {
        !self.player.is_dead()
    }

    /// Difficulty at the current score
    pub fn difficulty(&self, chapter: &Chapter) -> Difficulty {
        difficulty_for_score(self.score, &chapter.base, &chapter.ramp)
    }

    pub fn gate(&self, id: u32) -> Option<&FireGate> {
        self.gates.iter().find(|g| g.id == id)
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Kill the player and stop every pending callback.
    ///
    /// Fire gates are released; chimneys and pickups stay where they are for
    /// the game-over screen.
    pub fn end_run(&mut self, source: LethalSource) {
        if self.player.is_dead() {
            return;
        }
        self.player.kill();
        self.release_after_death(source);
    }

    /// Cleanup once the player has entered Dead
    pub(crate) fn release_after_death(&mut self, source: LethalSource) {
        self.timers.clear();
        self.spawn_timer = None;
        self.combo.detach_timer();
        for gate in &mut self.gates {
            gate.phase = GatePhase::Removed;
            gate.timer = None;
        }
        self.gates.clear();

        log::info!(
            "Run over at tick {}: {:?}, score {}, pairs passed {}",
            self.time_ticks,
            source,
            self.score,
            self.pairs_passed
        );
        self.events.push(GameEvent::Died {
            source,
            score: self.score,
        });
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.pairs.sort_by_key(|p| p.id);
        self.gates.sort_by_key(|g| g.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}
