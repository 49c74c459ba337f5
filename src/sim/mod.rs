//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Time measured in ticks, never wall clock

pub mod collision;
pub mod combo;
pub mod hazard;
pub mod player;
pub mod ramp;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;
pub mod variant;

pub use collision::Aabb;
pub use combo::{Combo, ComboAward};
pub use hazard::{FireGate, GatePhase};
pub use player::{HitOutcome, Player, PlayerPhase};
pub use ramp::{Difficulty, difficulty_for_score};
pub use spawn::spawn_pair;
pub use state::{
    GameEvent, LethalSource, ObstacleKind, ObstaclePair, Pickup, PickupKind, RunState,
};
pub use tick::{TickInput, collect_pickup, lethal_contact, tick};
pub use timer::{TimerEvent, TimerHandle, Timers};
pub use variant::pick_variant;
