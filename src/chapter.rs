//! Chapter configuration
//!
//! A chapter is a JSON document describing difficulty, obstacle variants and
//! collectibles. Every section is optional; missing fields take the defaults
//! below. The raw [`ChapterConfig`] is resolved once into a [`Chapter`] so the
//! simulation never has to ask whether a field was present.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::OBSTACLE_WIDTH;
use crate::ms_to_ticks;
use crate::sim::PickupKind;

/// Errors surfaced while loading a chapter (fatal at startup)
#[derive(Debug, thiserror::Error)]
pub enum ChapterError {
    #[error("failed to read chapter file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed chapter config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Starting difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseConfig {
    /// Scroll speed in px per 60 Hz frame
    pub scroll_speed: f32,
    /// Vertical gap between the two chimneys of a pair (px)
    pub obstacle_gap: f32,
    /// Horizontal distance between consecutive pairs (px)
    pub obstacle_spacing: f32,
    /// Gravity in px per frame² at 60 Hz
    pub gravity: f32,
    /// Flap impulse in px per frame at 60 Hz
    pub flap_strength: f32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 3.0,
            obstacle_gap: 155.0,
            obstacle_spacing: 290.0,
            gravity: 0.42,
            flap_strength: 8.35,
        }
    }
}

/// Score-driven progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RampConfig {
    /// Score per ramp step (values below 1 behave as 1)
    pub every_score: i64,
    pub scroll_speed_add: f32,
    pub max_scroll_speed: f32,
    pub gap_subtract: f32,
    pub min_gap: f32,
    pub spacing_subtract: f32,
    pub min_spacing: f32,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            every_score: 10,
            scroll_speed_add: 0.25,
            max_scroll_speed: 5.0,
            gap_subtract: 5.0,
            min_gap: 120.0,
            spacing_subtract: 10.0,
            min_spacing: 200.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub base: BaseConfig,
    pub ramp: RampConfig,
}

fn default_weight() -> f32 {
    1.0
}

/// One obstacle variant in the weighted pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Pairs of this variant carry a fire gate
    #[serde(default)]
    pub hazard: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObstaclesConfig {
    /// Used when the variant pool is empty
    pub default_variant: String,
    pub variants: Vec<VariantConfig>,
}

impl Default for ObstaclesConfig {
    fn default() -> Self {
        Self {
            default_variant: "chimney".to_string(),
            variants: vec![
                VariantConfig {
                    id: "chimney".to_string(),
                    weight: 3.0,
                    hazard: false,
                },
                VariantConfig {
                    id: "chimney_fire".to_string(),
                    weight: 1.0,
                    hazard: true,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnChance {
    /// Probability per spawn event (0.0 - 1.0)
    pub chance: f32,
}

/// A collectible or power-up entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleConfig {
    pub id: String,
    /// Explicit kind; inferred from `id` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PickupKind>,
    #[serde(default)]
    pub spawn: SpawnChance,
}

impl CollectibleConfig {
    fn new(id: &str, chance: f32) -> Self {
        Self {
            id: id.to_string(),
            kind: None,
            spawn: SpawnChance { chance },
        }
    }

    /// Resolved kind (explicit field first, then the id)
    pub fn resolved_kind(&self) -> Option<PickupKind> {
        self.kind.or_else(|| PickupKind::from_id(&self.id))
    }
}

/// Power-up buff tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PowerupConfig {
    /// Minimum time between two power-up spawns
    pub cooldown_ms: u32,
    pub invincible_ms: u32,
    pub float_ms: u32,
    /// Gravity multiplier while floating
    pub float_gravity_factor: f32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 6000,
            invincible_ms: 5000,
            float_ms: 5000,
            float_gravity_factor: 0.5,
        }
    }
}

/// Fire gate timing, each range is `[min, max]` in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HazardConfig {
    pub startup_delay_ms: [u32; 2],
    pub active_ms: [u32; 2],
    pub rest_ms: [u32; 2],
    /// Width of the lethal zone (its height is the pair's gap)
    pub width: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: [300, 500],
            active_ms: [180, 320],
            rest_ms: [600, 1200],
            width: 70.0,
        }
    }
}

/// Chapter file as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterConfig {
    pub name: String,
    pub difficulty: DifficultyConfig,
    pub obstacles: ObstaclesConfig,
    pub collectibles: Vec<CollectibleConfig>,
    pub powerups: PowerupConfig,
    pub hazard: HazardConfig,
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            name: "Rooftops".to_string(),
            difficulty: DifficultyConfig::default(),
            obstacles: ObstaclesConfig::default(),
            collectibles: vec![
                CollectibleConfig::new("score", 0.35),
                CollectibleConfig::new("invincibility", 0.08),
                CollectibleConfig::new("float", 0.10),
            ],
            powerups: PowerupConfig::default(),
            hazard: HazardConfig::default(),
        }
    }
}

/// Raise `value` to `floor` (NaN included), warning when it had to move
fn at_least(name: &str, value: f32, floor: f32) -> f32 {
    if value >= floor {
        value
    } else {
        log::warn!("{} {} below {}, clamping", name, value, floor);
        floor
    }
}

impl ChapterConfig {
    /// Parse a chapter from JSON text
    pub fn from_json(json: &str) -> Result<Self, ChapterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a chapter file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChapterError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ChapterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Pretty JSON (used to dump the built-in defaults)
    pub fn to_json_pretty(&self) -> Result<String, ChapterError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve into the fully populated runtime form
    pub fn resolve(self) -> Chapter {
        let mut base = self.difficulty.base;
        let mut ramp = self.difficulty.ramp;

        base.scroll_speed = at_least("base.scrollSpeed", base.scroll_speed, 0.0);
        base.obstacle_gap = at_least("base.obstacleGap", base.obstacle_gap, 0.0);
        // Pairs closer than one chimney width would overlap
        base.obstacle_spacing =
            at_least("base.obstacleSpacing", base.obstacle_spacing, OBSTACLE_WIDTH);

        // Deltas only ever make the ramp harder
        ramp.scroll_speed_add = at_least("ramp.scrollSpeedAdd", ramp.scroll_speed_add, 0.0);
        ramp.gap_subtract = at_least("ramp.gapSubtract", ramp.gap_subtract, 0.0);
        ramp.spacing_subtract = at_least("ramp.spacingSubtract", ramp.spacing_subtract, 0.0);
        ramp.min_gap = at_least("ramp.minGap", ramp.min_gap, 0.0);
        ramp.min_spacing = at_least("ramp.minSpacing", ramp.min_spacing, OBSTACLE_WIDTH);

        if ramp.min_gap > base.obstacle_gap {
            log::warn!(
                "ramp.minGap {} exceeds base.obstacleGap {}, clamping",
                ramp.min_gap,
                base.obstacle_gap
            );
            ramp.min_gap = base.obstacle_gap;
        }
        if !(ramp.max_scroll_speed >= base.scroll_speed) {
            log::warn!(
                "ramp.maxScrollSpeed {} below base.scrollSpeed {}, clamping",
                ramp.max_scroll_speed,
                base.scroll_speed
            );
            ramp.max_scroll_speed = base.scroll_speed;
        }
        if ramp.min_spacing > base.obstacle_spacing {
            log::warn!(
                "ramp.minSpacing {} exceeds base.obstacleSpacing {}, clamping",
                ramp.min_spacing,
                base.obstacle_spacing
            );
            ramp.min_spacing = base.obstacle_spacing;
        }

        let variants = self
            .obstacles
            .variants
            .into_iter()
            .map(|mut v| {
                if !(v.weight >= 0.0 && v.weight.is_finite()) {
                    log::warn!("variant '{}' has weight {}, using 0", v.id, v.weight);
                    v.weight = 0.0;
                }
                v
            })
            .collect();

        let mut score_item_chance = None;
        let mut powerups = Vec::new();
        for entry in &self.collectibles {
            let chance = entry.spawn.chance.clamp(0.0, 1.0);
            match entry.resolved_kind() {
                Some(PickupKind::ScoreItem) => {
                    if score_item_chance.is_some() {
                        log::warn!("duplicate score collectible '{}' ignored", entry.id);
                    } else {
                        score_item_chance = Some(chance);
                    }
                }
                Some(kind) => powerups.push(PowerupSpawn { kind, chance }),
                None => log::warn!("unknown collectible id '{}' ignored", entry.id),
            }
        }

        let p = self.powerups;
        let h = self.hazard;

        Chapter {
            name: self.name,
            base,
            ramp,
            default_variant: self.obstacles.default_variant,
            variants,
            score_item_chance: score_item_chance.unwrap_or(0.0),
            powerups,
            powerup_cooldown_ticks: ms_to_ticks(p.cooldown_ms),
            invincible_ticks: ms_to_ticks(p.invincible_ms),
            float_ticks: ms_to_ticks(p.float_ms),
            float_gravity_factor: p.float_gravity_factor.max(0.0),
            hazard: HazardTiming {
                startup: TickRange::from_ms(h.startup_delay_ms),
                active: TickRange::from_ms(h.active_ms),
                rest: TickRange::from_ms(h.rest_ms),
                width: h.width.max(1.0),
            },
        }
    }
}

/// A power-up roll performed on each spawn event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerupSpawn {
    pub kind: PickupKind,
    pub chance: f32,
}

/// Inclusive duration range in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRange {
    pub min: u64,
    pub max: u64,
}

impl TickRange {
    pub fn from_ms([a, b]: [u32; 2]) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        // A zero-length phase would flip twice in one tick
        Self {
            min: ms_to_ticks(lo).max(1),
            max: ms_to_ticks(hi).max(1),
        }
    }

    /// Uniform draw in `[min, max]`
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.random_range(self.min..=self.max)
    }
}

/// Fire gate timing in ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardTiming {
    pub startup: TickRange,
    pub active: TickRange,
    pub rest: TickRange,
    pub width: f32,
}

/// Resolved, immutable chapter used by the simulation
#[derive(Debug, Clone)]
pub struct Chapter {
    pub name: String,
    pub base: BaseConfig,
    pub ramp: RampConfig,
    pub default_variant: String,
    pub variants: Vec<VariantConfig>,
    pub score_item_chance: f32,
    /// Rolled in order; first success wins
    pub powerups: Vec<PowerupSpawn>,
    pub powerup_cooldown_ticks: u64,
    pub invincible_ticks: u64,
    pub float_ticks: u64,
    pub float_gravity_factor: f32,
    pub hazard: HazardTiming,
}

impl Default for Chapter {
    fn default() -> Self {
        ChapterConfig::default().resolve()
    }
}

impl Chapter {
    /// Load and resolve a chapter file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChapterError> {
        let chapter = ChapterConfig::load(path)?.resolve();
        log::info!(
            "Loaded chapter '{}' ({} variants, {} power-ups)",
            chapter.name,
            chapter.variants.len(),
            chapter.powerups.len()
        );
        Ok(chapter)
    }

    /// Whether a variant id carries a fire gate
    pub fn is_hazard_variant(&self, id: &str) -> bool {
        self.variants.iter().any(|v| v.id == id && v.hazard)
    }
}
