//! Level configuration
//!
//! Difficulty is data: each level is a `LevelConfig`, and a run walks an
//! ordered `LevelSet` from the first entry to the last.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FLAG_OFFSET, MAX_FLOOR_GAP, PLAYER_WIDTH};

/// Per-level generator and difficulty parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    /// Total world width in units
    pub world_width: f32,
    /// Chance of a gap after each eligible floor segment
    pub gap_chance: f32,
    /// Chance that a floating platform is breakable
    pub breakable_chance: f32,
    /// Minimum distance between enemy placement attempts
    pub enemy_spacing: f32,
    /// Upper bound for enemy patrol speed
    pub enemy_speed: f32,
    /// Number of cannons (0 disables them)
    #[serde(alias = "turretCount")]
    pub cannon_count: u32,
    /// Ticks between cannon shots
    #[serde(alias = "turretFireRate")]
    pub cannon_fire_rate: u32,
}

/// Errors from loading or validating level data
#[derive(Debug, Error)]
pub enum LevelConfigError {
    #[error("level set is empty")]
    Empty,
    #[error("level {level}: {field} must be within [0, 1], got {value}")]
    Probability {
        level: u32,
        field: &'static str,
        value: f32,
    },
    #[error("level {level}: {field} must be positive, got {value}")]
    NotPositive {
        level: u32,
        field: &'static str,
        value: f32,
    },
    #[error("level {level}: enemy spacing {value} is narrower than an enemy ({min})")]
    SpacingTooSmall { level: u32, value: f32, min: f32 },
    #[error("level {level}: world width {width} leaves no room for the flag")]
    TooNarrow { level: u32, width: f32 },
    #[error("level {level}: cannons need a fire rate")]
    MissingFireRate { level: u32 },
    #[error("invalid level JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimum world width for a playable level: spawn area, a floor run and
/// the flag clearance
const MIN_WORLD_WIDTH: f32 = 1000.0 + FLAG_OFFSET + MAX_FLOOR_GAP;

/// Enemies are never placed closer together than one body width
const MIN_ENEMY_SPACING: f32 = PLAYER_WIDTH;

impl LevelConfig {
    fn validate(&self, level: u32) -> Result<(), LevelConfigError> {
        for (field, value) in [
            ("gapChance", self.gap_chance),
            ("breakableChance", self.breakable_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LevelConfigError::Probability {
                    level,
                    field,
                    value,
                });
            }
        }
        for (field, value) in [
            ("worldWidth", self.world_width),
            ("enemySpacing", self.enemy_spacing),
            ("enemySpeed", self.enemy_speed),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(LevelConfigError::NotPositive {
                    level,
                    field,
                    value,
                });
            }
        }
        if self.enemy_spacing < MIN_ENEMY_SPACING {
            return Err(LevelConfigError::SpacingTooSmall {
                level,
                value: self.enemy_spacing,
                min: MIN_ENEMY_SPACING,
            });
        }
        if self.world_width < MIN_WORLD_WIDTH {
            return Err(LevelConfigError::TooNarrow {
                level,
                width: self.world_width,
            });
        }
        if self.cannon_count > 0 && self.cannon_fire_rate == 0 {
            return Err(LevelConfigError::MissingFireRate { level });
        }
        Ok(())
    }
}

/// Ordered list of levels, indexed from 1
///
/// Deserializing goes through `LevelSet::new`, so a set is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelConfig>", into = "Vec<LevelConfig>")]
pub struct LevelSet {
    levels: Vec<LevelConfig>,
}

impl TryFrom<Vec<LevelConfig>> for LevelSet {
    type Error = LevelConfigError;

    fn try_from(levels: Vec<LevelConfig>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelSet> for Vec<LevelConfig> {
    fn from(set: LevelSet) -> Self {
        set.levels
    }
}

impl Default for LevelSet {
    /// The reference campaign: three levels of rising difficulty
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig {
                    world_width: 5000.0,
                    gap_chance: 0.20,
                    breakable_chance: 0.25,
                    enemy_spacing: 500.0,
                    enemy_speed: 1.5,
                    cannon_count: 0,
                    cannon_fire_rate: 0,
                },
                LevelConfig {
                    world_width: 6500.0,
                    gap_chance: 0.30,
                    breakable_chance: 0.35,
                    enemy_spacing: 400.0,
                    enemy_speed: 2.5,
                    cannon_count: 3,
                    cannon_fire_rate: 180,
                },
                LevelConfig {
                    world_width: 8000.0,
                    gap_chance: 0.40,
                    breakable_chance: 0.45,
                    enemy_spacing: 300.0,
                    enemy_speed: 3.5,
                    cannon_count: 5,
                    cannon_fire_rate: 140,
                },
            ],
        }
    }
}

impl LevelSet {
    /// Build a validated set from a list of configs
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, LevelConfigError> {
        let set = Self { levels };
        set.validate()?;
        Ok(set)
    }

    /// Parse a JSON array of level configs (camelCase keys)
    pub fn from_json(json: &str) -> Result<Self, LevelConfigError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn validate(&self) -> Result<(), LevelConfigError> {
        if self.levels.is_empty() {
            return Err(LevelConfigError::Empty);
        }
        for (i, config) in self.levels.iter().enumerate() {
            config.validate(i as u32 + 1)?;
        }
        Ok(())
    }

    /// Config for a 1-based level number
    pub fn get(&self, level: u32) -> Option<&LevelConfig> {
        let index = level.checked_sub(1)? as usize;
        self.levels.get(index)
    }

    pub fn len(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// True if `level` is the last one in the set
    pub fn is_final(&self, level: u32) -> bool {
        level >= self.len()
    }
}
