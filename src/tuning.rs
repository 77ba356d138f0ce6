//! Game balance and rule switches
//!
//! Loaded from an optional JSON file; any field left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Upper bound for any interval, duration or cooldown (one day)
pub const MAX_TIMER_MS: u64 = 24 * 60 * 60 * 1000;

/// Failure to load or accept a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Black hole ability parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackHoleTuning {
    pub duration_ms: u64,
    pub cooldown_ms: u64,
    /// Enemies closer than this are pulled and damaged
    pub radius: f32,
    /// Pull per frame toward the hole
    pub pull_speed: f32,
    pub damage_per_frame: f32,
}

impl Default for BlackHoleTuning {
    fn default() -> Self {
        Self {
            duration_ms: BLACK_HOLE_DURATION_MS,
            cooldown_ms: BLACK_HOLE_COOLDOWN_MS,
            radius: BLACK_HOLE_RADIUS,
            pull_speed: ENEMY_SPEED,
            damage_per_frame: BLACK_HOLE_DAMAGE_PER_FRAME,
        }
    }
}

/// Turret ability parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretTuning {
    pub cooldown_ms: u64,
    pub lifetime_ms: u64,
    pub fire_interval_ms: u64,
    pub chase_speed: f32,
}

impl Default for TurretTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: TURRET_COOLDOWN_MS,
            lifetime_ms: TURRET_LIFETIME_MS,
            fire_interval_ms: TURRET_FIRE_INTERVAL_MS,
            chase_speed: TURRET_CHASE_SPEED,
        }
    }
}

/// Complete tuning for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub ground_y: f32,
    pub spawn_half_extent: f32,
    pub enemy_spawn_interval_ms: u64,

    // === Player ===
    pub player_speed: f32,
    pub player_start_health: u32,
    pub player_fire_interval_ms: u64,

    // === Bullets ===
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_max_distance: f32,

    // === Combat ===
    pub collision_radius: f32,
    pub contact_damage: u32,
    pub kill_reward: u64,

    // === Abilities ===
    pub black_hole: BlackHoleTuning,
    pub turret: TurretTuning,

    // === HUD ===
    pub cooldown_display_interval_ms: u64,

    // === Rule switches ===
    /// Scale health bars by the fixed 150 (combat) / 100 (black hole) divisors
    /// instead of each enemy's own max health
    pub legacy_health_bar_scale: bool,
    /// Remove residual enemies, bullets, turrets and the black hole on restart
    pub clear_entities_on_restart: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ground_y: GROUND_Y,
            spawn_half_extent: SPAWN_HALF_EXTENT,
            enemy_spawn_interval_ms: ENEMY_SPAWN_INTERVAL_MS,

            player_speed: PLAYER_SPEED,
            player_start_health: PLAYER_START_HEALTH,
            player_fire_interval_ms: PLAYER_FIRE_INTERVAL_MS,

            bullet_speed: BULLET_SPEED,
            bullet_damage: BULLET_DAMAGE,
            bullet_max_distance: BULLET_MAX_DISTANCE,

            collision_radius: COLLISION_RADIUS,
            contact_damage: CONTACT_DAMAGE,
            kill_reward: KILL_REWARD,

            black_hole: BlackHoleTuning::default(),
            turret: TurretTuning::default(),

            cooldown_display_interval_ms: COOLDOWN_DISPLAY_INTERVAL_MS,

            legacy_health_bar_scale: false,
            clear_entities_on_restart: true,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Using default tuning ({})", e);
                Self::default()
            }
        }
    }

    /// Reject values the scheduler or combat rules cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        let intervals = [
            ("enemy_spawn_interval_ms", self.enemy_spawn_interval_ms),
            ("player_fire_interval_ms", self.player_fire_interval_ms),
            ("turret.fire_interval_ms", self.turret.fire_interval_ms),
            ("cooldown_display_interval_ms", self.cooldown_display_interval_ms),
            ("black_hole.duration_ms", self.black_hole.duration_ms),
            ("turret.lifetime_ms", self.turret.lifetime_ms),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }
        let cooldowns = [
            ("black_hole.cooldown_ms", self.black_hole.cooldown_ms),
            ("turret.cooldown_ms", self.turret.cooldown_ms),
        ];
        for (field, value) in intervals.into_iter().chain(cooldowns) {
            if value > MAX_TIMER_MS {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must not exceed one day",
                });
            }
        }
        if self.collision_radius <= 0.0 {
            return Err(TuningError::Invalid {
                field: "collision_radius",
                reason: "must be positive",
            });
        }
        if self.bullet_max_distance <= 0.0 {
            return Err(TuningError::Invalid {
                field: "bullet_max_distance",
                reason: "must be positive",
            });
        }
        if self.spawn_half_extent <= 0.0 {
            return Err(TuningError::Invalid {
                field: "spawn_half_extent",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
