//! Arena Shooter - simulation core for a 3D arena shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, movement, combat, abilities, scheduling)
//! - `tuning`: Data-driven game balance
//! - `present`: Rendering collaborator interface
//! - `hud`: HUD snapshot and text formatting
//! - `input`: Per-tick input snapshot and autopilot

pub mod hud;
pub mod input;
pub mod present;
pub mod sim;
pub mod tuning;

pub use hud::{HudSnapshot, HudText};
pub use input::TickInput;
pub use present::{LogPresenter, NullPresenter, Presenter};
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Nominal frame length (ms), ~60 Hz
    pub const FRAME_MS: u64 = 16;

    /// Height at which the player and enemies stand
    pub const GROUND_Y: f32 = 0.5;
    /// Enemies spawn in [-HALF, HALF) on both horizontal axes
    pub const SPAWN_HALF_EXTENT: f32 = 25.0;

    /// Player movement per tick per held direction
    pub const PLAYER_SPEED: f32 = 0.1;
    pub const PLAYER_START_HEALTH: u32 = 100;
    pub const PLAYER_FIRE_INTERVAL_MS: u64 = 125;

    /// Bullet defaults (player and turret share them)
    pub const BULLET_SPEED: f32 = 0.55;
    pub const BULLET_DAMAGE: f32 = 10.0;
    /// Bullets further than this from the origin are discarded
    pub const BULLET_MAX_DISTANCE: f32 = 100.0;

    pub const ENEMY_SPAWN_INTERVAL_MS: u64 = 1000;
    /// Global enemy speed, used by black hole attraction
    pub const ENEMY_SPEED: f32 = 0.04;

    /// Proximity threshold for bullet hits and enemy contact
    pub const COLLISION_RADIUS: f32 = 1.0;
    pub const CONTACT_DAMAGE: u32 = 10;
    pub const KILL_REWARD: u64 = 10;

    pub const BLACK_HOLE_DURATION_MS: u64 = 5_000;
    pub const BLACK_HOLE_COOLDOWN_MS: u64 = 40_000;
    pub const BLACK_HOLE_RADIUS: f32 = 50.0;
    pub const BLACK_HOLE_DAMAGE_PER_FRAME: f32 = 0.5;

    pub const TURRET_COOLDOWN_MS: u64 = 60_000;
    pub const TURRET_LIFETIME_MS: u64 = 8_000;
    pub const TURRET_FIRE_INTERVAL_MS: u64 = 200;
    pub const TURRET_CHASE_SPEED: f32 = 0.05;

    /// Refresh period of the turret cooldown readout
    pub const COOLDOWN_DISPLAY_INTERVAL_MS: u64 = 1000;

    /// Health bar color thresholds (absolute health)
    pub const HEALTH_GREEN_ABOVE: f32 = 50.0;
    pub const HEALTH_YELLOW_ABOVE: f32 = 0.0;

    /// Legacy health bar divisors
    pub const LEGACY_COMBAT_BAR_DIVISOR: f32 = 150.0;
    pub const LEGACY_BLACK_HOLE_BAR_DIVISOR: f32 = 100.0;
}

/// Yaw that faces along `dir` in the XZ plane (0 = +Z)
#[inline]
pub fn bearing(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

/// Unit vector from `from` toward `to`, or zero if they coincide
#[inline]
pub fn direction_to(from: Vec3, to: Vec3) -> Vec3 {
    (to - from).normalize_or_zero()
}
