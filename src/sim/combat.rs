//! Proximity combat resolution
//!
//! Two passes per tick, always in this order:
//! 1. bullets against enemies (a bullet hits at most one enemy, the first in
//!    id order within range)
//! 2. enemies against the player (contact damage, enemy removed unrewarded)

use super::state::{EntityId, GameEvent, GameState, HealthTier};
use crate::consts::{LEGACY_BLACK_HOLE_BAR_DIVISOR, LEGACY_COMBAT_BAR_DIVISOR};
use crate::tuning::Tuning;

/// Where the damage came from; selects the legacy health bar divisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Bullet,
    BlackHole,
}

impl DamageSource {
    fn legacy_divisor(self) -> f32 {
        match self {
            DamageSource::Bullet => LEGACY_COMBAT_BAR_DIVISOR,
            DamageSource::BlackHole => LEGACY_BLACK_HOLE_BAR_DIVISOR,
        }
    }
}

/// Result of damaging an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Enemy is gone already
    Stale,
    Wounded,
    Killed,
}

/// Summary of one combat pass pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatReport {
    pub bullet_hits: u32,
    pub kills: u32,
    pub contacts: u32,
    pub player_died: bool,
}

/// Health bar scale for `health`, normalized by the enemy's own max health
/// unless the legacy fixed divisors are enabled
pub fn health_bar_scale(health: f32, max_health: f32, source: DamageSource, tuning: &Tuning) -> f32 {
    let divisor = if tuning.legacy_health_bar_scale {
        source.legacy_divisor()
    } else {
        max_health
    };
    health / divisor
}

/// Damage an enemy, refresh its health bar and reap it if it died.
///
/// Kills award a kill and `kill_reward` currency regardless of source.
pub fn damage_enemy(
    state: &mut GameState,
    id: EntityId,
    amount: f32,
    source: DamageSource,
    tuning: &Tuning,
) -> DamageOutcome {
    let Some(enemy) = state.enemies.get_mut(id) else {
        return DamageOutcome::Stale;
    };
    enemy.health = (enemy.health - amount).max(0.0);
    let health = enemy.health;
    let alive = enemy.is_alive();
    let kind = enemy.kind;
    let scale = health_bar_scale(health, enemy.max_health, source, tuning);
    state.events.push(GameEvent::HealthBar {
        id,
        tier: HealthTier::for_health(health),
        scale,
    });

    if alive {
        return DamageOutcome::Wounded;
    }

    state.remove_enemy(id);
    state.player.kills += 1;
    state.player.money += tuning.kill_reward;
    state.events.push(GameEvent::EnemyKilled { id, kind });
    log::debug!(
        "{:?} {:?} killed by {:?} (kills={}, money={})",
        kind,
        id,
        source,
        state.player.kills,
        state.player.money
    );
    DamageOutcome::Killed
}

/// Pass 1: bullets against enemies
pub fn resolve_bullet_hits(state: &mut GameState, tuning: &Tuning, report: &mut CombatReport) {
    for bullet_id in state.bullets.ids() {
        let Some(bullet) = state.bullets.get(bullet_id) else {
            continue;
        };
        let (pos, damage) = (bullet.pos, bullet.damage);

        let target = state
            .enemies
            .iter()
            .find(|e| e.pos.distance(pos) < tuning.collision_radius)
            .map(|e| e.id);

        if let Some(enemy_id) = target {
            state.remove_bullet(bullet_id);
            report.bullet_hits += 1;
            if damage_enemy(state, enemy_id, damage, DamageSource::Bullet, tuning)
                == DamageOutcome::Killed
            {
                report.kills += 1;
            }
        }
    }
}

/// Pass 2: enemies touching the player. Stops as soon as the player dies.
pub fn resolve_player_contact(state: &mut GameState, tuning: &Tuning, report: &mut CombatReport) {
    for enemy_id in state.enemies.ids() {
        let Some(enemy) = state.enemies.get(enemy_id) else {
            continue;
        };
        if enemy.pos.distance(state.player.pos) >= tuning.collision_radius {
            continue;
        }

        state.player.health = state.player.health.saturating_sub(tuning.contact_damage);
        state.remove_enemy(enemy_id);
        report.contacts += 1;
        state.events.push(GameEvent::PlayerHit {
            health: state.player.health,
        });
        log::debug!("Player hit by {:?}, health={}", enemy_id, state.player.health);

        if state.player.is_dead() {
            report.player_died = true;
            break;
        }
    }
}

/// Run both passes
pub fn resolve(state: &mut GameState, tuning: &Tuning) -> CombatReport {
    let mut report = CombatReport::default();
    resolve_bullet_hits(state, tuning, &mut report);
    resolve_player_contact(state, tuning, &mut report);
    report
}
