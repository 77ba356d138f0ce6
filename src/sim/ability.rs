//! Black hole and turret abilities
//!
//! Both abilities are gated by a cooldown measured from the start of their
//! last activation. The black hole is a singleton and also refuses casts while
//! one is active; turrets may overlap.
//!
//! Every sub-behaviour (attraction, turret fire, turret chase, expiry) is a
//! scheduler task whose handle is stored on the entity, so expiry cancels all
//! of them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::clock::SimulationClock;
use super::combat::{self, DamageSource};
use super::scheduler::{Scheduler, Task};
use super::spawn::fire_at_nearest;
use super::state::{
    BlackHole, BulletOwner, EntityId, EntityKind, EntityView, GameEvent, GameState, Turret,
};
use crate::direction_to;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityState {
    Idle,
    Active,
}

/// Why a cast had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastRejection {
    OnCooldown { remaining_ms: u64 },
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    Accepted(EntityId),
    Rejected(CastRejection),
}

impl CastOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CastOutcome::Accepted(_))
    }
}

/// Read-only ability summary for HUD and autopilot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityStatus {
    pub black_hole: AbilityState,
    pub black_hole_cooldown_ms: u64,
    pub turret_cooldown_ms: u64,
    pub active_turrets: usize,
}

impl AbilityStatus {
    pub fn black_hole_ready(&self) -> bool {
        self.black_hole == AbilityState::Idle && self.black_hole_cooldown_ms == 0
    }

    pub fn turret_ready(&self) -> bool {
        self.turret_cooldown_ms == 0
    }
}

/// Cooldown bookkeeping for both abilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityManager {
    black_hole_last_start: Option<u64>,
    turret_last_start: Option<u64>,
    /// Turret cooldown as last sampled by the cooldown display task
    turret_display_ms: u64,
}

impl AbilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn black_hole_state(&self, state: &GameState) -> AbilityState {
        if state.black_hole.is_some() {
            AbilityState::Active
        } else {
            AbilityState::Idle
        }
    }

    pub fn black_hole_last_start(&self) -> Option<u64> {
        self.black_hole_last_start
    }

    pub fn black_hole_cooldown_remaining(&self, clock: &SimulationClock, tuning: &Tuning) -> u64 {
        clock.remaining(self.black_hole_last_start, tuning.black_hole.cooldown_ms)
    }

    pub fn turret_cooldown_remaining(&self, clock: &SimulationClock, tuning: &Tuning) -> u64 {
        clock.remaining(self.turret_last_start, tuning.turret.cooldown_ms)
    }

    /// Turret cooldown as shown on the HUD (refreshed on its own interval)
    pub fn turret_display_ms(&self) -> u64 {
        self.turret_display_ms
    }

    pub fn refresh_turret_display(&mut self, clock: &SimulationClock, tuning: &Tuning) {
        self.turret_display_ms = self.turret_cooldown_remaining(clock, tuning);
    }

    pub fn status(&self, state: &GameState, clock: &SimulationClock, tuning: &Tuning) -> AbilityStatus {
        AbilityStatus {
            black_hole: self.black_hole_state(state),
            black_hole_cooldown_ms: self.black_hole_cooldown_remaining(clock, tuning),
            turret_cooldown_ms: self.turret_cooldown_remaining(clock, tuning),
            active_turrets: state.turrets.len(),
        }
    }

    /// Drop a black hole at the player's position
    pub fn cast_black_hole(
        &mut self,
        state: &mut GameState,
        scheduler: &mut Scheduler,
        clock: &SimulationClock,
        tuning: &Tuning,
    ) -> CastOutcome {
        if state.black_hole.is_some() {
            log::debug!("Black hole rejected: already active");
            return CastOutcome::Rejected(CastRejection::AlreadyActive);
        }
        let remaining_ms = self.black_hole_cooldown_remaining(clock, tuning);
        if remaining_ms > 0 {
            log::debug!("Black hole rejected: {}ms cooldown left", remaining_ms);
            return CastOutcome::Rejected(CastRejection::OnCooldown { remaining_ms });
        }

        let now = clock.now();
        let id = state.next_entity_id();
        let hole = BlackHole {
            id,
            pos: state.player.pos,
            started_ms: now,
            attract_task: scheduler.every_frame(Task::BlackHoleAttract),
            expire_task: scheduler.once(Task::BlackHoleExpire, tuning.black_hole.duration_ms, now),
        };
        state.events.push(GameEvent::Created(EntityView {
            id,
            kind: EntityKind::BlackHole,
            pos: hole.pos,
            facing: 0.0,
        }));
        state.black_hole = Some(hole);
        self.black_hole_last_start = Some(now);
        log::info!("Black hole {:?} cast at {}ms", id, now);
        CastOutcome::Accepted(id)
    }

    /// One attraction frame: pull and damage every enemy in range.
    /// Returns the number of enemies killed.
    pub fn attract(state: &mut GameState, tuning: &Tuning) -> u32 {
        let Some(center) = state.black_hole.as_ref().map(|h| h.pos) else {
            return 0;
        };
        let mut kills = 0;
        for enemy_id in state.enemies.ids() {
            let Some(enemy) = state.enemies.get_mut(enemy_id) else {
                continue;
            };
            if enemy.pos.distance(center) >= tuning.black_hole.radius {
                continue;
            }
            enemy.pos += direction_to(enemy.pos, center) * tuning.black_hole.pull_speed;
            let outcome = combat::damage_enemy(
                state,
                enemy_id,
                tuning.black_hole.damage_per_frame,
                DamageSource::BlackHole,
                tuning,
            );
            if outcome == combat::DamageOutcome::Killed {
                kills += 1;
            }
        }
        kills
    }

    /// End the active black hole, if any
    pub fn expire_black_hole(state: &mut GameState, scheduler: &mut Scheduler) {
        if let Some(hole) = state.black_hole.take() {
            scheduler.cancel(hole.attract_task);
            scheduler.cancel(hole.expire_task);
            state.events.push(GameEvent::Removed(hole.id));
            log::info!("Black hole {:?} expired", hole.id);
        }
    }

    /// Deploy a turret at the player's position
    pub fn cast_turret(
        &mut self,
        state: &mut GameState,
        scheduler: &mut Scheduler,
        clock: &SimulationClock,
        tuning: &Tuning,
    ) -> CastOutcome {
        let remaining_ms = self.turret_cooldown_remaining(clock, tuning);
        if remaining_ms > 0 {
            log::debug!("Turret rejected: {}ms cooldown left", remaining_ms);
            return CastOutcome::Rejected(CastRejection::OnCooldown { remaining_ms });
        }

        let now = clock.now();
        let id = state.next_entity_id();
        let turret = Turret {
            id,
            pos: state.player.pos,
            facing: 0.0,
            started_ms: now,
            fire_task: scheduler.every(Task::TurretFire(id), tuning.turret.fire_interval_ms, now),
            chase_task: scheduler.every_frame(Task::TurretChase(id)),
            expire_task: scheduler.once(Task::TurretExpire(id), tuning.turret.lifetime_ms, now),
        };
        state.events.push(GameEvent::Created(EntityView {
            id,
            kind: EntityKind::Turret,
            pos: turret.pos,
            facing: turret.facing,
        }));
        state.turrets.add(turret);
        self.turret_last_start = Some(now);
        self.refresh_turret_display(clock, tuning);
        log::info!(
            "Turret {:?} deployed at {}ms ({} active)",
            id,
            now,
            state.turrets.len()
        );
        CastOutcome::Accepted(id)
    }

    /// Turret shot at the enemy nearest to the turret
    pub fn turret_fire(state: &mut GameState, turret_id: EntityId, tuning: &Tuning) -> Option<EntityId> {
        let origin: Vec3 = state.turrets.get(turret_id)?.pos;
        fire_at_nearest(state, origin, BulletOwner::Turret(turret_id), tuning)
    }

    /// Despawn a turret and cancel all of its tasks
    pub fn expire_turret(state: &mut GameState, scheduler: &mut Scheduler, turret_id: EntityId) {
        if let Some(turret) = state.remove_turret(turret_id) {
            scheduler.cancel(turret.fire_task);
            scheduler.cancel(turret.chase_task);
            scheduler.cancel(turret.expire_task);
            log::info!("Turret {:?} expired", turret_id);
        }
    }

    /// Remove every ability entity and its tasks (cooldowns are kept)
    pub fn clear(state: &mut GameState, scheduler: &mut Scheduler) {
        Self::expire_black_hole(state, scheduler);
        for turret_id in state.turrets.ids() {
            Self::expire_turret(state, scheduler, turret_id);
        }
    }
}
