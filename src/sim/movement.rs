//! Position integration
//!
//! All speeds are distances per tick. Walls are cosmetic: nothing here clamps
//! the player or enemies to the arena.

use glam::Vec3;

use super::state::{EntityId, GameState};
use crate::input::TickInput;
use crate::tuning::Tuning;
use crate::{bearing, direction_to};

/// Displacement from the four directional intents. Axes are not
/// normalized, so diagonals move faster than a single direction.
pub fn player_displacement(input: &TickInput, speed: f32) -> Vec3 {
    let mut delta = Vec3::ZERO;
    if input.forward {
        delta.z -= speed;
    }
    if input.back {
        delta.z += speed;
    }
    if input.left {
        delta.x -= speed;
    }
    if input.right {
        delta.x += speed;
    }
    delta
}

pub fn move_player(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    state.player.pos += player_displacement(input, tuning.player_speed);
    state.player.pos.y = tuning.ground_y;
}

/// Turn the player toward the nearest enemy; keep facing when there are none
pub fn face_nearest_enemy(state: &mut GameState) {
    let player = state.player.pos;
    if let Some(target) = state.nearest_enemy(player).map(|e| e.pos) {
        let dir = direction_to(player, target);
        if dir != Vec3::ZERO {
            state.player.facing = bearing(dir);
        }
    }
}

/// Every enemy steps straight toward the player at its own speed
pub fn move_enemies(state: &mut GameState) {
    let target = state.player.pos;
    for enemy in state.enemies.iter_mut() {
        let dir = direction_to(enemy.pos, target);
        if dir != Vec3::ZERO {
            enemy.facing = bearing(dir);
        }
        enemy.pos += dir * enemy.speed;
    }
}

/// Advance bullets along their fixed direction and drop the ones that left
/// the arena. Returns the number removed.
pub fn move_bullets(state: &mut GameState, tuning: &Tuning) -> usize {
    let mut escaped = Vec::new();
    for bullet in state.bullets.iter_mut() {
        bullet.pos += bullet.dir * bullet.speed;
        if bullet.pos.length() > tuning.bullet_max_distance {
            escaped.push(bullet.id);
        }
    }
    for id in &escaped {
        state.remove_bullet(*id);
    }
    escaped.len()
}

/// One chase step of a turret toward the enemy nearest to it.
/// Missing turret or no enemies: nothing happens.
pub fn chase_step(state: &mut GameState, turret_id: EntityId, tuning: &Tuning) {
    let Some(turret_pos) = state.turrets.get(turret_id).map(|t| t.pos) else {
        return;
    };
    let Some(target) = state.nearest_enemy(turret_pos).map(|e| e.pos) else {
        return;
    };
    let dir = direction_to(turret_pos, target);
    if let Some(turret) = state.turrets.get_mut(turret_id) {
        turret.pos += dir * tuning.turret.chase_speed;
        if dir != Vec3::ZERO {
            turret.facing = bearing(dir);
        }
    }
}
