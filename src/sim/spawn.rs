//! Enemy spawning

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Bullet, BulletOwner, Enemy, EnemyKind, EntityId, GameState, RngState};
use crate::tuning::Tuning;

/// Fire a bullet from `origin` at the enemy nearest to it.
///
/// Nothing is fired when there are no enemies or the nearest one sits
/// exactly on `origin` (no direction to aim along).
pub fn fire_at_nearest(
    state: &mut GameState,
    origin: Vec3,
    owner: BulletOwner,
    tuning: &Tuning,
) -> Option<EntityId> {
    let target = state.nearest_enemy(origin)?.pos;
    if target == origin {
        return None;
    }
    let id = state.next_entity_id();
    let bullet = Bullet::aimed(id, origin, target, owner, tuning)?;
    state.spawn_bullet(bullet);
    Some(id)
}

/// Manufactures enemies from a seeded RNG
#[derive(Debug, Clone)]
pub struct SpawnController {
    rng_state: RngState,
    rng: Pcg32,
}

impl SpawnController {
    pub fn new(seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            rng: rng_state.to_rng(),
            rng_state,
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Pick a kind uniformly and place it anywhere in the spawn square.
    /// Overlap with other entities is allowed.
    pub fn spawn_enemy(&mut self, id: EntityId, tuning: &Tuning) -> Enemy {
        let kind = EnemyKind::ALL[self.rng.random_range(0..EnemyKind::ALL.len())];
        let half = tuning.spawn_half_extent;
        let x = self.rng.random_range(-half..half);
        let z = self.rng.random_range(-half..half);
        let enemy = Enemy::new(id, kind, Vec3::new(x, tuning.ground_y, z));
        log::debug!("Spawned {:?} {:?} at ({:.2}, {:.2})", kind, id, x, z);
        enemy
    }
}
