//! Game state and core simulation types

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scheduler::TaskHandle;
use super::store::{Entity, EntityStore};
use crate::tuning::Tuning;

/// Stable identifier linking a simulated entity to its visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved for the player avatar
    pub const PLAYER: EntityId = EntityId(0);
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, not started
    Ready,
    /// Ticking
    Playing,
    /// Player died; waiting for restart
    GameOver,
}

/// Variant tag used by the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Bullet,
    Enemy(EnemyKind),
    Turret,
    BlackHole,
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Light,
    Medium,
    Heavy,
}

/// Body colors of an enemy (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub body: u32,
    pub pants: u32,
    pub shirt: u32,
}

/// Fixed per-type stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: f32,
    pub speed: f32,
    pub palette: Palette,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Light, EnemyKind::Medium, EnemyKind::Heavy];

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Light => EnemyStats {
                max_health: 50.0,
                speed: 0.06,
                palette: Palette {
                    body: 0x00ff00,
                    pants: 0x006400,
                    shirt: 0x228b22,
                },
            },
            EnemyKind::Medium => EnemyStats {
                max_health: 100.0,
                speed: 0.04,
                palette: Palette {
                    body: 0xffa500,
                    pants: 0xff4500,
                    shirt: 0xff6347,
                },
            },
            EnemyKind::Heavy => EnemyStats {
                max_health: 150.0,
                speed: 0.02,
                palette: Palette {
                    body: 0xff0000,
                    pants: 0x8b0000,
                    shirt: 0xb22222,
                },
            },
        }
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Turret(EntityId),
}

/// A bullet travelling in a fixed direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec3,
    /// Unit length at creation, never renormalized
    pub dir: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub owner: BulletOwner,
}

impl Bullet {
    /// Aim a bullet from `origin` at `target`. None if they coincide.
    pub fn aimed(
        id: EntityId,
        origin: Vec3,
        target: Vec3,
        owner: BulletOwner,
        tuning: &Tuning,
    ) -> Option<Self> {
        let dir = (target - origin).try_normalize()?;
        Some(Self {
            id,
            pos: origin,
            dir,
            speed: tuning.bullet_speed,
            damage: tuning.bullet_damage,
            owner,
        })
    }
}

/// An enemy chasing the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Yaw (radians, 0 = +Z)
    pub facing: f32,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec3) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            pos,
            health: stats.max_health,
            max_health: stats.max_health,
            speed: stats.speed,
            facing: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    pub facing: f32,
    pub health: u32,
    pub money: u64,
    pub kills: u32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec3::new(0.0, tuning.ground_y, 0.0),
            facing: 0.0,
            health: tuning.player_start_health,
            money: 0,
            kills: 0,
        }
    }

    /// Reset stats for a new run (position is kept)
    pub fn reset(&mut self, tuning: &Tuning) {
        self.health = tuning.player_start_health;
        self.money = 0;
        self.kills = 0;
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// An autonomous turret spawned by the turret ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turret {
    pub id: EntityId,
    pub pos: Vec3,
    pub facing: f32,
    pub started_ms: u64,
    pub fire_task: TaskHandle,
    pub chase_task: TaskHandle,
    pub expire_task: TaskHandle,
}

/// The black hole placed by the black hole ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackHole {
    pub id: EntityId,
    /// Fixed at cast time
    pub pos: Vec3,
    pub started_ms: u64,
    pub attract_task: TaskHandle,
    pub expire_task: TaskHandle,
}

impl Entity for Bullet {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Turret {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Health bar color tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthTier {
    Green,
    Yellow,
    Red,
}

impl HealthTier {
    pub fn for_health(health: f32) -> Self {
        use crate::consts::{HEALTH_GREEN_ABOVE, HEALTH_YELLOW_ABOVE};
        if health > HEALTH_GREEN_ABOVE {
            HealthTier::Green
        } else if health > HEALTH_YELLOW_ABOVE {
            HealthTier::Yellow
        } else {
            HealthTier::Red
        }
    }

    pub fn color(self) -> u32 {
        match self {
            HealthTier::Green => 0x00ff00,
            HealthTier::Yellow => 0xffff00,
            HealthTier::Red => 0xff0000,
        }
    }
}

/// Snapshot of an entity handed to the presenter on creation
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub facing: f32,
}

/// Things that happened during a frame, flushed to the presenter afterwards
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Created(EntityView),
    Removed(EntityId),
    HealthBar {
        id: EntityId,
        tier: HealthTier,
        scale: f32,
    },
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
    },
    PlayerHit {
        health: u32,
    },
}

/// RNG seed wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Everything that lives in the arena
#[derive(Debug, Clone)]
pub struct GameState {
    pub player: Player,
    pub bullets: EntityStore<Bullet>,
    pub enemies: EntityStore<Enemy>,
    pub turrets: EntityStore<Turret>,
    pub black_hole: Option<BlackHole>,
    /// Events not yet handed to the presenter
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player: Player::new(tuning),
            bullets: EntityStore::new(),
            enemies: EntityStore::new(),
            turrets: EntityStore::new(),
            black_hole: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Nearest live enemy to `pos` (first in id order on ties)
    pub fn nearest_enemy(&self, pos: Vec3) -> Option<&Enemy> {
        let mut best: Option<(&Enemy, f32)> = None;
        for enemy in self.enemies.iter() {
            let d = enemy.pos.distance_squared(pos);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((enemy, d));
            }
        }
        best.map(|(e, _)| e)
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy) {
        self.events.push(GameEvent::Created(EntityView {
            id: enemy.id,
            kind: EntityKind::Enemy(enemy.kind),
            pos: enemy.pos,
            facing: enemy.facing,
        }));
        self.enemies.add(enemy);
    }

    pub fn spawn_bullet(&mut self, bullet: Bullet) {
        self.events.push(GameEvent::Created(EntityView {
            id: bullet.id,
            kind: EntityKind::Bullet,
            pos: bullet.pos,
            facing: 0.0,
        }));
        self.bullets.add(bullet);
    }

    pub fn remove_bullet(&mut self, id: EntityId) -> Option<Bullet> {
        let removed = self.bullets.remove(id);
        if removed.is_some() {
            self.events.push(GameEvent::Removed(id));
        }
        removed
    }

    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let removed = self.enemies.remove(id);
        if removed.is_some() {
            self.events.push(GameEvent::Removed(id));
        }
        removed
    }

    pub fn remove_turret(&mut self, id: EntityId) -> Option<Turret> {
        let removed = self.turrets.remove(id);
        if removed.is_some() {
            self.events.push(GameEvent::Removed(id));
        }
        removed
    }

    /// Presenter views of every live entity, player first
    pub fn views(&self) -> Vec<EntityView> {
        let mut views = Vec::with_capacity(
            1 + self.bullets.len() + self.enemies.len() + self.turrets.len() + 1,
        );
        views.push(EntityView {
            id: EntityId::PLAYER,
            kind: EntityKind::Player,
            pos: self.player.pos,
            facing: self.player.facing,
        });
        views.extend(self.enemies.iter().map(|e| EntityView {
            id: e.id,
            kind: EntityKind::Enemy(e.kind),
            pos: e.pos,
            facing: e.facing,
        }));
        views.extend(self.bullets.iter().map(|b| EntityView {
            id: b.id,
            kind: EntityKind::Bullet,
            pos: b.pos,
            facing: 0.0,
        }));
        views.extend(self.turrets.iter().map(|t| EntityView {
            id: t.id,
            kind: EntityKind::Turret,
            pos: t.pos,
            facing: t.facing,
        }));
        if let Some(hole) = &self.black_hole {
            views.push(EntityView {
                id: hole.id,
                kind: EntityKind::BlackHole,
                pos: hole.pos,
                facing: 0.0,
            });
        }
        views
    }
}
