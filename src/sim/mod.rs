//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Integer millisecond time advanced only by the session
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies; output goes through [`crate::Presenter`]

pub mod ability;
pub mod clock;
pub mod combat;
pub mod movement;
pub mod scheduler;
pub mod session;
pub mod spawn;
pub mod state;
pub mod store;

pub use ability::{AbilityManager, AbilityState, AbilityStatus, CastOutcome, CastRejection};
pub use clock::SimulationClock;
pub use combat::{CombatReport, DamageOutcome, DamageSource};
pub use scheduler::{Schedule, Scheduler, Task, TaskHandle};
pub use session::{FrameOutcome, GameSession};
pub use spawn::{SpawnController, fire_at_nearest};
pub use state::{
    BlackHole, Bullet, BulletOwner, Enemy, EnemyKind, EnemyStats, EntityId, EntityKind,
    EntityView, GameEvent, GamePhase, GameState, HealthTier, Palette, Player, RngState, Turret,
};
pub use store::{Entity, EntityStore};
