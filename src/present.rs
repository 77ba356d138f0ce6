//! Rendering collaborator interface
//!
//! The simulation never reads anything back from the presenter; every call is
//! fire-and-forget and happens after a frame's state has settled.

use glam::Vec3;

use crate::hud::HudText;
use crate::sim::{EntityId, EntityView, HealthTier};

pub trait Presenter {
    fn entity_created(&mut self, entity: &EntityView);
    fn entity_removed(&mut self, id: EntityId);
    fn entity_moved(&mut self, id: EntityId, pos: Vec3, facing: f32);
    fn health_bar(&mut self, id: EntityId, tier: HealthTier, scale: f32);
    fn update_hud(&mut self, hud: &HudText);
    fn show_game_over(&mut self, survived_secs: u64);
    fn hide_game_over(&mut self);
}

/// Discards everything (headless runs, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn entity_created(&mut self, _entity: &EntityView) {}
    fn entity_removed(&mut self, _id: EntityId) {}
    fn entity_moved(&mut self, _id: EntityId, _pos: Vec3, _facing: f32) {}
    fn health_bar(&mut self, _id: EntityId, _tier: HealthTier, _scale: f32) {}
    fn update_hud(&mut self, _hud: &HudText) {}
    fn show_game_over(&mut self, _survived_secs: u64) {}
    fn hide_game_over(&mut self) {}
}

/// Writes presenter traffic to the log
#[derive(Debug, Default, Clone)]
pub struct LogPresenter {
    last_hud: HudText,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for LogPresenter {
    fn entity_created(&mut self, entity: &EntityView) {
        log::debug!(
            "+ {:?} {:?} at ({:.1}, {:.1})",
            entity.kind,
            entity.id,
            entity.pos.x,
            entity.pos.z
        );
    }

    fn entity_removed(&mut self, id: EntityId) {
        log::debug!("- {:?}", id);
    }

    fn entity_moved(&mut self, id: EntityId, pos: Vec3, facing: f32) {
        log::trace!("~ {:?} ({:.2}, {:.2}) yaw {:.2}", id, pos.x, pos.z, facing);
    }

    fn health_bar(&mut self, id: EntityId, tier: HealthTier, scale: f32) {
        log::trace!(
            "{:?} health bar {:?} #{:06x} {:.3}",
            id,
            tier,
            tier.color(),
            scale
        );
    }

    fn update_hud(&mut self, hud: &HudText) {
        // Only log when something visible changed
        if *hud != self.last_hud {
            log::info!(
                "{} | {} | {} | black hole {} | turret{}",
                hud.health,
                hud.money,
                hud.timer,
                hud.black_hole_cooldown,
                hud.turret_cooldown
            );
            self.last_hud = hud.clone();
        }
    }

    fn show_game_over(&mut self, survived_secs: u64) {
        log::info!("Game Over! Survived {}s", survived_secs);
    }

    fn hide_game_over(&mut self) {
        log::info!("Game over screen dismissed");
    }
}
