//! Per-tick input snapshot

use glam::Vec3;

use crate::sim::{AbilityStatus, GameState};

/// Input commands for a single tick, already debounced by the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held directions (forward = -Z, right = +X)
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Just pressed this tick
    pub cast_black_hole: bool,
    pub cast_turret: bool,
}

/// Enemies closer than this make the autopilot back away
const AUTOPILOT_PANIC_RANGE: f32 = 6.0;
/// Cast the black hole once this many enemies are within range
const AUTOPILOT_CROWD: usize = 5;
const AUTOPILOT_CROWD_RANGE: f32 = 15.0;

impl TickInput {
    /// Demo-mode input: back away from the nearest threat, drift toward the
    /// arena center otherwise, and use abilities when the field gets crowded.
    pub fn autopilot(state: &GameState, abilities: &AbilityStatus) -> Self {
        let player = state.player.pos;
        let mut input = TickInput::default();

        let nearest = state.nearest_enemy(player).map(|e| e.pos);
        let away = match nearest {
            Some(enemy) if enemy.distance(player) < AUTOPILOT_PANIC_RANGE => player - enemy,
            // Home toward the origin so the run stays inside the spawn square
            _ => -player,
        };
        steer(&mut input, away);

        let crowd = state
            .enemies
            .iter()
            .filter(|e| e.pos.distance(player) < AUTOPILOT_CROWD_RANGE)
            .count();
        input.cast_black_hole = abilities.black_hole_ready() && crowd >= AUTOPILOT_CROWD;
        input.cast_turret = abilities.turret_ready() && crowd > 0;
        input
    }
}

fn steer(input: &mut TickInput, toward: Vec3) {
    const DEADZONE: f32 = 0.5;
    if toward.x > DEADZONE {
        input.right = true;
    } else if toward.x < -DEADZONE {
        input.left = true;
    }
    if toward.z > DEADZONE {
        input.back = true;
    } else if toward.z < -DEADZONE {
        input.forward = true;
    }
}
