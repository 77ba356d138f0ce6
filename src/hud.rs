//! HUD values and their on-screen text

/// Raw HUD values for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudSnapshot {
    pub health: u32,
    pub money: u64,
    pub kills: u32,
    pub elapsed_secs: u64,
    pub black_hole_cooldown_ms: u64,
    /// Sampled by the periodic cooldown display refresh
    pub turret_cooldown_ms: u64,
}

/// Formatted HUD strings handed to the presenter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HudText {
    pub health: String,
    pub money: String,
    pub timer: String,
    pub black_hole_cooldown: String,
    pub turret_cooldown: String,
}

impl HudSnapshot {
    pub fn text(&self) -> HudText {
        HudText {
            health: format!("Health: {}", self.health),
            money: format!("Money: {}", self.money),
            timer: format!("Timer: {}s", self.elapsed_secs),
            black_hole_cooldown: format!("{}s", self.black_hole_cooldown_ms.div_ceil(1000)),
            turret_cooldown: turret_cooldown_text(self.turret_cooldown_ms),
        }
    }
}

/// Seconds within the minute, zero padded (" 0s" when ready)
fn turret_cooldown_text(remaining_ms: u64) -> String {
    if remaining_ms == 0 {
        " 0s".to_string()
    } else {
        format!(" {:02}s", (remaining_ms % 60_000) / 1000)
    }
}
