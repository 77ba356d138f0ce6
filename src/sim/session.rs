//! Session orchestration
//!
//! A frame is: main tick (casts, movement, combat, facing), then every
//! scheduler task that came due, then one flush of the settled state to the
//! presenter. Nothing advances outside [`GamePhase::Playing`].

use super::ability::{AbilityManager, AbilityStatus, CastOutcome};
use super::clock::SimulationClock;
use super::combat::{self, CombatReport};
use super::movement;
use super::scheduler::{Scheduler, Task};
use super::spawn::{SpawnController, fire_at_nearest};
use super::state::{BulletOwner, EntityId, EntityKind, EntityView, GameEvent, GamePhase, GameState};
use crate::hud::HudSnapshot;
use crate::input::TickInput;
use crate::present::Presenter;
use crate::tuning::Tuning;

/// What a call to [`GameSession::frame`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Session not playing; nothing changed
    Ignored,
    Continue,
    /// This frame ended the run
    GameOver { survived_secs: u64 },
}

/// Owns the whole simulation
#[derive(Debug, Clone)]
pub struct GameSession {
    tuning: Tuning,
    phase: GamePhase,
    clock: SimulationClock,
    scheduler: Scheduler,
    state: GameState,
    abilities: AbilityManager,
    spawner: SpawnController,
    last_combat: CombatReport,
}

impl GameSession {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        log::info!("New session with seed {}", seed);
        Self {
            state: GameState::new(&tuning),
            tuning,
            phase: GamePhase::Ready,
            clock: SimulationClock::new(),
            scheduler: Scheduler::new(),
            abilities: AbilityManager::new(),
            spawner: SpawnController::new(seed),
            last_combat: CombatReport::default(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.spawner.seed()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now()
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    /// Whole seconds survived in the current run
    pub fn elapsed_secs(&self) -> u64 {
        self.clock.run_elapsed_secs()
    }

    /// Combat summary of the most recent frame
    pub fn last_combat(&self) -> CombatReport {
        self.last_combat
    }

    pub fn abilities(&self) -> AbilityStatus {
        self.abilities.status(&self.state, &self.clock, &self.tuning)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            health: self.state.player.health,
            money: self.state.player.money,
            kills: self.state.player.kills,
            elapsed_secs: self.elapsed_secs(),
            black_hole_cooldown_ms: self
                .abilities
                .black_hole_cooldown_remaining(&self.clock, &self.tuning),
            turret_cooldown_ms: self.abilities.turret_display_ms(),
        }
    }

    /// Register the session timers and begin playing. Only valid once.
    pub fn start(&mut self, presenter: &mut dyn Presenter) {
        if self.phase != GamePhase::Ready {
            log::warn!("start() ignored in phase {:?}", self.phase);
            return;
        }
        let now = self.clock.now();
        self.scheduler
            .every(Task::SpawnEnemy, self.tuning.enemy_spawn_interval_ms, now);
        self.scheduler
            .every(Task::PlayerFire, self.tuning.player_fire_interval_ms, now);
        self.scheduler.every(
            Task::CooldownDisplay,
            self.tuning.cooldown_display_interval_ms,
            now,
        );
        self.state.events.push(GameEvent::Created(EntityView {
            id: EntityId::PLAYER,
            kind: EntityKind::Player,
            pos: self.state.player.pos,
            facing: self.state.player.facing,
        }));
        self.clock.restart_run();
        self.phase = GamePhase::Playing;
        log::info!("Session started");
        self.flush(presenter);
    }

    /// Advance one frame of `dt_ms`
    pub fn frame(
        &mut self,
        input: &TickInput,
        dt_ms: u64,
        presenter: &mut dyn Presenter,
    ) -> FrameOutcome {
        if self.phase != GamePhase::Playing {
            return FrameOutcome::Ignored;
        }
        self.clock.advance(dt_ms);

        let report = self.tick(input);
        self.last_combat = report;
        if !report.player_died {
            self.run_due_tasks();
        }
        self.flush(presenter);

        if report.player_died {
            let survived_secs = self.enter_game_over(presenter);
            FrameOutcome::GameOver { survived_secs }
        } else {
            FrameOutcome::Continue
        }
    }

    /// Cast the black hole now (same as the input flag)
    pub fn cast_black_hole(&mut self) -> Option<CastOutcome> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        Some(self.abilities.cast_black_hole(
            &mut self.state,
            &mut self.scheduler,
            &self.clock,
            &self.tuning,
        ))
    }

    /// Deploy a turret now (same as the input flag)
    pub fn cast_turret(&mut self) -> Option<CastOutcome> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        Some(
            self.abilities
                .cast_turret(&mut self.state, &mut self.scheduler, &self.clock, &self.tuning),
        )
    }

    /// Begin a new run after game over. Ignored in any other phase.
    pub fn restart(&mut self, presenter: &mut dyn Presenter) -> bool {
        if self.phase != GamePhase::GameOver {
            log::debug!("restart() ignored in phase {:?}", self.phase);
            return false;
        }
        self.state.player.reset(&self.tuning);
        if self.tuning.clear_entities_on_restart {
            self.clear_entities();
        }
        self.clock.restart_run();
        self.last_combat = CombatReport::default();
        self.phase = GamePhase::Playing;
        presenter.hide_game_over();
        log::info!(
            "Restarted ({} enemies, {} bullets, {} turrets carried over)",
            self.state.enemies.len(),
            self.state.bullets.len(),
            self.state.turrets.len()
        );
        self.flush(presenter);
        true
    }

    fn tick(&mut self, input: &TickInput) -> CombatReport {
        if input.cast_black_hole {
            self.cast_black_hole();
        }
        if input.cast_turret {
            self.cast_turret();
        }

        movement::move_player(&mut self.state, input, &self.tuning);
        movement::move_enemies(&mut self.state);
        movement::move_bullets(&mut self.state, &self.tuning);

        let report = combat::resolve(&mut self.state, &self.tuning);
        movement::face_nearest_enemy(&mut self.state);
        report
    }

    fn run_due_tasks(&mut self) {
        let now = self.clock.now();
        for (_handle, task) in self.scheduler.take_due(now) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SpawnEnemy => {
                let id = self.state.next_entity_id();
                let enemy = self.spawner.spawn_enemy(id, &self.tuning);
                self.state.spawn_enemy(enemy);
            }
            Task::PlayerFire => {
                let origin = self.state.player.pos;
                fire_at_nearest(&mut self.state, origin, BulletOwner::Player, &self.tuning);
            }
            Task::CooldownDisplay => {
                self.abilities.refresh_turret_display(&self.clock, &self.tuning);
            }
            Task::BlackHoleAttract => {
                AbilityManager::attract(&mut self.state, &self.tuning);
            }
            Task::BlackHoleExpire => {
                AbilityManager::expire_black_hole(&mut self.state, &mut self.scheduler);
            }
            Task::TurretFire(id) => {
                AbilityManager::turret_fire(&mut self.state, id, &self.tuning);
            }
            Task::TurretChase(id) => {
                movement::chase_step(&mut self.state, id, &self.tuning);
            }
            Task::TurretExpire(id) => {
                AbilityManager::expire_turret(&mut self.state, &mut self.scheduler, id);
            }
        }
    }

    fn enter_game_over(&mut self, presenter: &mut dyn Presenter) -> u64 {
        self.phase = GamePhase::GameOver;
        let survived_secs = self.elapsed_secs();
        log::info!(
            "Game over after {}s ({} kills, {} money)",
            survived_secs,
            self.state.player.kills,
            self.state.player.money
        );
        presenter.show_game_over(survived_secs);
        survived_secs
    }

    fn clear_entities(&mut self) {
        AbilityManager::clear(&mut self.state, &mut self.scheduler);
        let bullets = self.state.bullets.drain().into_iter().map(|b| b.id);
        let enemies = self.state.enemies.drain().into_iter().map(|e| e.id);
        let removed: Vec<GameEvent> = bullets.chain(enemies).map(GameEvent::Removed).collect();
        self.state.events.extend(removed);
    }

    /// Hand queued events, current transforms and the HUD to the presenter
    fn flush(&mut self, presenter: &mut dyn Presenter) {
        for event in std::mem::take(&mut self.state.events) {
            match event {
                GameEvent::Created(view) => presenter.entity_created(&view),
                GameEvent::Removed(id) => presenter.entity_removed(id),
                GameEvent::HealthBar { id, tier, scale } => presenter.health_bar(id, tier, scale),
                GameEvent::EnemyKilled { .. } | GameEvent::PlayerHit { .. } => {}
            }
        }
        for view in self.state.views() {
            presenter.entity_moved(view.id, view.pos, view.facing);
        }
        presenter.update_hud(&self.hud().text());
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::hud::HudText;
    use crate::present::NullPresenter;
    use crate::sim::ability::AbilityState;
    use crate::sim::state::{Enemy, EnemyKind, HealthTier};

    /// Records every presenter call
    #[derive(Default)]
    struct Recorder {
        created: Vec<EntityView>,
        removed: Vec<EntityId>,
        bars: Vec<(EntityId, HealthTier, f32)>,
        huds: Vec<HudText>,
        game_over: Vec<u64>,
        hidden: u32,
        moved: usize,
    }

    impl Presenter for Recorder {
        fn entity_created(&mut self, entity: &EntityView) {
            self.created.push(entity.clone());
        }
        fn entity_removed(&mut self, id: EntityId) {
            self.removed.push(id);
        }
        fn entity_moved(&mut self, _id: EntityId, _pos: Vec3, _facing: f32) {
            self.moved += 1;
        }
        fn health_bar(&mut self, id: EntityId, tier: HealthTier, scale: f32) {
            self.bars.push((id, tier, scale));
        }
        fn update_hud(&mut self, hud: &HudText) {
            self.huds.push(hud.clone());
        }
        fn show_game_over(&mut self, survived_secs: u64) {
            self.game_over.push(survived_secs);
        }
        fn hide_game_over(&mut self) {
            self.hidden += 1;
        }
    }

    /// Tuning with no automatic spawns or player fire
    fn quiet_tuning() -> Tuning {
        Tuning {
            enemy_spawn_interval_ms: 10_000_000,
            player_fire_interval_ms: 10_000_000,
            ..Tuning::default()
        }
    }

    /// Spawns on, player fire off
    fn quiet_tuning_with_spawns() -> Tuning {
        Tuning {
            player_fire_interval_ms: 10_000_000,
            ..Tuning::default()
        }
    }

    fn started(tuning: Tuning) -> (GameSession, Recorder) {
        let mut session = GameSession::new(tuning, 42);
        let mut rec = Recorder::default();
        session.start(&mut rec);
        (session, rec)
    }

    fn place_enemy(session: &mut GameSession, kind: EnemyKind, pos: Vec3) -> EntityId {
        let id = session.state.next_entity_id();
        session.state.spawn_enemy(Enemy::new(id, kind, pos));
        id
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_start_presents_player() {
        let (session, rec) = started(quiet_tuning());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(rec.created[0].kind, EntityKind::Player);
        assert_eq!(rec.huds.last().unwrap().health, "Health: 100");
    }

    #[test]
    fn test_frame_ignored_before_start() {
        let mut session = GameSession::new(quiet_tuning(), 1);
        assert_eq!(
            session.frame(&idle(), 16, &mut NullPresenter),
            FrameOutcome::Ignored
        );
        assert_eq!(session.now_ms(), 0);
    }

    #[test]
    fn test_enemies_spawn_every_second() {
        let (mut session, mut rec) = started(Tuning {
            player_fire_interval_ms: 10_000_000,
            ..Tuning::default()
        });
        for _ in 0..(3000 / 16 + 1) {
            session.frame(&idle(), 16, &mut rec);
        }
        // A spawn close to the player may already have made contact
        let enemy_creations = rec
            .created
            .iter()
            .filter(|v| matches!(v.kind, EntityKind::Enemy(_)))
            .count();
        assert_eq!(enemy_creations, 3);
    }

    #[test]
    fn test_player_fires_at_enemies() {
        let (mut session, mut rec) = started(Tuning {
            enemy_spawn_interval_ms: 10_000_000,
            ..Tuning::default()
        });
        // No enemies, nothing to shoot at
        session.frame(&idle(), 125, &mut rec);
        assert!(session.state().bullets.is_empty());

        let enemy = place_enemy(&mut session, EnemyKind::Heavy, Vec3::new(0.0, 0.5, 20.0));
        session.frame(&idle(), 125, &mut rec);
        assert_eq!(session.state().bullets.len(), 1);
        let bullet = session.state().bullets.iter().next().unwrap();
        assert_eq!(bullet.owner, BulletOwner::Player);
        assert!(bullet.dir.z > 0.99);

        // Enemy closes in while bullets fly; it eventually takes damage
        for _ in 0..100 {
            session.frame(&idle(), 16, &mut rec);
        }
        let health = session.state().enemies.get(enemy).map(|e| e.health);
        assert!(health.is_none_or(|h| h < 150.0));
        assert!(rec.bars.iter().any(|(id, _, _)| *id == enemy));
    }

    #[test]
    fn test_fire_rate_independent_of_frame_length() {
        fn bullets_after_one_second(dt_ms: u64) -> usize {
            let (mut session, mut rec) = started(Tuning {
                enemy_spawn_interval_ms: 10_000_000,
                ..Tuning::default()
            });
            place_enemy(&mut session, EnemyKind::Heavy, Vec3::new(0.0, 0.5, 90.0));
            while session.now_ms() < 1000 {
                session.frame(&idle(), dt_ms, &mut rec);
            }
            session.state().bullets.len()
        }

        assert_eq!(bullets_after_one_second(25), 8);
        assert_eq!(bullets_after_one_second(250), 8);
        assert_eq!(bullets_after_one_second(1000), 8);
    }

    #[test]
    fn test_spawn_rate_independent_of_frame_length() {
        let (mut session, mut rec) = started(quiet_tuning_with_spawns());
        session.frame(&idle(), 3000, &mut rec);
        let spawned = rec
            .created
            .iter()
            .filter(|v| matches!(v.kind, EntityKind::Enemy(_)))
            .count();
        assert_eq!(spawned, 3);
    }

    #[test]
    fn test_turret_readout_refreshes_each_second() {
        let (mut session, mut rec) = started(quiet_tuning());
        let cast = TickInput {
            cast_turret: true,
            ..TickInput::default()
        };
        session.frame(&cast, 16, &mut rec);
        assert_eq!(rec.huds.last().unwrap().turret_cooldown, " 00s");

        // Held at the cast-time sample until the first refresh at 1000ms
        while session.now_ms() < 992 {
            session.frame(&idle(), 16, &mut rec);
        }
        assert_eq!(session.hud().turret_cooldown_ms, 60_000);
        assert_eq!(rec.huds.last().unwrap().turret_cooldown, " 00s");

        session.frame(&idle(), 16, &mut rec);
        assert_eq!(session.now_ms(), 1008);
        assert_eq!(session.hud().turret_cooldown_ms, 60_000 - (1008 - 16));
        assert_eq!(rec.huds.last().unwrap().turret_cooldown, " 59s");

        while session.now_ms() < 1984 {
            session.frame(&idle(), 16, &mut rec);
        }
        assert_eq!(session.hud().turret_cooldown_ms, 60_000 - (1008 - 16));
        assert_eq!(rec.huds.last().unwrap().turret_cooldown, " 59s");

        session.frame(&idle(), 16, &mut rec);
        assert_eq!(session.now_ms(), 2000);
        assert_eq!(rec.huds.last().unwrap().turret_cooldown, " 58s");
    }

    #[test]
    fn test_contact_scenario() {
        let (mut session, mut rec) = started(quiet_tuning());
        let enemy = place_enemy(&mut session, EnemyKind::Light, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(session.frame(&idle(), 16, &mut rec), FrameOutcome::Continue);
        assert_eq!(session.state().player.health, 90);
        assert!(!session.state().enemies.contains(enemy));
        assert_eq!(session.state().player.money, 0);
        assert!(rec.removed.contains(&enemy));
        assert_eq!(rec.huds.last().unwrap().health, "Health: 90");
    }

    #[test]
    fn test_game_over_freezes_until_restart() {
        let (mut session, mut rec) = started(Tuning {
            player_start_health: 10,
            ..quiet_tuning()
        });
        for _ in 0..125 {
            session.frame(&idle(), 16, &mut rec);
        }
        place_enemy(&mut session, EnemyKind::Medium, Vec3::new(0.0, 0.5, 0.2));
        let bystander = place_enemy(&mut session, EnemyKind::Heavy, Vec3::new(10.0, 0.5, 0.0));

        let outcome = session.frame(&idle(), 16, &mut rec);
        assert_eq!(outcome, FrameOutcome::GameOver { survived_secs: 2 });
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(rec.game_over, vec![2]);

        let now = session.now_ms();
        let before = session.state().enemies.get(bystander).unwrap().pos;
        for _ in 0..10 {
            assert_eq!(
                session.frame(&idle(), 16, &mut rec),
                FrameOutcome::Ignored
            );
        }
        assert_eq!(session.now_ms(), now);
        assert_eq!(session.state().enemies.get(bystander).unwrap().pos, before);
        assert!(session.cast_turret().is_none());
    }

    #[test]
    fn test_restart_resets_and_clears() {
        let (mut session, mut rec) = started(Tuning {
            player_start_health: 10,
            ..quiet_tuning()
        });
        session.cast_turret();
        session.cast_black_hole();
        place_enemy(&mut session, EnemyKind::Light, Vec3::new(0.0, 0.5, 0.3));
        let residual = place_enemy(&mut session, EnemyKind::Heavy, Vec3::new(20.0, 0.5, 0.0));
        session.state.player.money = 50;
        session.state.player.kills = 5;

        assert!(matches!(
            session.frame(&idle(), 16, &mut rec),
            FrameOutcome::GameOver { .. }
        ));
        assert!(session.restart(&mut rec));
        assert!(!session.restart(&mut rec));

        let player = &session.state().player;
        assert_eq!((player.health, player.money, player.kills), (10, 0, 0));
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(rec.hidden, 1);
        assert!(session.state().enemies.is_empty());
        assert!(session.state().turrets.is_empty());
        assert!(session.state().black_hole.is_none());
        assert!(rec.removed.contains(&residual));
        // Only the session timers remain
        assert_eq!(session.scheduler.len(), 3);

        assert_eq!(session.frame(&idle(), 16, &mut rec), FrameOutcome::Continue);
    }

    #[test]
    fn test_restart_can_keep_residual_entities() {
        let (mut session, mut rec) = started(Tuning {
            player_start_health: 10,
            clear_entities_on_restart: false,
            ..quiet_tuning()
        });
        session.cast_turret();
        place_enemy(&mut session, EnemyKind::Light, Vec3::new(0.0, 0.5, 0.3));
        let residual = place_enemy(&mut session, EnemyKind::Heavy, Vec3::new(20.0, 0.5, 0.0));

        session.frame(&idle(), 16, &mut rec);
        assert_eq!(session.phase(), GamePhase::GameOver);
        session.restart(&mut rec);

        assert_eq!(session.state().player.health, 10);
        assert!(session.state().enemies.contains(residual));
        assert_eq!(session.state().turrets.len(), 1);
    }

    #[test]
    fn test_black_hole_expires_unattended() {
        let (mut session, mut rec) = started(quiet_tuning());
        session.frame(&idle(), 16, &mut rec);
        let cast_at = session.now_ms();
        let input = TickInput {
            cast_black_hole: true,
            ..TickInput::default()
        };
        session.frame(&input, 16, &mut rec);
        let hole_id = session.state().black_hole.as_ref().unwrap().id;
        assert_eq!(session.abilities().black_hole, AbilityState::Active);
        assert_eq!(session.state().black_hole.as_ref().unwrap().started_ms, cast_at + 16);

        while session.now_ms() < cast_at + 16 + 5000 {
            session.frame(&idle(), 16, &mut rec);
        }
        assert!(session.state().black_hole.is_none());
        assert_eq!(session.abilities().black_hole, AbilityState::Idle);
        assert!(rec.removed.contains(&hole_id));

        let elapsed = session.now_ms() - (cast_at + 16);
        assert_eq!(
            session.abilities().black_hole_cooldown_ms,
            session.tuning().black_hole.cooldown_ms - elapsed
        );
        assert_eq!(session.scheduler.len(), 3);
    }

    #[test]
    fn test_turret_lifecycle_in_session() {
        let (mut session, mut rec) = started(quiet_tuning());
        let input = TickInput {
            cast_turret: true,
            ..TickInput::default()
        };
        session.frame(&input, 16, &mut rec);
        assert_eq!(session.state().turrets.len(), 1);
        let turret_id = session.state().turrets.ids()[0];

        let enemy = place_enemy(&mut session, EnemyKind::Heavy, Vec3::new(0.0, 0.5, 30.0));
        let start = session.state().turrets.get(turret_id).unwrap().pos;
        for _ in 0..20 {
            session.frame(&idle(), 16, &mut rec);
        }
        let turret = session.state().turrets.get(turret_id).unwrap();
        // Chased toward the enemy along +Z
        assert!((turret.pos.z - start.z - 20.0 * 0.05).abs() < 1e-3);
        assert!(
            session
                .state()
                .bullets
                .iter()
                .any(|b| b.owner == BulletOwner::Turret(turret_id))
        );
        assert!(session.state().enemies.contains(enemy));

        while session.now_ms() < 16 + 8000 {
            session.frame(&idle(), 16, &mut rec);
        }
        assert!(session.state().turrets.is_empty());
        assert!(rec.removed.contains(&turret_id));
        assert_eq!(session.scheduler.len(), 3);
    }

    #[test]
    fn test_legacy_bar_scale_in_session() {
        let (mut session, mut rec) = started(Tuning {
            legacy_health_bar_scale: true,
            ..quiet_tuning()
        });
        session.cast_black_hole();
        let enemy = place_enemy(&mut session, EnemyKind::Light, Vec3::new(5.0, 0.5, 5.0));
        session.frame(&idle(), 16, &mut rec);
        let (_, tier, scale) = *rec.bars.iter().rev().find(|(id, _, _)| *id == enemy).unwrap();
        assert_eq!(tier, HealthTier::Yellow);
        assert!((scale - 49.5 / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_run() {
        fn run(seed: u64) -> (GameSession, u32) {
            let mut session = GameSession::new(Tuning::default(), seed);
            session.start(&mut NullPresenter);
            let mut frames = 0;
            for _ in 0..3000 {
                let input = TickInput::autopilot(session.state(), &session.abilities());
                if session.frame(&input, 16, &mut NullPresenter) != FrameOutcome::Continue {
                    break;
                }
                frames += 1;
            }
            (session, frames)
        }

        let (a, fa) = run(777);
        let (b, fb) = run(777);
        assert_eq!(fa, fb);
        assert_eq!(a.state().player.pos, b.state().player.pos);
        assert_eq!(a.state().player.health, b.state().player.health);
        assert_eq!(a.state().player.money, b.state().player.money);
        assert_eq!(a.state().enemies.ids(), b.state().enemies.ids());
        let pa: Vec<Vec3> = a.state().enemies.iter().map(|e| e.pos).collect();
        let pb: Vec<Vec3> = b.state().enemies.iter().map(|e| e.pos).collect();
        assert_eq!(pa, pb);
    }
}
