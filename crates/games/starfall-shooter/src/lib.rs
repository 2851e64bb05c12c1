pub mod barrage;
pub mod boss;
pub mod collision;
pub mod config;
pub mod difficulty;
pub mod enemy;
pub mod error;
pub mod modifiers;
pub mod powerups;
pub mod rewards;
pub mod scoring;
pub mod upgrades;
pub mod wave;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use starfall_core::arcade_game_boilerplate;
use starfall_core::events::{EnemyTag, FireMode, PowerUpKind, ProgressEvent};
use starfall_core::game_trait::{ArcadeGame, GameMetadata, RunSummary, SessionConfig};
use starfall_core::loadout::LoadoutModifiers;
use starfall_core::time;
use starfall_core::timer::{Countdown, DeferredQueue, RunEpoch, ms_to_frames};

use barrage::BossBullet;
use boss::{Boss, BossConfig, BossPhase};
use collision::{Bounds, Rect, collides};
use config::ShooterConfig;
use difficulty::Difficulty;
use enemy::{Enemy, EnemyKind};
use error::ShooterError;
use modifiers::{EffectiveStats, powerup_delay};
use powerups::{ActivePowerUps, PowerUpDrop};
use rewards::{RewardBuffs, RewardCatalog, RewardId};
use scoring::{ComboState, kill_score, next_level};
use upgrades::{ActiveUpgrades, UpgradeLedger, coins_earned};
use wave::{LastEnemyChange, WaveDirector, WaveKind, WavePhase, WaveProgress, WaveTick, enemy_pool};

/// Frames an explosion stays on screen.
const EXPLOSION_FRAMES: u32 = 18;
/// Camera shake applied when the player is hit: (frames, magnitude).
const HIT_SHAKE: (u32, f32) = (10, 8.0);

/// The player's ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub powerups: ActivePowerUps,
    pub fire_cooldown: Countdown,
    /// Cosmetic flash after taking damage.
    pub hit_flash: Countdown,
    pub stats: EffectiveStats,
}

impl PlayerState {
    fn new(config: &ShooterConfig, stats: EffectiveStats, shield_frames: u32) -> Self {
        Self {
            x: config.canvas_width / 2.0,
            y: config.canvas_height - config.player.bottom_offset,
            width: config.player.width,
            height: config.player.height,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            powerups: ActivePowerUps::with_starting_shield(shield_frames),
            fire_cooldown: Countdown::idle(),
            hit_flash: Countdown::idle(),
            stats,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        self.bounds().center()
    }

    pub fn fire_mode(&self) -> FireMode {
        self.powerups.fire_mode
    }

    pub fn shield_active(&self) -> bool {
        self.powerups.shield_active
    }
}

impl Bounds for PlayerState {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A bullet fired by the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
}

impl PlayerBullet {
    fn is_on_screen(&self, canvas_width: f32) -> bool {
        self.y > -self.height && self.x > -self.width && self.x < canvas_width
    }
}

impl Bounds for PlayerBullet {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Cosmetic burst left by a destroyed enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub life: u32,
    pub duration: u32,
}

/// Cosmetic screen shake. Offsets are re-rolled every frame while active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraShake {
    pub frames: u32,
    pub magnitude: f32,
    pub offset: (f32, f32),
}

impl CameraShake {
    fn trigger(&mut self, frames: u32, magnitude: f32) {
        self.frames = self.frames.max(frames);
        self.magnitude = self.magnitude.max(magnitude);
    }

    fn tick(&mut self, rng: &mut impl Rng) {
        if self.frames == 0 {
            self.offset = (0.0, 0.0);
            return;
        }
        self.frames -= 1;
        self.offset = (
            (rng.random::<f32>() - 0.5) * self.magnitude,
            (rng.random::<f32>() - 0.5) * self.magnitude,
        );
        if self.frames == 0 {
            self.magnitude = 0.0;
        }
    }
}

/// Serializable simulation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShooterState {
    pub frame: u64,
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub kills: u32,
    pub player: PlayerState,
    pub bullets: Vec<PlayerBullet>,
    pub enemies: Vec<Enemy>,
    pub powerups: Vec<PowerUpDrop>,
    pub boss: Option<Boss>,
    pub boss_bullets: Vec<BossBullet>,
    pub combo: ComboState,
    pub waves: WaveDirector,
    pub difficulty: Difficulty,
    pub rewards: RewardBuffs,
    /// Rewards on offer while `awaiting_reward` is set.
    pub reward_offer: Vec<RewardId>,
    pub explosions: Vec<Explosion>,
    pub shake: CameraShake,
    pub boss_warning: bool,
    pub awaiting_reward: bool,
    pub run_over: bool,
    pub cleared: bool,
}

impl ShooterState {
    fn new(
        config: &ShooterConfig,
        difficulty: Difficulty,
        loadout: &LoadoutModifiers,
        upgrades: &ActiveUpgrades,
        high_score: u64,
    ) -> Self {
        let rewards = RewardBuffs::default();
        let stats = EffectiveStats::compute(
            &config.player,
            &difficulty,
            loadout,
            &rewards,
            upgrades,
            FireMode::Normal,
        );
        let shield_frames = upgrades.shield_seconds * config.frames_per_second;
        Self {
            frame: 0,
            score: 0,
            high_score,
            level: 1,
            kills: 0,
            player: PlayerState::new(config, stats, shield_frames),
            bullets: Vec::new(),
            enemies: Vec::new(),
            powerups: Vec::new(),
            boss: None,
            boss_bullets: Vec::new(),
            combo: ComboState::default(),
            waves: WaveDirector::new(),
            difficulty,
            rewards,
            reward_offer: Vec::new(),
            explosions: Vec::new(),
            shake: CameraShake::default(),
            boss_warning: false,
            awaiting_reward: false,
            run_over: false,
            cleared: false,
        }
    }
}

/// Host input for one tick. `left`/`right` are held keys; `fire` is a key-down
/// edge that stays latched until the next tick consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShooterInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

/// Events emitted by [`StarfallShooter::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShooterEvent {
    /// Fact for the progression recorder.
    Progress(ProgressEvent),
    WaveStarted { wave: u32, boss: bool },
    BossSpawned { name: String },
    /// The boss warning banner timed out.
    BossWarningCleared,
    BossPhaseChanged(BossPhase),
    BossDefeated {
        name: String,
        points: u32,
        special_attacks: u32,
    },
    LastEnemyPhase(bool),
    PlayerHit { damage: i32, hp: i32 },
    PowerUpExpired,
    LevelUp(u32),
    /// The wave was cleared; the loop is frozen until a reward is chosen.
    RewardOffered(Vec<RewardId>),
    RewardApplied(RewardId),
    CoinsEarned(u64),
    RunOver { cleared: bool, score: u64, wave: u32 },
}

/// Host callbacks that fire a fixed number of frames later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    HideBossWarning,
}

/// The Starfall wave shooter.
pub struct StarfallShooter {
    state: ShooterState,
    config: ShooterConfig,
    session: SessionConfig,
    loadout: LoadoutModifiers,
    catalog: RewardCatalog,
    ledger: UpgradeLedger,
    clear_wave: Option<u32>,
    pending_input: ShooterInput,
    pending_events: Vec<ShooterEvent>,
    deferred: DeferredQueue<DeferredAction>,
    epoch: RunEpoch,
    rng: StdRng,
    paused: bool,
    run_started_ms: u64,
}

impl Default for StarfallShooter {
    fn default() -> Self {
        Self::new()
    }
}

impl StarfallShooter {
    pub fn new() -> Self {
        Self::with_config(ShooterConfig::load())
    }

    pub fn with_config(config: ShooterConfig) -> Self {
        let session = SessionConfig::default();
        let loadout = session.loadout.sanitized();
        let ledger = UpgradeLedger::default();
        Self {
            state: ShooterState::new(
                &config,
                Difficulty::default(),
                &loadout,
                &ledger.active_bonuses(),
                0,
            ),
            clear_wave: config.clear_wave,
            config,
            session,
            loadout,
            catalog: RewardCatalog::default(),
            ledger,
            pending_input: ShooterInput::default(),
            pending_events: Vec::new(),
            deferred: DeferredQueue::new(),
            epoch: RunEpoch::new(),
            rng: StdRng::seed_from_u64(0),
            paused: false,
            run_started_ms: time::now_millis(),
        }
    }

    /// Use a persisted upgrade ledger. Takes effect on the next `init`.
    pub fn with_ledger(mut self, ledger: UpgradeLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_catalog(mut self, catalog: RewardCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn state(&self) -> &ShooterState {
        &self.state
    }

    pub fn config(&self) -> &ShooterConfig {
        &self.config
    }

    pub fn ledger(&self) -> &UpgradeLedger {
        &self.ledger
    }

    /// Upgrade purchases happen between runs through this handle.
    pub fn ledger_mut(&mut self) -> &mut UpgradeLedger {
        &mut self.ledger
    }

    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn wave_progress(&self) -> WaveProgress {
        self.state.waves.progress()
    }

    /// Seed the persisted best score shown in the HUD.
    pub fn set_high_score(&mut self, high_score: u64) {
        self.state.high_score = self.state.high_score.max(high_score);
    }

    /// Switch difficulty. A valid key restarts the run on the new tier; an
    /// unknown key is rejected and nothing changes.
    pub fn set_difficulty(&mut self, key: &str) -> Result<(), ShooterError> {
        let mut difficulty = self.state.difficulty;
        difficulty.set_tier_key(key)?;
        self.session.difficulty = difficulty.tier().key().to_string();
        self.restart();
        Ok(())
    }

    /// Start over with the current session. Pending deferred actions from the
    /// previous run are invalidated.
    pub fn restart(&mut self) {
        let session = self.session.clone();
        self.init(&session);
    }

    /// Apply a wave-clear reward and start the next wave.
    pub fn choose_reward(&mut self, id: RewardId) -> Result<(), ShooterError> {
        if !self.state.awaiting_reward {
            return Err(ShooterError::NoRewardPending);
        }
        if !self.state.reward_offer.contains(&id) {
            return Err(ShooterError::RewardNotOffered(id));
        }
        self.state.rewards.apply(id);
        self.refresh_stats();
        self.state.reward_offer.clear();
        self.state.awaiting_reward = false;
        self.pending_events.push(ShooterEvent::RewardApplied(id));

        let difficulty = self.state.difficulty;
        self.state.waves.next_wave(&difficulty);
        let mut events = std::mem::take(&mut self.pending_events);
        self.announce_wave(&mut events);
        self.pending_events = events;
        Ok(())
    }

    /// Recompute player stats after a reward, keeping current HP within the new max.
    fn refresh_stats(&mut self) {
        let player = &mut self.state.player;
        player.stats = EffectiveStats::compute(
            &self.config.player,
            &self.state.difficulty,
            &self.loadout,
            &self.state.rewards,
            &self.ledger.active_bonuses(),
            player.powerups.fire_mode,
        );
        player.max_hp = player.stats.max_hp;
        player.hp = player.hp.min(player.max_hp);
    }

    fn announce_wave(&self, events: &mut Vec<ShooterEvent>) {
        let progress = self.state.waves.progress();
        tracing::info!(wave = progress.wave, boss = progress.is_boss_wave, "Wave starting");
        events.push(ShooterEvent::WaveStarted {
            wave: progress.wave,
            boss: progress.is_boss_wave,
        });
        events.push(ShooterEvent::Progress(ProgressEvent::WaveReached(progress.wave)));
    }

    fn step(&mut self, events: &mut Vec<ShooterEvent>) {
        // 1. Frame counter and cosmetic timers
        self.state.frame += 1;
        self.state.shake.tick(&mut self.rng);
        for explosion in &mut self.state.explosions {
            explosion.life += 1;
        }
        self.state.explosions.retain(|e| e.life <= e.duration);
        self.state.player.hit_flash.tick();
        self.state.player.fire_cooldown.tick();
        for action in self.deferred.tick(&self.epoch) {
            match action {
                DeferredAction::HideBossWarning => {
                    self.state.boss_warning = false;
                    events.push(ShooterEvent::BossWarningCleared);
                },
            }
        }

        // 2. Wave director
        if self.state.waves.update() == WaveTick::ReadyToSpawn
            && let WaveKind::Boss(config) = self.state.waves.config().kind
        {
            self.spawn_boss(config, events);
            self.state.waves.mark_fighting();
        }
        if self.state.waves.phase() == WavePhase::Completed {
            self.complete_wave(events);
            return;
        }

        // 3. Movement and shooting
        let input = self.pending_input;
        self.pending_input.fire = false;
        self.move_player(input);
        if input.fire && !self.state.player.fire_cooldown.is_running() {
            self.fire(events);
        }

        // 4. Combo decay
        self.state.combo.tick();

        // 5. Player bullets
        let canvas_width = self.config.canvas_width;
        for bullet in &mut self.state.bullets {
            bullet.x += bullet.vx;
            bullet.y += bullet.vy;
        }
        self.state.bullets.retain(|b| b.is_on_screen(canvas_width));

        // 6. Spawning
        if self.state.waves.is_active() && self.state.boss.is_none() {
            self.spawn_enemies(events);
        }

        // 7. Boss
        if self.state.boss.is_some() && self.update_boss(events) {
            return;
        }

        // 8. Enemies
        if self.update_enemies(events) {
            return;
        }

        // 9. Power-up drops
        self.update_drops(events);

        // 10. Power-up expiry
        let mode_before = self.state.player.powerups.fire_mode;
        if self.state.player.powerups.tick() {
            if mode_before != FireMode::Normal {
                self.state.player.stats.shoot_delay_ms =
                    powerup_delay(self.config.player.base_shoot_delay_ms, &self.state.rewards);
            }
            events.push(ShooterEvent::PowerUpExpired);
        }

        // 11. Bullet and enemy collisions
        self.resolve_enemy_hits(events);
    }

    fn move_player(&mut self, input: ShooterInput) {
        let max_x = self.config.canvas_width - self.state.player.width;
        let player = &mut self.state.player;
        if input.left {
            player.x = (player.x - player.stats.speed).max(0.0);
        }
        if input.right {
            player.x = (player.x + player.stats.speed).min(max_x);
        }
    }

    fn fire(&mut self, events: &mut Vec<ShooterEvent>) {
        let cfg = &self.config.player;
        let player = &mut self.state.player;
        let x = player.x + player.width / 2.0 - cfg.bullet_width / 2.0;
        let vy = -player.stats.bullet_speed;
        let spreads: SmallVec<[f32; 3]> = match player.powerups.fire_mode {
            FireMode::ThreeWay => smallvec![0.0, -cfg.spread_vx, cfg.spread_vx],
            FireMode::Normal | FireMode::Rapid => smallvec![0.0],
        };
        for vx in spreads {
            self.state.bullets.push(PlayerBullet {
                x,
                y: player.y,
                width: cfg.bullet_width,
                height: cfg.bullet_height,
                vx,
                vy,
            });
            events.push(ShooterEvent::Progress(ProgressEvent::ShotFired));
        }
        player
            .fire_cooldown
            .set(ms_to_frames(player.stats.shoot_delay_ms, self.config.frames_per_second));
    }

    fn spawn_enemies(&mut self, events: &mut Vec<ShooterEvent>) {
        let spawn = &self.config.spawn;
        let active = self.state.enemies.len() as u32;
        match self.state.waves.last_enemy_transition(active, spawn) {
            Some(LastEnemyChange::Enter) => {
                for enemy in &mut self.state.enemies {
                    enemy.apply_last_enemy_buff();
                }
                events.push(ShooterEvent::LastEnemyPhase(true));
            },
            Some(LastEnemyChange::Exit) => {
                for enemy in &mut self.state.enemies {
                    enemy.revert_last_enemy_buff();
                }
                events.push(ShooterEvent::LastEnemyPhase(false));
            },
            None => {},
        }

        let count = self.state.waves.spawn_plan(active, spawn);
        if count == 0 {
            return;
        }
        let buffed = self.state.waves.spawns_buffed(spawn);
        let wave = self.state.waves.current_wave();
        let pool = enemy_pool(wave);
        for _ in 0..count {
            let kind = pool.choose(&mut self.rng).copied().unwrap_or(EnemyKind::Red);
            let mut enemy = Enemy::spawn(
                kind,
                &self.state.difficulty,
                wave,
                self.config.canvas_width,
                &mut self.rng,
            );
            if buffed {
                enemy.apply_last_enemy_buff();
            }
            self.state.enemies.push(enemy);
        }
    }

    fn spawn_boss(&mut self, config: BossConfig, events: &mut Vec<ShooterEvent>) {
        let boss = Boss::new(config.adjusted(&self.state.difficulty), self.config.canvas_width);
        tracing::info!(name = %boss.name, hp = boss.hp, "Boss spawned");
        events.push(ShooterEvent::BossSpawned {
            name: boss.name.clone(),
        });
        self.state.boss = Some(boss);
        self.state.boss_warning = true;
        self.deferred.schedule(
            self.config.boss_warning_frames,
            self.epoch.token(),
            DeferredAction::HideBossWarning,
        );
    }

    /// Returns `true` when the run ended this frame.
    fn update_boss(&mut self, events: &mut Vec<ShooterEvent>) -> bool {
        let frame = self.state.frame;
        let target = self.state.player.center();
        if let Some(boss) = self.state.boss.as_mut() {
            if let Some(phase) = boss.update(frame, &mut self.rng) {
                tracing::info!(name = %boss.name, phase = phase.number(), "Boss phase changed");
                events.push(ShooterEvent::BossPhaseChanged(phase));
            }
            if let Some(volley) = boss.shoot(target, &mut self.rng) {
                self.state.boss_bullets.extend(volley);
            }
        }

        let (width, height) = (self.config.canvas_width, self.config.canvas_height);
        let player = &self.state.player;
        let mut hits = Vec::new();
        self.state.boss_bullets.retain_mut(|bullet| {
            bullet.advance();
            if collides(player, &*bullet) {
                hits.push(bullet.damage);
                return false;
            }
            bullet.is_on_screen(width, height)
        });
        for damage in hits {
            let damage = if self.state.player.shield_active() {
                damage / 2
            } else {
                damage
            };
            if self.damage_player(damage, events) {
                return true;
            }
        }

        let bullet_damage = self.state.player.stats.bullet_damage;
        let defeated = match self.state.boss.as_mut() {
            Some(boss) => {
                self.state.bullets.retain(|bullet| {
                    if boss.is_dead() || !collides(bullet, &*boss) {
                        return true;
                    }
                    boss.take_damage(bullet_damage);
                    false
                });
                boss.is_dead()
            },
            None => false,
        };
        if defeated {
            self.defeat_boss(events);
        }
        false
    }

    fn defeat_boss(&mut self, events: &mut Vec<ShooterEvent>) {
        let Some(boss) = self.state.boss.take() else {
            return;
        };
        tracing::info!(name = %boss.name, points = boss.points, "Boss defeated");
        self.state.boss_bullets.clear();
        self.state.score += u64::from(boss.points);
        self.state.kills += 1;
        self.state.waves.on_enemy_killed();
        self.state.high_score = self.state.high_score.max(self.state.score);
        events.push(ShooterEvent::Progress(ProgressEvent::Kill {
            enemy: EnemyTag::Boss,
            fire_mode: self.state.player.fire_mode(),
        }));
        events.push(ShooterEvent::Progress(ProgressEvent::ScoreUpdate(self.state.score)));
        events.push(ShooterEvent::BossDefeated {
            special_attacks: boss.special_attacks(),
            name: boss.name,
            points: boss.points,
        });
    }

    /// Returns `true` when the run ended this frame.
    fn update_enemies(&mut self, events: &mut Vec<ShooterEvent>) -> bool {
        let frame = self.state.frame;
        let (width, height) = (self.config.canvas_width, self.config.canvas_height);
        let player = self.state.player.bounds();
        let mut contacts = 0u32;
        self.state.enemies.retain_mut(|enemy| {
            enemy.advance(frame, width);
            if enemy.bounds().overlaps(&player) {
                contacts += 1;
                return false;
            }
            enemy.y < height
        });
        for _ in 0..contacts {
            let cfg = &self.config.player;
            let damage = if self.state.player.shield_active() {
                cfg.shielded_contact_damage
            } else {
                cfg.contact_damage
            };
            if self.damage_player(damage, events) {
                return true;
            }
        }
        false
    }

    fn update_drops(&mut self, events: &mut Vec<ShooterEvent>) {
        let player = self.state.player.bounds();
        let target = player.center();
        let range = self.state.player.stats.magnet_range;
        let pull = self.config.drops.magnet_pull;
        let height = self.config.canvas_height;
        let mut collected = Vec::new();
        self.state.powerups.retain_mut(|drop| {
            drop.advance(target, range, pull);
            if drop.bounds().overlaps(&player) {
                collected.push(drop.kind);
                return false;
            }
            drop.y < height
        });
        for kind in collected {
            self.collect_powerup(kind, events);
        }
    }

    fn collect_powerup(&mut self, kind: PowerUpKind, events: &mut Vec<ShooterEvent>) {
        let cfg = &self.config;
        let rewards = &self.state.rewards;
        let player = &mut self.state.player;
        player.powerups.collect(kind, cfg.powerup_duration_frames);
        match kind {
            PowerUpKind::Rapid => {
                player.stats.shoot_delay_ms = powerup_delay(cfg.player.rapid_shoot_delay_ms, rewards);
            },
            PowerUpKind::ThreeWay => {
                player.stats.shoot_delay_ms = powerup_delay(cfg.player.base_shoot_delay_ms, rewards);
            },
            PowerUpKind::Shield => {
                player.hp = player.max_hp.min(player.hp + cfg.shield_heal);
            },
        }
        tracing::debug!(?kind, "Power-up collected");
        events.push(ShooterEvent::Progress(ProgressEvent::PowerupCollected(kind)));
    }

    fn resolve_enemy_hits(&mut self, events: &mut Vec<ShooterEvent>) {
        let damage = self.state.player.stats.bullet_damage;
        let enemies = &mut self.state.enemies;
        self.state.bullets.retain(|bullet| {
            match enemies
                .iter_mut()
                .find(|e| !e.is_dead() && collides(bullet, &**e))
            {
                Some(enemy) => {
                    enemy.hp -= damage;
                    false
                },
                None => true,
            }
        });

        let (fallen, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut self.state.enemies)
            .into_iter()
            .partition(Enemy::is_dead);
        self.state.enemies = alive;
        for enemy in fallen {
            self.on_enemy_killed(&enemy, damage, events);
        }
    }

    fn on_enemy_killed(&mut self, enemy: &Enemy, damage: i32, events: &mut Vec<ShooterEvent>) {
        let multiplier = self.state.combo.register_kill(self.config.combo_timeout_frames);
        self.state.score += kill_score(enemy.points, multiplier);
        self.state.kills += 1;
        self.state.high_score = self.state.high_score.max(self.state.score);
        self.state.waves.on_enemy_killed();

        events.push(ShooterEvent::Progress(ProgressEvent::Kill {
            enemy: enemy.kind.tag(),
            fire_mode: self.state.player.fire_mode(),
        }));
        events.push(ShooterEvent::Progress(ProgressEvent::Damage {
            amount: damage.max(0) as u32,
            player_damage: false,
        }));
        events.push(ShooterEvent::Progress(ProgressEvent::ComboReached(
            self.state.combo.count,
        )));
        events.push(ShooterEvent::Progress(ProgressEvent::ScoreUpdate(self.state.score)));

        let (cx, cy) = enemy.bounds().center();
        if self
            .state
            .difficulty
            .should_drop_item(self.config.drops.base_rate, &mut self.rng)
        {
            let drop = PowerUpDrop::spawn(cx, enemy.y, &self.config.drops, &mut self.rng);
            self.state.powerups.push(drop);
        }
        self.state.explosions.push(Explosion {
            x: cx,
            y: cy,
            radius: enemy.width.max(enemy.height),
            life: 0,
            duration: EXPLOSION_FRAMES,
        });

        let level = next_level(self.state.level, self.state.score);
        if level != self.state.level {
            self.state.level = level;
            events.push(ShooterEvent::LevelUp(level));
        }
    }

    /// Apply damage to the player. Returns `true` when it ended the run.
    fn damage_player(&mut self, damage: i32, events: &mut Vec<ShooterEvent>) -> bool {
        let player = &mut self.state.player;
        player.hp -= damage;
        player.hit_flash.set(self.config.player.hit_flash_frames);
        let hp = player.hp;
        self.state.shake.trigger(HIT_SHAKE.0, HIT_SHAKE.1);
        events.push(ShooterEvent::Progress(ProgressEvent::Damage {
            amount: damage.max(0) as u32,
            player_damage: true,
        }));
        events.push(ShooterEvent::Progress(ProgressEvent::HpSample(hp)));
        events.push(ShooterEvent::PlayerHit { damage, hp });
        if hp <= 0 {
            self.end_run(false, events);
            return true;
        }
        false
    }

    fn exit_last_enemy_phase(&mut self, events: &mut Vec<ShooterEvent>) {
        if self.state.waves.exit_last_enemy() {
            for enemy in &mut self.state.enemies {
                enemy.revert_last_enemy_buff();
            }
            events.push(ShooterEvent::LastEnemyPhase(false));
        }
    }

    fn complete_wave(&mut self, events: &mut Vec<ShooterEvent>) {
        self.exit_last_enemy_phase(events);
        let wave = self.state.waves.current_wave();
        tracing::info!(wave, score = self.state.score, "Wave cleared");
        if self.clear_wave.is_some_and(|w| wave >= w) {
            self.end_run(true, events);
            return;
        }
        let offer = self.catalog.offer(&mut self.rng);
        self.state.reward_offer = offer.clone();
        self.state.awaiting_reward = true;
        events.push(ShooterEvent::RewardOffered(offer));
    }

    fn end_run(&mut self, cleared: bool, events: &mut Vec<ShooterEvent>) {
        self.state.run_over = true;
        self.state.cleared = cleared;
        self.exit_last_enemy_phase(events);

        let score = self.state.score;
        let wave = self.state.waves.current_wave();
        events.push(ShooterEvent::Progress(ProgressEvent::RunEnd {
            cleared,
            final_wave: wave,
            final_score: score,
            duration_ms: time::elapsed_since(self.run_started_ms),
        }));

        let coins = coins_earned(score, cleared);
        self.ledger.add_coins(coins);
        events.push(ShooterEvent::CoinsEarned(coins));
        events.push(ShooterEvent::RunOver {
            cleared,
            score,
            wave,
        });
        tracing::info!(score, wave, cleared, coins, "Run ended");
    }
}

impl ArcadeGame for StarfallShooter {
    type Event = ShooterEvent;

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Starfall".to_string(),
            description: "Clear waves, chain combos and take down the boss every fifth wave."
                .to_string(),
            estimated_run_duration: Duration::from_secs(600),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.frames_per_second as f32
    }

    fn init(&mut self, session: &SessionConfig) {
        let mut difficulty = Difficulty::default();
        if let Err(e) = difficulty.set_tier_key(&session.difficulty) {
            tracing::warn!("{e}, using {}", difficulty.tier());
        }
        self.session = session.clone();
        self.loadout = session.loadout.sanitized();
        self.clear_wave = match session.custom.get("clear_wave") {
            Some(value) => match value.as_u64().and_then(|w| u32::try_from(w).ok()) {
                Some(wave) => Some(wave),
                None => {
                    tracing::warn!(%value, "Invalid clear_wave, using the configured one");
                    self.config.clear_wave
                },
            },
            None => self.config.clear_wave,
        };
        self.rng = StdRng::seed_from_u64(session.seed);
        self.epoch.advance();
        self.pending_input = ShooterInput::default();
        self.pending_events.clear();
        self.paused = false;

        let high_score = self.state.high_score;
        self.state = ShooterState::new(
            &self.config,
            difficulty,
            &self.loadout,
            &self.ledger.active_bonuses(),
            high_score,
        );
        self.state.waves.start_wave(&difficulty);
        self.run_started_ms = time::now_millis();

        tracing::info!(
            difficulty = %difficulty.tier(),
            character = %session.character_id,
            seed = session.seed,
            "Run started"
        );
        let mut events = vec![
            ShooterEvent::Progress(ProgressEvent::RunStart {
                difficulty: difficulty.tier().key().to_string(),
                character: session.character_id.clone(),
            }),
            ShooterEvent::Progress(ProgressEvent::HpSample(self.state.player.hp)),
        ];
        self.announce_wave(&mut events);
        self.pending_events = events;
    }

    fn update(&mut self) -> Vec<ShooterEvent> {
        let mut events = std::mem::take(&mut self.pending_events);
        if self.paused || self.state.run_over || self.state.awaiting_reward {
            self.pending_input.fire = false;
            return events;
        }
        self.step(&mut events);
        events
    }

    fn apply_input(&mut self, input: &[u8]) {
        match rmp_serde::from_slice::<ShooterInput>(input) {
            Ok(input) => {
                self.pending_input.left = input.left;
                self.pending_input.right = input.right;
                self.pending_input.fire |= input.fire;
            },
            Err(e) => tracing::debug!(error = %e, "Dropped malformed input"),
        }
    }

    fn run_summary(&self) -> RunSummary {
        RunSummary {
            score: self.state.score,
            wave: self.state.waves.current_wave(),
            kills: self.state.kills,
            cleared: self.state.cleared,
        }
    }

    arcade_game_boilerplate!(state_type: ShooterState);
}
