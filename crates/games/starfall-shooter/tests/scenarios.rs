//! End-to-end runs through the public `ArcadeGame` surface. Setup that would
//! take minutes of play is injected by editing a state snapshot.

use rand::SeedableRng;
use rand::rngs::StdRng;

use starfall_core::events::{EnemyTag, FireMode, ProgressEvent, ProgressionRecorder};
use starfall_core::game_trait::ArcadeGame;
use starfall_core::test_helpers::{RecordingRecorder, run_game_ticks, session};
use starfall_shooter::config::ShooterConfig;
use starfall_shooter::enemy::{Enemy, EnemyKind, EnemyMovement};
use starfall_shooter::rewards::RewardId;
use starfall_shooter::upgrades::{UpgradeLedger, UpgradeTrack};
use starfall_shooter::wave::WavePhase;
use starfall_shooter::{PlayerBullet, ShooterEvent, ShooterInput, ShooterState, StarfallShooter};

fn start(difficulty: &str) -> StarfallShooter {
    let mut game = StarfallShooter::with_config(ShooterConfig::default());
    game.init(&session(difficulty, 21));
    game
}

fn edit(game: &mut StarfallShooter, f: impl FnOnce(&mut ShooterState)) {
    let mut state: ShooterState = rmp_serde::from_slice(&game.serialize_state()).unwrap();
    f(&mut state);
    game.apply_state(&rmp_serde::to_vec(&state).unwrap());
}

fn enemy(state: &ShooterState, kind: EnemyKind, x: f32, y: f32) -> Enemy {
    let mut rng = StdRng::seed_from_u64(3);
    let mut e = Enemy::spawn(kind, &state.difficulty, 1, 800.0, &mut rng);
    e.x = x;
    e.y = y;
    e.movement = EnemyMovement::Straight;
    e
}

fn bullet(x: f32, y: f32) -> PlayerBullet {
    PlayerBullet {
        x,
        y,
        width: 4.0,
        height: 15.0,
        vx: 0.0,
        vy: -8.0,
    }
}

fn record(recorder: &mut RecordingRecorder, events: &[ShooterEvent]) {
    for event in events {
        if let ShooterEvent::Progress(p) = event {
            recorder.record(p);
        }
    }
}

fn offered(events: &[ShooterEvent]) -> Option<Vec<RewardId>> {
    events.iter().find_map(|e| match e {
        ShooterEvent::RewardOffered(offer) => Some(offer.clone()),
        _ => None,
    })
}

/// Finish the current wave by bookkeeping and accept the first offer.
fn skip_wave(game: &mut StarfallShooter) {
    edit(game, |s| {
        for _ in 0..s.waves.enemies_in_wave() {
            s.waves.on_enemy_killed();
        }
    });
    let offer = offered(&game.update()).unwrap();
    game.choose_reward(offer[0]).unwrap();
}

#[test]
fn hard_kills_score_double_with_combo() {
    let mut game = start("hard");
    edit(&mut game, |s| {
        s.enemies = vec![
            enemy(s, EnemyKind::Red, 100.0, 200.0),
            enemy(s, EnemyKind::Red, 400.0, 200.0),
        ];
        // red has 2 hp on hard
        s.bullets = vec![
            bullet(110.0, 210.0),
            bullet(110.0, 230.0),
            bullet(410.0, 210.0),
            bullet(410.0, 230.0),
        ];
    });

    let mut recorder = RecordingRecorder::default();
    record(&mut recorder, &game.update());

    // red is worth 20 on hard; the second kill is at x2
    assert_eq!(game.state().score, 60);
    assert_eq!(
        recorder.count(|e| matches!(
            e,
            ProgressEvent::Kill {
                enemy: EnemyTag::Red,
                fire_mode: FireMode::Normal
            }
        )),
        2
    );
    assert_eq!(recorder.count(|e| matches!(e, ProgressEvent::ScoreUpdate(60))), 1);
}

#[test]
fn wave_clear_offers_reward_then_next_wave() {
    let mut game = start("normal");
    run_game_ticks(&mut game, 120);
    assert_eq!(game.wave_progress().phase, WavePhase::Spawning);

    edit(&mut game, |s| {
        s.enemies.clear();
        for _ in 0..s.waves.enemies_in_wave() {
            s.waves.on_enemy_killed();
        }
    });
    let events = game.update();
    let offer = offered(&events).unwrap();
    assert_eq!(offer.len(), 3);
    assert!(game.state().awaiting_reward);

    game.choose_reward(offer[1]).unwrap();
    let events = run_game_ticks(&mut game, 1);
    assert!(events.contains(&ShooterEvent::RewardApplied(offer[1])));
    assert!(events.contains(&ShooterEvent::Progress(ProgressEvent::WaveReached(2))));
    assert_eq!(game.wave_progress().total, 13);

    // the break between waves is longer than the opening countdown
    run_game_ticks(&mut game, 178);
    assert_eq!(game.wave_progress().phase, WavePhase::Preparing);
    game.update();
    assert_eq!(game.wave_progress().phase, WavePhase::Spawning);
}

#[test]
fn boss_defeat_completes_boss_wave() {
    let mut game = start("normal");
    for _ in 0..4 {
        skip_wave(&mut game);
    }
    run_game_ticks(&mut game, 180);
    assert!(game.state().boss.is_some());

    edit(&mut game, |s| {
        let boss = s.boss.as_mut().unwrap();
        boss.y = 60.0;
        boss.hp = 1;
        let bx = boss.x + boss.width / 2.0;
        let by = boss.y + 20.0;
        s.bullets = vec![bullet(bx, by)];
    });

    let events = game.update();
    assert!(events.iter().any(|e| matches!(
        e,
        ShooterEvent::BossDefeated { name, points: 500, .. } if name == "Destroyer"
    )));
    assert!(events.contains(&ShooterEvent::Progress(ProgressEvent::Kill {
        enemy: EnemyTag::Boss,
        fire_mode: FireMode::Normal,
    })));
    assert!(game.state().boss.is_none());
    assert!(game.state().boss_bullets.is_empty());
    assert_eq!(game.state().score, 500);
    assert_eq!(game.wave_progress().phase, WavePhase::Completed);

    let events = game.update();
    assert!(offered(&events).is_some());
}

#[test]
fn game_over_reports_run_end_and_coins() {
    let mut game = start("normal");
    edit(&mut game, |s| {
        s.score = 480;
        s.player.hp = 10;
        let (px, py) = (s.player.x, s.player.y);
        s.enemies = vec![enemy(s, EnemyKind::Red, px, py)];
    });

    let mut recorder = RecordingRecorder::default();
    let events = game.update();
    record(&mut recorder, &events);

    assert!(game.is_run_over());
    assert!(events.contains(&ShooterEvent::CoinsEarned(4)));
    assert!(events.contains(&ShooterEvent::RunOver {
        cleared: false,
        score: 480,
        wave: 1,
    }));
    assert_eq!(
        recorder.count(|e| matches!(
            e,
            ProgressEvent::RunEnd {
                cleared: false,
                final_wave: 1,
                final_score: 480,
                ..
            }
        )),
        1
    );
    assert_eq!(recorder.count(|e| matches!(e, ProgressEvent::HpSample(0))), 1);
    assert_eq!(game.ledger().coins(), 4);

    let summary = game.run_summary();
    assert_eq!(summary.score, 480);
    assert!(!summary.cleared);

    // frozen after the run ends
    assert!(run_game_ticks(&mut game, 10).is_empty());
}

#[test]
fn restart_invalidates_pending_banner() {
    let mut game = start("normal");
    for _ in 0..4 {
        skip_wave(&mut game);
    }
    let events = run_game_ticks(&mut game, 180);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ShooterEvent::BossSpawned { .. }))
    );

    game.restart();
    let events = run_game_ticks(&mut game, 240);
    assert!(!events.contains(&ShooterEvent::BossWarningCleared));
    assert!(!game.state().boss_warning);
    assert_eq!(game.wave_progress().wave, 1);
    assert_eq!(game.state().score, 0);
}

#[test]
fn attack_upgrade_doubles_bullet_damage() {
    let mut ledger = UpgradeLedger::new(500);
    ledger.purchase(UpgradeTrack::AttackPower).unwrap();
    let mut game = StarfallShooter::with_config(ShooterConfig::default()).with_ledger(ledger);
    game.init(&session("normal", 5));
    assert_eq!(game.state().player.stats.bullet_damage, 2);

    edit(&mut game, |s| {
        s.enemies = vec![enemy(s, EnemyKind::Purple, 100.0, 200.0)];
        s.bullets = vec![bullet(110.0, 210.0), bullet(110.0, 230.0)];
    });
    game.update();
    assert!(game.state().enemies.is_empty(), "3 hp purple falls to two hits of 2");
    assert_eq!(game.state().score, 30);
}

#[test]
fn easy_player_takes_longer_to_fall() {
    let mut game = start("easy");
    assert_eq!(game.state().player.hp, 150);
    edit(&mut game, |s| {
        let (px, py) = (s.player.x, s.player.y);
        s.enemies = (0..10).map(|_| enemy(s, EnemyKind::Red, px, py)).collect();
    });
    game.update();
    assert_eq!(game.state().player.hp, 50);
    assert!(!game.is_run_over());
}

#[test]
fn held_movement_persists_between_inputs() {
    let mut game = start("normal");
    let right = ShooterInput {
        right: true,
        ..ShooterInput::default()
    };
    game.apply_input(&rmp_serde::to_vec(&right).unwrap());
    run_game_ticks(&mut game, 10);
    assert_eq!(game.state().player.x, 450.0);

    game.apply_input(&rmp_serde::to_vec(&ShooterInput::default()).unwrap());
    run_game_ticks(&mut game, 10);
    assert_eq!(game.state().player.x, 450.0);
}
