mod autopilot;
mod prefs;

use std::error::Error;

use tracing_subscriber::EnvFilter;

use starfall_core::events::ProgressionRecorder;
use starfall_core::game_trait::{ArcadeGame, SessionConfig};
use starfall_core::store::JsonFileStore;
use starfall_progression::{MilestoneCatalog, StatsRecorder};
use starfall_shooter::upgrades::{UpgradeLedger, UpgradeTrack};
use starfall_shooter::{ShooterEvent, StarfallShooter};

use autopilot::Autopilot;
use prefs::Prefs;

/// Ten minutes of play at 60 fps.
const DEFAULT_MAX_FRAMES: u64 = 36_000;

struct Args {
    seed: u64,
    difficulty: Option<String>,
    store: String,
    runs: u32,
    max_frames: u64,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Self {
        let mut parsed = Self {
            seed: 1,
            difficulty: None,
            store: "starfall-save.json".to_string(),
            runs: 1,
            max_frames: DEFAULT_MAX_FRAMES,
        };
        for arg in args {
            if let Some(v) = arg.strip_prefix("--seed=") {
                parsed.seed = v.parse().unwrap_or(parsed.seed);
            } else if let Some(v) = arg.strip_prefix("--difficulty=") {
                parsed.difficulty = Some(v.to_string());
            } else if let Some(v) = arg.strip_prefix("--store=") {
                parsed.store = v.to_string();
            } else if let Some(v) = arg.strip_prefix("--runs=") {
                parsed.runs = v.parse().unwrap_or(parsed.runs);
            } else if let Some(v) = arg.strip_prefix("--max-frames=") {
                parsed.max_frames = v.parse().unwrap_or(parsed.max_frames);
            } else {
                tracing::warn!("Ignoring unknown argument {arg}");
            }
        }
        parsed
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse(std::env::args().skip(1));
    let mut kv = JsonFileStore::open(&args.store);
    let mut prefs = Prefs::load(&mut kv);
    if let Some(difficulty) = &args.difficulty {
        prefs.difficulty = difficulty.clone();
    }

    let mut recorder = StatsRecorder::load(&mut kv, MilestoneCatalog::load());
    let mut game = StarfallShooter::new().with_ledger(UpgradeLedger::load(&mut kv));
    game.set_high_score(prefs.high_score);
    let pilot = Autopilot;

    tracing::info!(
        store = %kv.path().display(),
        difficulty = %prefs.difficulty,
        runs = args.runs,
        "Starfall headless driver starting"
    );

    for run in 0..args.runs {
        buy_upgrades(game.ledger_mut());
        let session = SessionConfig {
            difficulty: prefs.difficulty.clone(),
            seed: args.seed.wrapping_add(u64::from(run)),
            ..SessionConfig::default()
        };
        game.init(&session);
        play_run(&mut game, &mut recorder, pilot, args.max_frames)?;

        let summary = game.run_summary();
        tracing::info!(
            run = run + 1,
            score = summary.score,
            wave = summary.wave,
            kills = summary.kills,
            cleared = summary.cleared,
            coins = game.ledger().coins(),
            "Run finished"
        );
        for id in recorder.take_new_unlocks() {
            tracing::info!("New achievement: {id}");
        }

        prefs.high_score = prefs.high_score.max(game.state().high_score);
        prefs.save(&mut kv)?;
        game.ledger().save(&mut kv)?;
        recorder.save(&mut kv)?;
    }

    let progress = recorder.progress();
    tracing::info!(
        games = recorder.profile().games_played,
        total_kills = recorder.profile().total_kills,
        unlocked = progress.unlocked,
        total = progress.total,
        percentage = progress.percentage,
        "Profile saved"
    );
    Ok(())
}

/// Drive one run until it ends or the frame cap is hit.
fn play_run(
    game: &mut StarfallShooter,
    recorder: &mut StatsRecorder,
    pilot: Autopilot,
    max_frames: u64,
) -> Result<(), Box<dyn Error>> {
    for _ in 0..max_frames {
        let input = pilot.steer(game.state());
        game.apply_input(&rmp_serde::to_vec(&input)?);

        let mut offer = None;
        for event in game.update() {
            match event {
                ShooterEvent::Progress(progress) => recorder.record(&progress),
                ShooterEvent::RewardOffered(ids) => offer = Some(ids),
                ShooterEvent::BossSpawned { name } => tracing::info!("Boss incoming: {name}"),
                ShooterEvent::BossDefeated {
                    name,
                    points,
                    special_attacks,
                } => {
                    tracing::info!(special_attacks, "{name} destroyed for {points} points");
                },
                other => tracing::trace!(?other, "Event"),
            }
        }
        if let Some(ids) = offer
            && let Some(choice) = pilot.pick_reward(game.state(), &ids)
        {
            tracing::debug!(?choice, "Taking reward");
            game.choose_reward(choice)?;
        }
        if game.is_run_over() {
            return Ok(());
        }
    }
    tracing::warn!(max_frames, "Frame cap reached before the run ended");
    Ok(())
}

/// Spend coins on every affordable level, track by track.
fn buy_upgrades(ledger: &mut UpgradeLedger) {
    for track in UpgradeTrack::ALL {
        while let Ok(receipt) = ledger.purchase(track) {
            tracing::info!(
                track = receipt.track.spec().name,
                level = receipt.new_level,
                cost = receipt.cost,
                "Bought upgrade"
            );
        }
    }
}
