//! Arena Shooter headless runner
//!
//! Drives a session with autopilot input and logs presenter traffic.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use arena_shooter::consts::FRAME_MS;
use arena_shooter::sim::{FrameOutcome, GamePhase, GameSession};
use arena_shooter::{LogPresenter, TickInput, Tuning};
use clap::Parser;
use serde::Serialize;

/// Headless arena shooter - runs the simulation without a renderer
#[derive(Parser, Debug)]
#[command(name = "arena-shooter")]
#[command(about = "Run the arena shooter simulation headless")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120)]
    seconds: u64,

    /// Frame length in milliseconds
    #[arg(long, default_value_t = FRAME_MS)]
    frame_ms: u64,

    /// Tuning file (JSON); defaults are used if missing or invalid
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Restart this many times after game over
    #[arg(long, default_value_t = 0)]
    restarts: u32,

    /// Stand still and never cast instead of using the autopilot
    #[arg(long)]
    no_autopilot: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    simulated_ms: u64,
    frames: u64,
    runs: Vec<RunResult>,
}

#[derive(Serialize)]
struct RunResult {
    survived_secs: u64,
    kills: u32,
    money: u64,
    game_over: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    log::info!("Arena Shooter (headless) starting, seed {}", seed);

    let mut presenter = LogPresenter::new();
    let mut session = GameSession::new(tuning, seed);
    session.start(&mut presenter);

    let frame_ms = args.frame_ms.max(1);
    let total_frames = args.seconds * 1000 / frame_ms;
    let mut runs = Vec::new();
    let mut restarts_left = args.restarts;

    for _ in 0..total_frames {
        let input = if args.no_autopilot {
            TickInput::default()
        } else {
            TickInput::autopilot(session.state(), &session.abilities())
        };
        match session.frame(&input, frame_ms, &mut presenter) {
            FrameOutcome::GameOver { survived_secs } => {
                let player = &session.state().player;
                runs.push(RunResult {
                    survived_secs,
                    kills: player.kills,
                    money: player.money,
                    game_over: true,
                });
                if restarts_left == 0 {
                    break;
                }
                restarts_left -= 1;
                session.restart(&mut presenter);
            }
            FrameOutcome::Continue | FrameOutcome::Ignored => {}
        }
    }

    if session.phase() != GamePhase::GameOver {
        let player = &session.state().player;
        runs.push(RunResult {
            survived_secs: session.elapsed_secs(),
            kills: player.kills,
            money: player.money,
            game_over: false,
        });
    }

    let summary = RunSummary {
        seed,
        simulated_ms: session.now_ms(),
        frames: session.frames(),
        runs,
    };

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize summary: {}", e),
        }
    } else {
        for (i, run) in summary.runs.iter().enumerate() {
            println!(
                "Run {}: {} survived {}s, {} kills, {} money",
                i + 1,
                if run.game_over { "died," } else { "alive," },
                run.survived_secs,
                run.kills,
                run.money
            );
        }
        println!(
            "Seed {} | {} frames | {}ms simulated",
            summary.seed, summary.frames, summary.simulated_ms
        );
    }
}
