//! Reef Survival headless runner
//!
//! Plays a full run without a renderer: fixed-timestep loop, optional
//! autopilot standing in for the player, notifications to the log and a
//! summary plus leaderboard rank at the end.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use reef_survival::consts::*;
use reef_survival::highscores::{HighScores, format_age};
use reef_survival::sim::{Autopilot, GameEvent, GameManager, GamePhase};
use reef_survival::{ConfigError, Difficulty, SimConfig};

#[derive(Parser)]
#[command(name = "reef-survival")]
#[command(about = "Keep a coral reef alive through rounds of environmental events")]
#[command(version)]
struct Cli {
    /// JSON config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run seed (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// easy, normal or hard (overrides the config)
    #[arg(short, long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Number of rounds
    #[arg(long)]
    rounds: Option<u32>,

    /// Seconds per round
    #[arg(long)]
    round_duration: Option<f32>,

    /// Let the built-in player steer the reef
    #[arg(short, long, visible_alias = "idle")]
    autopilot: bool,

    /// Autopilot reaction time in seconds
    #[arg(long, default_value_t = 0.25)]
    reaction_time: f32,

    /// Wall-clock seconds per rendered frame fed to the loop
    #[arg(long, default_value_t = FRAME_DT)]
    frame_time: f32,

    /// Leaderboard JSON file to load and update
    #[arg(long)]
    scores: Option<PathBuf>,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{}' (easy, normal, hard)", s))
}

fn build_config(cli: &Cli) -> Result<SimConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(total) = cli.rounds {
        config.rounds.total = total;
    }
    if let Some(duration) = cli.round_duration {
        config.rounds.duration = duration;
    }
    config.validate()?;
    Ok(config)
}

/// Fixed-timestep driver: frame time in, whole FRAME_DT ticks out
struct Runner {
    game: GameManager,
    autopilot: Option<Autopilot>,
    accumulator: f32,
}

impl Runner {
    fn frame(&mut self, frame_time: f32) {
        // Stall guard lives here, the simulation takes dt as given
        self.accumulator += frame_time.min(MAX_FRAME_TIME);

        let mut substeps = 0;
        while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
            if let Some(pilot) = self.autopilot.as_mut() {
                pilot.step(&mut self.game, FRAME_DT);
            }
            self.game.tick(FRAME_DT);
            self.accumulator -= FRAME_DT;
            substeps += 1;
        }

        for event in self.game.drain_events() {
            report(&event);
        }

        if self.game.phase() == GamePhase::RoundEnd {
            self.game.start_next_round();
        }
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::EventWarning(message) => log::warn!("{}", message),
        GameEvent::EventStarted(description) => log::info!("Event: {}", description),
        GameEvent::EventEnded => log::info!("Event ended"),
        GameEvent::EventBlocked(description) => log::info!("Shielded from {}", description),
        GameEvent::PowerUpOffered(kind) => log::info!("Power-up offered: {}", kind.name()),
        GameEvent::PowerUpActivated(kind) => {
            log::info!("Power-up active: {} ({})", kind.name(), kind.description())
        }
        GameEvent::AchievementUnlocked(achievement) => {
            log::info!("Achievement: {} - {}", achievement.name(), achievement.description())
        }
        GameEvent::RoundEnded { round, round_score } => {
            log::info!("Round {} scored {}", round, round_score)
        }
        GameEvent::GameOver { score } => log::info!("Game over, score {}", score),
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut runner = Runner {
        game: GameManager::new(config),
        autopilot: cli.autopilot.then(|| Autopilot::new(cli.reaction_time)),
        accumulator: 0.0,
    };
    runner.game.start_game();
    log::info!("Reef Survival (headless) starting...");

    let frame_time = cli.frame_time.max(FRAME_DT);
    while runner.game.phase() == GamePhase::Playing {
        runner.frame(frame_time);
    }

    let summary = runner.game.summary();
    println!(
        "Score {} ({} weighted), {}/{} rounds, {:.1}s survived, final health {:.1}",
        summary.score,
        summary.leaderboard_score,
        summary.rounds_completed,
        summary.total_rounds,
        summary.elapsed_time,
        summary.final_health
    );
    for achievement in &summary.achievements {
        println!("  * {}", achievement.name());
    }
    println!("{}", summary.tip);

    if let Some(path) = &cli.scores {
        let now = now_secs();
        let (scores, rank) = match HighScores::record_to_file(path, &summary, now) {
            Ok(recorded) => recorded,
            Err(e) => {
                log::error!("{}", e);
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        match rank {
            Some(rank) => println!("New high score! Rank #{}", rank),
            None => println!("No leaderboard placement"),
        }
        for (i, entry) in scores.entries.iter().enumerate() {
            println!(
                "{:>2}. {:>6}  {} rounds  {:<6}  {}",
                i + 1,
                entry.score,
                entry.rounds_completed,
                entry.difficulty.as_str(),
                format_age(now, entry.timestamp)
            );
        }
    }

    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; embed the library instead
}
