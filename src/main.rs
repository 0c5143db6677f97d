//! Duet headless runner
//!
//! Plays a batch of episodes with the built-in controller and keeps a
//! leaderboard next to the config file.
//!
//! Usage:
//!   duet [config.json] [--episodes N] [--seed S] [--control contr]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use duet::{ControlMode, DuetEnv, EnvConfig, HighScores};

const HIGHSCORES_FILE: &str = "duet_highscores.json";

#[derive(Parser)]
#[command(name = "duet")]
#[command(about = "Play Duet episodes headless and record high scores")]
struct Args {
    /// JSON config file (defaults are used when it does not exist)
    #[arg(default_value = "duet.json")]
    config: PathBuf,

    /// Number of episodes to play
    #[arg(long)]
    episodes: Option<u32>,

    /// Master seed for the episode seed stream
    #[arg(long)]
    seed: Option<u64>,

    /// Control source (external/ai, keyboard/man, controller/contr)
    #[arg(long)]
    control: Option<ControlMode>,

    /// Step limit per episode, so a flawless controller still finishes
    #[arg(long, default_value_t = 100_000)]
    max_steps: u32,
}

impl Args {
    fn apply(&self, config: &mut EnvConfig) {
        if let Some(episodes) = self.episodes {
            config.max_episodes = episodes;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(control) = self.control {
            config.control = control;
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> duet::Result<()> {
    let mut config = EnvConfig::load_or_default(&args.config)?;
    args.apply(&mut config);
    let config = config.headless();

    let highscores_path = args
        .config
        .parent()
        .map(|dir| dir.join(HIGHSCORES_FILE))
        .unwrap_or_else(|| PathBuf::from(HIGHSCORES_FILE));
    let mut highscores = HighScores::load(&highscores_path)?;

    let episodes = config.max_episodes;
    let mut env = DuetEnv::new(config)?;
    let mut total = 0u64;

    for episode in 1..=episodes {
        env.reset();
        let summary = env.run_episode(args.max_steps)?;
        total += summary.score as u64;

        match highscores.add_score(summary.score, summary.seed, summary.ticks) {
            Some(rank) => log::info!(
                "Episode {}/{}: score {} (rank #{})",
                episode,
                episodes,
                summary.score,
                rank
            ),
            None => log::info!("Episode {}/{}: score {}", episode, episodes, summary.score),
        }
    }

    if episodes > 0 {
        log::info!(
            "Mean score over {} episodes: {:.2}",
            episodes,
            total as f64 / episodes as f64
        );
    }
    if let Some(best) = highscores.top_score() {
        log::info!("Best score so far: {}", best);
    }

    highscores.save(&highscores_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "duet",
            "run.json",
            "--episodes",
            "3",
            "--seed",
            "9",
            "--control",
            "contr",
        ]);
        assert_eq!(args.config, PathBuf::from("run.json"));

        let mut config = EnvConfig::default();
        args.apply(&mut config);
        assert_eq!(config.max_episodes, 3);
        assert_eq!(config.seed, 9);
        assert_eq!(config.control, ControlMode::Controller);
    }

    #[test]
    fn test_help_is_not_a_config_path() {
        assert!(Args::try_parse_from(["duet", "--help"]).is_err());
        let args = Args::parse_from(["duet"]);
        assert_eq!(args.config, PathBuf::from("duet.json"));
        assert_eq!(args.max_steps, 100_000);
    }

    #[test]
    fn test_unknown_control_rejected() {
        assert!(Args::try_parse_from(["duet", "--control", "telepathy"]).is_err());
    }
}
