//! Random-policy runner (default binary).
//!
//! Plays uniformly random legal actions against an engine and reports how
//! each episode ended. Engine settings come from the `SOLITAIRE_*`
//! environment first; flags override them.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use solitaire_gym::adapter::{EngineConfig, EngineError, Session};
use solitaire_gym::core::{DumpLayout, SimpleRng, Turn};
use solitaire_gym::types::ActionId;

#[derive(Parser, Debug)]
#[command(
    name = "solitaire-gym",
    version,
    about = "Drive a solitaire engine with a random legal policy"
)]
struct Args {
    /// Engine executable
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Engine argument (repeatable)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Turn layout: standard | facedown-counts
    #[arg(long, value_parser = parse_layout)]
    layout: Option<DumpLayout>,

    /// Per-turn read timeout in milliseconds (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    read_timeout_ms: Option<u64>,

    #[arg(long, default_value_t = 1)]
    episodes: u32,

    #[arg(long, default_value_t = 1000)]
    max_steps: u64,

    /// Policy seed
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Append the raw pipe transcript to this file
    #[arg(long)]
    wire_log: Option<PathBuf>,

    /// Print every turn and episode summary as JSON lines
    #[arg(long)]
    json: bool,
}

fn parse_layout(s: &str) -> Result<DumpLayout, String> {
    DumpLayout::from_str(s).ok_or_else(|| format!("unknown layout {:?}", s))
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(engine) = &self.engine {
            config.program = engine.clone();
        }
        if !self.engine_args.is_empty() {
            config.args = self.engine_args.clone();
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(ms) = self.read_timeout_ms {
            config.read_timeout = Duration::from_millis(ms);
        }
        if self.wire_log.is_some() {
            config.wire_log = self.wire_log.clone();
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Ending {
    Terminal,
    MaxSteps,
    EngineExited,
}

#[derive(Debug, Serialize)]
struct EpisodeReport {
    episode: u32,
    steps: u64,
    ending: Ending,
    won: bool,
    foundation_cards: usize,
}

#[derive(Serialize)]
struct TurnLine<'a> {
    episode: u32,
    step: u64,
    action: Option<ActionId>,
    turn: &'a Turn,
}

fn emit_turn(
    json: bool,
    episode: u32,
    step: u64,
    action: Option<ActionId>,
    turn: &Turn,
) -> Result<()> {
    if json {
        let line = TurnLine {
            episode,
            step,
            action,
            turn,
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

fn run_episode(
    args: &Args,
    config: &EngineConfig,
    rng: &mut SimpleRng,
    episode: u32,
) -> Result<EpisodeReport> {
    let mut session = Session::start(config.clone())
        .with_context(|| format!("start engine {}", config.program.display()))?;
    let mut turn = session.initial_turn().context("read initial turn")?;
    emit_turn(args.json, episode, 0, None, &turn)?;

    let mut steps = 0;
    let ending = loop {
        if steps >= args.max_steps {
            break Ending::MaxSteps;
        }
        let Some(&id) = rng.choose(turn.legal.as_slice()) else {
            break Ending::Terminal;
        };

        match session.step(id) {
            Ok(outcome) => {
                steps += 1;
                turn = outcome.into_turn();
                emit_turn(args.json, episode, steps, Some(id), &turn)?;
            }
            Err(EngineError::ProcessExited { code }) => {
                eprintln!("[Runner] engine exited ({:?}) at step {}", code, steps + 1);
                break Ending::EngineExited;
            }
            Err(e) => return Err(e).with_context(|| format!("step {} ({})", steps + 1, id)),
        }
    };
    session.close();

    Ok(EpisodeReport {
        episode,
        steps,
        ending,
        won: turn.board.is_won(),
        foundation_cards: turn.board.foundations.iter().map(|pile| pile.len()).sum(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.engine_config();
    let mut rng = SimpleRng::new(args.seed);

    let mut wins = 0;
    for episode in 0..args.episodes {
        let report = run_episode(&args, &config, &mut rng, episode)?;
        if report.won {
            wins += 1;
        }

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "episode {}: {} steps, {:?}, {} cards on foundations{}",
                report.episode,
                report.steps,
                report.ending,
                report.foundation_cards,
                if report.won { ", won" } else { "" }
            );
        }
    }

    if !args.json {
        println!("{} / {} episodes won", wins, args.episodes);
    }
    Ok(())
}
