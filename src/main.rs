//! Ho-Ho-Honk entry point
//!
//! Loads a chapter and plays it headless: the autopilot flies, the session
//! restarts after every crash, and a summary is printed at the end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ho_ho_honk::sim::GameEvent;
use ho_ho_honk::{Chapter, ChapterConfig, Session, ticks_to_secs};

/// Frame rate the headless driver pretends to render at
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(name = "ho-ho-honk", version, about = "Headless chimney-flapper runner")]
struct Args {
    /// Chapter JSON file (built-in defaults if omitted)
    #[arg(long)]
    chapter: Option<PathBuf>,
    /// Session seed
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
    /// Simulated wall time to play
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// No input at all: the player hovers in Idle
    #[arg(long)]
    no_autopilot: bool,
    /// Print the built-in chapter as JSON and exit
    #[arg(long)]
    dump_default_chapter: bool,
}

#[derive(Debug, Default)]
struct Summary {
    runs: u32,
    deaths: u32,
    pairs_spawned: u32,
    fire_pairs: u32,
    pairs_passed: u32,
    collected: u32,
    double_windows: u32,
    ignitions: u32,
    shielded: u32,
}

impl Summary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RunStarted => self.runs += 1,
            GameEvent::Died { .. } => self.deaths += 1,
            GameEvent::PairSpawned { hazard, .. } => {
                self.pairs_spawned += 1;
                if *hazard {
                    self.fire_pairs += 1;
                }
            }
            GameEvent::PairPassed { .. } => self.pairs_passed += 1,
            GameEvent::Collected { .. } => self.collected += 1,
            GameEvent::DoubleScoreStarted { .. } => self.double_windows += 1,
            GameEvent::FireIgnited { .. } => self.ignitions += 1,
            GameEvent::Shielded { .. } => self.shielded += 1,
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.dump_default_chapter {
        let json = ChapterConfig::default()
            .to_json_pretty()
            .context("failed to serialize default chapter")?;
        println!("{json}");
        return Ok(());
    }

    let chapter = match &args.chapter {
        Some(path) => Chapter::load(path)
            .with_context(|| format!("failed to load chapter {}", path.display()))?,
        None => Chapter::default(),
    };

    let mut session = Session::new(chapter, args.seed);
    session.set_autopilot(!args.no_autopilot);

    let frames = (args.seconds.max(0.0) / FRAME_DT).round() as u64;
    let mut summary = Summary::default();
    for _ in 0..frames {
        session.update(FRAME_DT);
        for event in session.drain_events() {
            summary.record(&event);
        }
        if session.state().player.is_dead() {
            session.request_restart();
        }
    }
    let best = session.best_score.max(session.state().score);

    println!("Chapter:        {}", session.chapter().name);
    println!("Seed:           {}", args.seed);
    println!("Runs:           {}", summary.runs);
    println!("Deaths:         {}", summary.deaths);
    println!("Best score:     {}", best);
    println!(
        "Current run:    {:.1}s, score {}",
        ticks_to_secs(session.state().time_ticks),
        session.state().score
    );
    println!(
        "Pairs:          {} spawned ({} burning), {} passed",
        summary.pairs_spawned, summary.fire_pairs, summary.pairs_passed
    );
    println!("Collected:      {}", summary.collected);
    println!("Double windows: {}", summary.double_windows);
    println!("Fire ignitions: {}", summary.ignitions);
    println!("Shielded hits:  {}", summary.shielded);
    Ok(())
}
