//! Patrol CLI - headless floor simulation.
//!
//! - `patrol run` - tick a scenario and print the final snapshot
//! - `patrol scenario` - print the stock factory scenario as YAML
//! - `patrol check` - load a scenario and report problems without running it

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use patrol_sim::{EventKind, Floor, FloorSnapshot, NavEvent, ScenarioConfig, Vec2};

#[derive(Parser)]
#[command(name = "patrol")]
#[command(about = "Waypoint patrol and obstacle avoidance on a factory floor", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario for a fixed amount of simulated time
    Run {
        /// Scenario file (YAML); defaults to the factory floor
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Simulated seconds
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,

        /// Ticks per simulated second
        #[arg(long, default_value_t = 60.0)]
        hz: f64,

        /// Print output as JSON
        #[arg(long)]
        json: bool,

        /// Print notifications as they happen
        #[arg(long)]
        events: bool,
    },

    /// Print the default factory scenario
    Scenario,

    /// Validate a scenario file
    Check {
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if cli.log_json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Run {
            scenario,
            seconds,
            hz,
            json,
            events,
        } => run(scenario.as_deref(), seconds, hz, json, events),
        Commands::Scenario => {
            print!("{}", ScenarioConfig::factory().to_yaml()?);
            Ok(())
        }
        Commands::Check { scenario } => check(&scenario),
    }
}

fn load(path: Option<&Path>) -> Result<ScenarioConfig> {
    match path {
        Some(path) => ScenarioConfig::load(path),
        None => Ok(ScenarioConfig::factory()),
    }
}

fn run(path: Option<&Path>, seconds: f64, hz: f64, json: bool, print_events: bool) -> Result<()> {
    if !hz.is_finite() || hz <= 0.0 {
        bail!("--hz must be a positive number, got {hz}");
    }
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("--seconds must be non-negative, got {seconds}");
    }

    let scenario = load(path)?;
    let mut floor = Floor::from_scenario(&scenario).context("Failed to build floor")?;
    let ticks = (seconds * hz).round() as u64;
    let dt = (1.0 / hz) as f32;

    tracing::info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        agents = floor.len(),
        obstacles = floor.obstacles().len(),
        ticks,
        "Starting run"
    );

    let mut escapes = 0usize;
    let mut teleports = 0usize;
    for _ in 0..ticks {
        floor.tick(dt);
        for event in floor.drain_events() {
            match event.kind {
                EventKind::EscapeStarted { .. } => escapes += 1,
                EventKind::Teleported { .. } => teleports += 1,
                _ => {}
            }
            if print_events {
                print_event(&floor, &event, json)?;
            }
        }
    }

    tracing::info!(
        elapsed = floor.elapsed_seconds(),
        escapes,
        teleports,
        "Run finished"
    );

    print_snapshot(&floor.snapshot(), json)
}

fn print_event(floor: &Floor, event: &NavEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    let name = floor
        .agent(event.agent)
        .map(|a| a.name().to_string())
        .unwrap_or_else(|_| event.agent.to_string());
    let detail = match &event.kind {
        EventKind::Registered { name } => format!("registered as {name}"),
        EventKind::StateChanged { from, to } => format!("{from} -> {to}"),
        EventKind::WaypointReached { index } => format!("reached waypoint {index}"),
        EventKind::EscapeStarted { velocity } => {
            format!("escape burst ({:.2}, {:.2})", velocity.x, velocity.z)
        }
        EventKind::EscapeFinished => "escape finished".to_string(),
        EventKind::Reversed => "reversing".to_string(),
        EventKind::Teleported {
            waypoint: Some(index),
        } => format!("teleported to waypoint {index}"),
        EventKind::Teleported { waypoint: None } => "stuck, no safe waypoint".to_string(),
    };
    println!("[{:>6}] {name:<12} {detail}", event.tick);
    Ok(())
}

fn print_snapshot(snapshot: &FloorSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    println!("tick {} ({:.2}s)", snapshot.tick, snapshot.elapsed_seconds);
    println!(
        "{:<12} {:<8} {:>8} {:>8} {:>6} {:>4}",
        "agent", "state", "x", "z", "speed", "wp"
    );
    for agent in &snapshot.agents {
        println!(
            "{:<12} {:<8} {:>8.2} {:>8.2} {:>6.2} {:>4}",
            agent.name,
            agent.state,
            agent.position.x,
            agent.position.z,
            agent.velocity.length(),
            agent.waypoint_index
        );
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let scenario = ScenarioConfig::load(path)?;
    let records = scenario.obstacle_records();
    let floor = Floor::from_scenario(&scenario).context("Scenario is not usable")?;

    let skipped = records.len() - floor.obstacles().len();
    let mut problems = 0usize;

    for id in floor.ids() {
        let agent = floor.agent(id)?;
        let walkable = floor.bounds().map(|b| b.inset(agent.radius()));
        for (index, wp) in agent.router().waypoints().iter().enumerate() {
            let p = Vec2::new(wp.x, wp.z);
            if walkable.is_some_and(|w| !w.contains(p)) {
                tracing::warn!(agent = agent.name(), index, "waypoint is outside the floor");
                problems += 1;
            }
            if floor
                .obstacles()
                .iter()
                .any(|o| o.expanded(agent.radius()).contains(p))
            {
                tracing::warn!(agent = agent.name(), index, "waypoint is inside an obstacle");
                problems += 1;
            }
        }
        if agent.router().waypoints().is_empty() {
            tracing::warn!(agent = agent.name(), "agent has no waypoints and will not move");
        }
    }

    println!(
        "{}: {} agents, {} obstacles ({} skipped), {} problems",
        path.display(),
        floor.len(),
        floor.obstacles().len(),
        skipped,
        problems
    );
    if problems > 0 {
        bail!("{problems} problem(s) found in {}", path.display());
    }
    Ok(())
}
