use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use parking_sim::simulation::{ScenarioConfig, SimEvent, SimWorld};

#[derive(Parser)]
#[command(name = "parking_sim")]
#[command(about = "Headless parking grid simulation")]
struct Cli {
    /// Scenario file (TOML); the built-in demo lot is used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of vehicle clicks to simulate
    #[arg(long, default_value = "20")]
    clicks: u32,

    /// Seed for choosing which vehicle gets clicked
    #[arg(long)]
    seed: Option<u64>,

    /// Time delta per frame in seconds
    #[arg(long, default_value = "0.05")]
    delta: f32,

    /// Only print the initial and final state
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn,parking_sim=info"))
        .init();

    let cli = Cli::parse();
    if cli.delta <= 0.0 {
        anyhow::bail!("--delta must be positive (got {})", cli.delta);
    }

    let config = match &cli.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };

    let mut world =
        SimWorld::from_scenario(&config, cli.seed).context("Failed to build the parking lot")?;

    run_headless(&mut world, &cli, &config);
    Ok(())
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(world: &mut SimWorld, cli: &Cli, config: &ScenarioConfig) {
    println!("Running parking simulation in headless mode...");
    println!("Clicks: {}, Delta: {}s", cli.clicks, cli.delta);
    println!();

    // Enough frames for any slide to finish or time out
    let max_ticks = (config.slide.timeout.max(config.slide.duration) / cli.delta).ceil() as u32 + 2;

    println!("Initial state:");
    world.print_summary();
    world.draw_map();

    let mut clicks = 0;
    while clicks < cli.clicks {
        let Some((id, report)) = world.click_random_vehicle() else {
            println!("No idle vehicles left on the grid");
            break;
        };
        clicks += 1;

        match report {
            Some(report) => println!(
                "--- Click {}: {:?} -> {:?}{} ---",
                clicks,
                id,
                report.outcome,
                if report.started_sliding { " (sliding)" } else { "" }
            ),
            None => println!("--- Click {}: {:?} ignored ---", clicks, id),
        }

        world.run_until_settled(cli.delta, max_ticks);

        for event in world.drain_events() {
            match event {
                SimEvent::Bumped { vehicle, blocker } => {
                    println!("  {:?} bumped into {:?}", vehicle, blocker)
                }
                SimEvent::Arrived { vehicle, head, .. } => {
                    println!("  {:?} parked at ({}, {})", vehicle, head.column, head.row)
                }
                SimEvent::BoundaryReached(exit) => println!(
                    "  {:?} left the grid at ({}, {})",
                    exit.vehicle, exit.cell.column, exit.cell.row
                ),
                SimEvent::SlideTimedOut { vehicle } => println!("  {:?} slide timed out", vehicle),
                SimEvent::SlideCancelled { vehicle, head } => println!(
                    "  {:?} slide cancelled at ({}, {})",
                    vehicle, head.column, head.row
                ),
            }
        }

        if !cli.quiet {
            world.draw_map();
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();
    println!("SIMULATION COMPLETE");
}
