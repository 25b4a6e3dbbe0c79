//! Runs a RON scenario for a number of ticks and prints what the agents did.
//!
//! Run with: `cargo run -p npc-sim -- --scenario crates/sim/scenarios/village.ron`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use npc_sim::{Scenario, Simulation};

#[derive(Parser)]
#[command(name = "npc-sim")]
#[command(about = "Run NPC agents through a scenario", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file (RON)
    #[arg(short, long, value_name = "FILE")]
    scenario: PathBuf,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 50)]
    ticks: u64,

    /// Print agent snapshots as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = Scenario::load(&cli.scenario)?;
    let mut sim = Simulation::new(&scenario)?;
    sim.run(cli.ticks)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&sim.snapshots())
            .context("Failed to serialize agent snapshots")?;
        println!("{json}");
        return Ok(());
    }

    let report = sim.report();
    println!("{} ticks", report.ticks);
    for agent in &report.agents {
        let status = agent.last_status.map_or("-", |s| s.as_str());
        println!(
            "{}  {}  hp {:.1}  {}  strategy {}  last {}",
            agent.id,
            agent.position,
            agent.health,
            agent.state,
            agent.strategy.as_deref().unwrap_or("archetype"),
            status,
        );
        for (kind, count) in &agent.actions {
            println!("    {kind:<10} {count}");
        }
    }
    let survivors: Vec<String> = report.survivors.iter().map(ToString::to_string).collect();
    println!("on the map: {}", survivors.join(" "));
    Ok(())
}
