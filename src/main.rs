use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use outbreak::{snapshot::SnapshotWriter, ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Outbreak simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/village.yaml")]
    scenario: PathBuf,

    /// Override turn count (uses scenario default when omitted)
    #[arg(long)]
    turns: Option<u64>,

    /// Override snapshot interval in turns (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Print the rendered map every N turns (0 disables rendering)
    #[arg(long, default_value_t = 0)]
    render_every: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let turns = scenario.turns(cli.turns);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_turns);
    let writer = SnapshotWriter::new(&cli.snapshot_dir, snapshot_interval);

    let mut game = scenario.build_outbreak(scenario.name.clone())?;
    for _ in 0..turns {
        let summary = game.resolve_turn()?;
        writer.maybe_write(&game)?;
        if cli.render_every > 0 && summary.turn % cli.render_every == 0 {
            println!("turn {}", summary.turn);
            println!("{}", game.render()?);
        }
    }
    println!(
        "Scenario '{}' completed after {} turns. Entities: {}.",
        scenario.name,
        game.turn(),
        game.entities().len()
    );
    Ok(())
}
