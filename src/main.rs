use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use legato_dnd::actor::reactor::{Record, replay};
use legato_dnd::common::config::{Config, config_file};
use legato_dnd::common::log::init_logging;
use legato_dnd::sys::scenario::{Scenario, drain};
use tracing::info;

#[derive(Parser)]
#[command(name = "legato", version, about = "Drag-reorder and autoscroll engine, headless")]
struct Cli {
    /// Raise the log level; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print the emitted events as JSON lines.
    Simulate {
        scenario: PathBuf,
        /// Record the input events and layout changes to this file.
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Feed a recording to the host described by a scenario.
    Replay {
        recording: PathBuf,
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Parse and validate a settings file.
    CheckConfig { path: Option<PathBuf> },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate { scenario, record } => {
            let scenario = Scenario::read(&scenario)?;
            let record = Record::new(record.as_deref())?;
            for event in scenario.run(record) {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Commands::Replay { recording, scenario } => {
            let scenario = Scenario::read(&scenario)?;
            let (mut reactor, mut rx) = scenario.reactor(Record::default());
            let count = replay(&recording, &mut reactor)?;
            info!(count, "replayed events");
            for event in drain(&mut rx) {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Commands::CheckConfig { path } => {
            let path = match path {
                Some(path) => path,
                None => config_file().context("no config directory on this platform")?,
            };
            let config = Config::read(&path)?;
            println!("{} is valid", path.display());
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
