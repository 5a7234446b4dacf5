use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use genrun::{cli, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "genrun",
    version,
    about = "Incremental script-generation run orchestrator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the source tree and generate one artifact per source file.
    Generate {
        /// Path to the run configuration file.
        #[arg(long, default_value = "genrun.toml")]
        config: PathBuf,
        /// Write a JSON run report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the source-to-artifact mappings and derived allowlist without
    /// invoking the transformer.
    Plan {
        /// Path to the run configuration file.
        #[arg(long, default_value = "genrun.toml")]
        config: PathBuf,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let args = Cli::parse();
    match args.command {
        Command::Generate { config, report } => cli::generate(&config, report.as_deref()),
        Command::Plan { config } => cli::plan(&config),
    }
}
