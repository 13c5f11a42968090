use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lab_kpi_cli::commands::{self, CommandResult};
use lab_kpi_cli::{logging, read_request};
use tracing::error;

#[derive(Parser)]
#[command(name = "lab-kpi")]
#[command(about = "Laboratory KPI computation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a metrics report
    Compute {
        /// Request JSON file, or `-` for stdin
        #[arg(long)]
        request: String,
        /// KPI config path (overrides KPI_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the loaded KPI config
    Config {
        /// KPI config path (overrides KPI_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn run(command: Commands) -> CommandResult<String> {
    match command {
        Commands::Compute {
            request,
            config,
            pretty,
        } => {
            let request = read_request(&request)?;
            let cache = commands::config_cache(config);
            let report = commands::compute(&cache, &request)?;
            commands::render_report(&report, pretty)
        }
        Commands::Config { config } => {
            let cache = commands::config_cache(config);
            let view = commands::config_view(&cache)?;
            commands::render_config(&view)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    let output = match run(cli.command) {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "lab-kpi command failed");
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output).context("Failed to write output")?;
    Ok(ExitCode::SUCCESS)
}
