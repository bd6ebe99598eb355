use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rocketyard_cli::commands::{parts, performance, validate};
use rocketyard_cli::logging::{init_tracing, LogFormat};
use rocketyard_lib::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rocket catalog validation and performance utilities")]
struct Cli {
    /// Log output format (json or text).
    #[arg(long, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// JSON configuration file with physics, structure and validation settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every record of a catalog and the references between them.
    Validate {
        /// Catalog JSON file.
        catalog: PathBuf,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Assemble a rocket from a description and print its performance.
    Performance {
        /// Catalog JSON file.
        catalog: PathBuf,
        /// Rocket description JSON file.
        rocket: PathBuf,
        /// Extra payload mass in kilograms.
        #[arg(long, default_value_t = 0.0)]
        payload: f64,
        /// Altitude in metres at which figures are computed.
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
    },
    /// List the parts of a catalog.
    Parts {
        /// Catalog JSON file.
        catalog: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Validate { catalog, json } => {
            let valid = validate::handle_validate(&catalog, &config, json)?;
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Performance {
            catalog,
            rocket,
            payload,
            altitude,
        } => performance::handle_performance(&catalog, &rocket, &config, payload, altitude),
        Command::Parts { catalog } => parts::handle_list_parts(&catalog),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}
