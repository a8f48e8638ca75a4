use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extrato_core::BankSelection;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::ImportOptions;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "extrato", version, about = "Brazilian bank statement importer")]
struct Cli {
    /// Configuration file (default: ./extrato.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the banks that can be selected explicitly
    Banks {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Parse a statement file and print the report as JSON
    Import {
        /// CSV or OFX export
        file: PathBuf,

        /// Bank code, or AUTO to detect from the file (default from config)
        #[arg(long)]
        bank: Option<BankSelection>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,

        /// Include signed amounts for the ledger
        #[arg(long)]
        normalized: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Banks { compact } => {
            let pretty = config.output.pretty && !compact;
            println!("{}", commands::list_banks(pretty)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Import {
            file,
            bank,
            compact,
            normalized,
        } => {
            let selection = match bank {
                Some(selection) => selection,
                None => config.default_selection()?,
            };
            let opts = ImportOptions {
                selection,
                pretty: config.output.pretty && !compact,
                normalized: config.output.normalized || normalized,
            };

            let report = commands::import_file(&file, opts.selection)
                .with_context(|| format!("import {}", file.display()))?;
            println!("{}", commands::render_report(&report, &opts)?);

            if report.result.success {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
