use anyhow::Result;
use clap::Parser;
use odds_converter::cli::{self, Cli, Commands};
use odds_converter::config::{Config, DEFAULT_CONFIG_PATH};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let config = Config::resolve(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if args.config.is_none() && !Path::new(DEFAULT_CONFIG_PATH).exists() {
        tracing::info!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
    }

    let mut stdout = io::stdout().lock();
    match &args.command {
        Commands::Convert(convert) => {
            writeln!(stdout, "{}", cli::run_convert(&config, convert)?)?;
        }
        Commands::Table(table) => {
            let (out, clean) = cli::run_table(&config, table)?;
            writeln!(stdout, "{out}")?;
            if !clean {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Vig(vig) => {
            writeln!(stdout, "{}", cli::run_vig(vig)?)?;
        }
        Commands::Repl => {
            cli::run_repl(&config, io::stdin().lock(), &mut stdout)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
