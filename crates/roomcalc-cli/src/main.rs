mod cli;
mod handlers;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use roomcalc_cli::output;
use roomcalc_core::AppConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("ROOMCALC_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        // stdout carries the JSON response, so logs go to stderr.
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_env("ROOMCALC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .init();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match AppConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => output::output_error(&e.to_string()),
        },
        None => AppConfig::load(),
    };
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Run(args) => handlers::run::handle(config, args)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "roomcalc", &mut std::io::stdout());
        }
    }

    Ok(())
}
