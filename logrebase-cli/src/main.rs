use clap::Parser;
use colored::Colorize;

use logrebase_core::config::RebaseConfig;

use logrebase_cli::cli::{Cli, Commands};
use logrebase_cli::commands;
use logrebase_cli::error::CliError;
use logrebase_cli::logging;
use logrebase_cli::output::OutputWriter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `config validate` reports load failures itself
    let config = match commands::load_config(&cli.config).await {
        Ok(config) => config,
        Err(_) if matches!(cli.command, Commands::Config(_)) => RebaseConfig::default(),
        Err(e) => exit_with(&e),
    };

    logging::init_tracing(&config.general, cli.log_level.as_deref())?;
    tracing::debug!(config = %cli.config.display(), "logrebase starting");

    let writer = OutputWriter::new(cli.output);
    if let Err(e) = commands::execute(cli.command, &cli.config, config, &writer).await {
        tracing::error!(error = %e, exit_code = e.exit_code(), "command failed");
        exit_with(&e);
    }

    Ok(())
}

fn exit_with(err: &CliError) -> ! {
    eprintln!("{} {}", "error:".red().bold(), err);
    std::process::exit(err.exit_code());
}
