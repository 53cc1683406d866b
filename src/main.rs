//! Einsatzmonitor CLI entry point.

use clap::Parser;

use einsatzmonitor::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => {
            einsatzmonitor::cli::commands::run::execute(args, &cli.config, cli.json).await
        }
        Commands::Tick(args) => {
            einsatzmonitor::cli::commands::tick::execute(args, &cli.config, cli.json).await
        }
        Commands::Device(args) => {
            einsatzmonitor::cli::commands::device::execute(args, &cli.config, cli.json).await
        }
        Commands::Config(args) => {
            einsatzmonitor::cli::commands::config::execute(args, &cli.config, cli.json).await
        }
        Commands::Init(args) => {
            einsatzmonitor::cli::commands::init::execute(args, &cli.config, cli.json).await
        }
    };

    if let Err(err) = result {
        einsatzmonitor::cli::handle_error(&err, cli.json);
    }
}
