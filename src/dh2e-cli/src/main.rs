mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dh2e=info,dh2e_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Configure {
            data_root,
            revision,
            show,
        } => {
            commands::configure::handle(data_root, revision, show)?;
        }

        Commands::Migrate {
            data_root,
            revision,
            dry_run,
            skip_recovery,
        } => {
            commands::migrate::handle(data_root, revision, dry_run, skip_recovery)?;
        }

        Commands::Inspect { input } => {
            commands::inspect::handle(&input)?;
        }
    }

    Ok(())
}
