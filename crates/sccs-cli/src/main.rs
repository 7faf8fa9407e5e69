mod cli;
mod commands;
mod interactive;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use commands::common::CommandOptions;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\n\nInterrupted by user (Ctrl+C)");
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Running {:?}", cli.command);

    let options = CommandOptions::new(cli.verbose, cli.config.as_deref());

    match &cli.command {
        Commands::Status { category } => {
            commands::Status::execute(category.as_deref(), &options)
                .context("Failed to execute status command")?;
        }
        Commands::Sync {
            category,
            dry_run,
            force,
            non_interactive,
        } => {
            commands::Sync::execute(
                category.as_deref(),
                *dry_run,
                force.map(Into::into),
                *non_interactive,
                &options,
            )
            .context("Failed to execute sync command")?;
        }
        Commands::Diff { category, item } => {
            commands::Diff::execute(category, item, &options)
                .context("Failed to execute diff command")?;
        }
        Commands::Categories => {
            commands::Categories::execute(&options)
                .context("Failed to execute categories command")?;
        }
        Commands::Reset { category } => {
            commands::Reset::execute(category.as_deref(), &options)
                .context("Failed to execute reset command")?;
        }
    }

    Ok(())
}
