use std::io::IsTerminal;

use anyhow::Context;
use sccs_core::sync::SyncReporter;
use sccs_core::{ConflictResolver, Side, SyncOptions};

use crate::commands::common::CommandOptions;
use crate::interactive::InteractiveResolver;

pub struct Sync;

impl Sync {
    pub fn execute(
        category: Option<&str>,
        dry_run: bool,
        force: Option<Side>,
        non_interactive: bool,
        options: &CommandOptions,
    ) -> anyhow::Result<()> {
        let mut engine = options.engine()?;

        if dry_run {
            println!("Dry run: no files or sync state will be changed.");
        } else {
            let created = engine
                .ensure_repo_structure()
                .context("Failed to prepare repository directories")?;
            for dir in created {
                println!("Created {}", dir.display());
            }
        }

        let sync_options = SyncOptions {
            dry_run,
            force_direction: force,
        };

        let mut resolver = if non_interactive || dry_run || !std::io::stdin().is_terminal() {
            None
        } else {
            Some(InteractiveResolver::new())
        };
        let result = engine
            .sync(
                category,
                &sync_options,
                resolver.as_mut().map(|r| r as &mut dyn ConflictResolver),
            )
            .context("Sync failed")?;

        print!("{}", SyncReporter::generate_summary(&result, dry_run));

        if result.aborted {
            println!("Sync cancelled by user.");
            return Ok(());
        }
        if result.conflicts > 0 && resolver.is_none() && force.is_none() {
            println!(
                "{} conflict(s) left unresolved. Run `sccs sync` interactively or pass --force.",
                result.conflicts
            );
        }
        if result.has_errors() {
            anyhow::bail!("Sync completed with errors");
        }
        Ok(())
    }
}
