use anyhow::Context;
use sccs_core::sync::SyncReporter;

use crate::commands::common::CommandOptions;

pub struct Status;

impl Status {
    pub fn execute(category: Option<&str>, options: &CommandOptions) -> anyhow::Result<()> {
        let mut engine = options.engine()?;
        let statuses = engine
            .get_status(category)
            .context("Failed to compute status")?;

        print!("{}", SyncReporter::generate_status(&statuses));

        let pending: usize = statuses.iter().map(|s| s.to_sync + s.conflicts).sum();
        if pending == 0 && statuses.iter().all(|s| s.error.is_none()) {
            println!("\nEverything is in sync.");
        } else {
            println!("\n{pending} item(s) need attention. Run `sccs sync` to apply.");
        }
        Ok(())
    }
}
