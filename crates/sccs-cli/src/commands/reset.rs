use anyhow::Context;

use crate::commands::common::CommandOptions;

pub struct Reset;

impl Reset {
    pub fn execute(category: Option<&str>, options: &CommandOptions) -> anyhow::Result<()> {
        let mut engine = options.engine()?;
        engine
            .reset_state(category)
            .context("Failed to reset sync state")?;

        match category {
            Some(name) => println!("Sync state of '{name}' cleared."),
            None => println!("Sync state cleared."),
        }
        println!("The next sync treats affected items as never synced.");
        Ok(())
    }
}
