use anyhow::Context;
use sccs_core::comparison::{DiffGenerator, DirectoryComparator};
use sccs_core::sync::BackupStore;
use sccs_core::{CategoryHandler, Side};

use crate::commands::common::CommandOptions;

pub struct Diff;

impl Diff {
    pub fn execute(category: &str, item: &str, options: &CommandOptions) -> anyhow::Result<()> {
        let config = options.load_config()?;
        let category_config = config
            .category(category)
            .with_context(|| format!("Unknown category: {category}"))?
            .clone();

        let mut handler = CategoryHandler::new(
            category,
            category_config,
            &config.repository.path,
            config.global_exclude.clone(),
            BackupStore::disabled(),
        );
        let scan = handler
            .scan_items()
            .with_context(|| format!("Failed to scan category '{category}'"))?;
        let item = scan
            .items
            .get(item)
            .with_context(|| format!("Item '{item}' not found in category '{category}'"))?;

        let local = item.path(Side::Local);
        let repo = item.path(Side::Repo);
        match (item.exists(Side::Local), item.exists(Side::Repo)) {
            (true, false) => println!("{} exists only locally: {}", item.name, local.display()),
            (false, true) => {
                println!("{} exists only in the repository: {}", item.name, repo.display());
            }
            (false, false) => println!("{} exists on neither side", item.name),
            (true, true) if item.kind.is_directory() => {
                let comparison = DirectoryComparator::compare(local, repo)
                    .context("Failed to compare directories")?;
                if comparison.is_identical() {
                    println!("{} is identical on both sides", item.name);
                } else {
                    println!("{}", comparison.summary());
                }
            }
            (true, true) => {
                let diff = DiffGenerator::generate(local, repo).context("Failed to generate diff")?;
                if diff.is_empty() {
                    println!("{} is identical on both sides", item.name);
                } else {
                    print!("{diff}");
                }
            }
        }
        Ok(())
    }
}
