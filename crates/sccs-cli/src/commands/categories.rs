use crate::commands::common::CommandOptions;

pub struct Categories;

impl Categories {
    pub fn execute(options: &CommandOptions) -> anyhow::Result<()> {
        let engine = options.engine()?;
        let config = engine.config();

        if config.sync_categories.is_empty() {
            println!("No categories configured");
            return Ok(());
        }

        for (name, category) in &config.sync_categories {
            let marker = if engine.is_selected(name) {
                "✓"
            } else if category.enabled {
                "-" // not for this platform
            } else {
                "✗"
            };
            println!("{marker} {name} ({})", category.sync_mode.as_str());
            if !category.description.is_empty() {
                println!("    {}", category.description);
            }
            println!("    local: {}", category.local_path.display());
            println!(
                "    repo:  {}",
                config.repository.path.join(&category.repo_path).display()
            );
            if let Some(platforms) = &category.platforms {
                println!("    platforms: {}", platforms.join(", "));
            }
        }
        Ok(())
    }
}
