//! Sync operation reporting and statistics

use std::fmt::Write as _;

use super::actions::ActionType;
use super::category::CategoryStatus;
use super::engine::{SyncOutcome, SyncResult};

/// Sync operation reporter
pub struct SyncReporter;

impl Default for SyncReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncReporter {
    /// Create a new reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a summary report
    #[must_use]
    pub fn generate_summary(result: &SyncResult, dry_run: bool) -> String {
        let mut output = String::new();

        output.push_str("\n=== Sync Summary ===\n");
        if dry_run {
            output.push_str("(dry run, nothing was changed)\n");
        }
        let _ = writeln!(
            output,
            "Categories: {}/{}",
            result.synced_categories, result.total_categories
        );
        let _ = writeln!(output, "Synced:    {}", result.synced_items);
        let _ = writeln!(output, "Skipped:   {}", result.skipped_items);
        let _ = writeln!(output, "Conflicts: {}", result.conflicts);
        let _ = writeln!(output, "Errors:    {}", result.errors);
        if result.settings_ensured > 0 {
            let _ = writeln!(output, "Settings updated: {}", result.settings_ensured);
        }

        if !result.category_results.is_empty() {
            output.push('\n');
        }
        for (name, category) in &result.category_results {
            let _ = writeln!(
                output,
                "  {name}: {} synced, {} skipped, {} conflicts, {} errors",
                category.synced, category.skipped, category.conflicts, category.errors
            );
            if let Some(settings) = &category.settings_result {
                if let Some(error) = &settings.error {
                    let _ = writeln!(output, "    settings: {error}");
                } else if !settings.keys_added.is_empty() {
                    let _ = writeln!(
                        output,
                        "    settings: added {} to {}",
                        settings.keys_added.join(", "),
                        settings.target_file.display()
                    );
                }
            }
        }

        let failures: Vec<String> = result
            .category_results
            .iter()
            .flat_map(|(name, category)| {
                category.results.iter().filter(|r| !r.success).map(move |r| {
                    format!(
                        "{name}/{}: {}",
                        r.item_name,
                        r.error.as_deref().unwrap_or("unknown error")
                    )
                })
            })
            .chain(
                result
                    .category_errors
                    .iter()
                    .map(|(name, reason)| format!("category {name}: {reason}")),
            )
            .collect();

        if !failures.is_empty() {
            let _ = writeln!(output, "\nErrors ({}):", failures.len());
            for failure in &failures {
                let _ = writeln!(output, "  - {failure}");
            }
        }

        output.push('\n');
        match result.outcome() {
            SyncOutcome::Success => output.push_str("Status: ✓ Success\n"),
            SyncOutcome::Partial => output.push_str("Status: ⚠ Completed with issues\n"),
            SyncOutcome::Aborted => output.push_str("Status: ✗ Aborted\n"),
        }

        output
    }

    /// Render pending changes of each category
    #[must_use]
    pub fn generate_status(statuses: &[CategoryStatus]) -> String {
        let mut output = String::new();

        for status in statuses {
            if let Some(error) = &status.error {
                let _ = writeln!(output, "[{}] error: {error}", status.name);
                continue;
            }

            let _ = writeln!(
                output,
                "[{}] {} items: {} unchanged, {} to sync, {} conflicts, {} errors",
                status.name,
                status.total_items,
                status.unchanged,
                status.to_sync,
                status.conflicts,
                status.errors
            );

            for action in &status.actions {
                if action.action_type == ActionType::Unchanged {
                    continue;
                }
                let _ = write!(
                    output,
                    "  {:<14} {}  ({})",
                    action.action_type.as_str(),
                    action.item.name,
                    action.reason
                );
                if action.action_type.needs_action() && action.is_first_contact() {
                    output.push_str(" [first contact]");
                }
                if let Some(error) = &action.error {
                    let _ = write!(output, " [{error}]");
                }
                output.push('\n');
            }

            for warning in &status.warnings {
                let _ = writeln!(output, "  warning: {warning}");
            }
        }

        if statuses.is_empty() {
            output.push_str("No categories selected\n");
        }
        output
    }
}
