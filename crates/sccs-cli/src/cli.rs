use clap::{Parser, Subcommand, ValueEnum};
use sccs_core::Side;
use std::path::PathBuf;

/// Skills, Commands and Configs Sync
///
/// Keep files and directories in sync between their local location and a mirror
/// inside a repository, in both directions
#[derive(Parser, Debug)]
#[command(name = "sccs")]
#[command(about, long_about = None, version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use specific config file (default: <config dir>/sccs/config.yaml)
    #[arg(long, global = true, value_name = "PATH", env = "SCCS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show pending changes without making any
    Status {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Synchronize categories in both directions
    Sync {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Preview changes without executing
        #[arg(long)]
        dry_run: bool,

        /// Resolve every conflict in favor of one side
        #[arg(long, value_enum)]
        force: Option<ForceSide>,

        /// Never prompt; conflicts are left for a later run
        #[arg(long)]
        non_interactive: bool,
    },

    /// Show the differences of one item
    Diff {
        /// Category name
        category: String,

        /// Item name within the category
        item: String,
    },

    /// List configured categories
    Categories,

    /// Forget the recorded sync state
    Reset {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ForceSide {
    /// Keep the local version
    Local,
    /// Keep the repository version
    Repo,
}

impl From<ForceSide> for Side {
    fn from(side: ForceSide) -> Self {
        match side {
            ForceSide::Local => Self::Local,
            ForceSide::Repo => Self::Repo,
        }
    }
}
