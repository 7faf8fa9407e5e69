//! Bidirectional synchronization engine
//!
//! Items discovered by the scanner are classified against the ledger of the
//! last synchronized content hash, then copied, deleted or merged:
//! - [`classify`]: the closed set of outcomes and the pure classifier
//! - executor: atomic copies and deletes with backups
//! - conflict: forced directions, resolver prompts and hunk merges
//! - [`CategoryHandler`] and [`SyncEngine`]: per-category and whole-run orchestration

mod actions;
mod backup;
mod category;
mod conflict;
mod engine;
mod executor;
mod item;
mod reporting;
mod state;


pub use actions::{classify, determine_action, ActionType, Decision, Observation, Provenance, SyncAction};
pub use backup::BackupStore;
pub use category::{CategoryHandler, CategoryStatus, CategorySyncResult, SyncOptions};
pub use conflict::{CallbackResolver, ConflictChoice, ConflictResolver, MAX_PROMPTS};
pub use engine::{CategoryFilter, SyncEngine, SyncOutcome, SyncResult};
pub use executor::{ActionExecutor, ActionResult};
pub use item::{ItemKind, Side, SyncItem};
pub use reporting::SyncReporter;
pub use state::{ItemState, ItemUpdate, StateManager, SyncState};
