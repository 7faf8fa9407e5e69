//! Action types and the change classifier
//!
//! [`classify`] is a pure function of what exists on each side, the content
//! hashes, the last synchronized hash from the ledger and the category's sync
//! mode. Every case is written once and mirrored through [`Side`].

use std::fmt;
use std::path::PathBuf;

use super::item::{Side, SyncItem};
use crate::comparison::ContentHash;
use crate::config::SyncMode;

/// Closed set of outcomes for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    /// Both sides hold the same content
    Unchanged,
    /// Copy local content over the repository copy
    CopyToRepo,
    /// Copy repository content over the local copy
    CopyToLocal,
    /// Item exists only locally; create it in the repository
    NewLocal,
    /// Item exists only in the repository; create it locally
    NewRepo,
    /// Item was deleted locally; delete the repository copy
    DeletedLocal,
    /// Item was deleted from the repository; delete the local copy
    DeletedRepo,
    /// Both sides changed; needs resolution
    Conflict,
    /// Nothing will be done
    Skip,
}

impl ActionType {
    /// All action types, in display order
    pub const ALL: [Self; 9] = [
        Self::Unchanged,
        Self::CopyToRepo,
        Self::CopyToLocal,
        Self::NewLocal,
        Self::NewRepo,
        Self::DeletedLocal,
        Self::DeletedRepo,
        Self::Conflict,
        Self::Skip,
    ];

    /// Snake-case name, as stored in the ledger
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::CopyToRepo => "copy_to_repo",
            Self::CopyToLocal => "copy_to_local",
            Self::NewLocal => "new_local",
            Self::NewRepo => "new_repo",
            Self::DeletedLocal => "deleted_local",
            Self::DeletedRepo => "deleted_repo",
            Self::Conflict => "conflict",
            Self::Skip => "skip",
        }
    }

    /// Creation of an item that exists only on `side`
    #[must_use]
    pub const fn new_from(side: Side) -> Self {
        match side {
            Side::Local => Self::NewLocal,
            Side::Repo => Self::NewRepo,
        }
    }

    /// Propagation of a deletion observed on `side`
    #[must_use]
    pub const fn deleted_on(side: Side) -> Self {
        match side {
            Side::Local => Self::DeletedLocal,
            Side::Repo => Self::DeletedRepo,
        }
    }

    /// Overwrite of the other side with the content of `side`
    #[must_use]
    pub const fn copy_from(side: Side) -> Self {
        match side {
            Side::Local => Self::CopyToRepo,
            Side::Repo => Self::CopyToLocal,
        }
    }

    /// Side content is copied from, for copy actions
    #[must_use]
    pub const fn source_side(self) -> Option<Side> {
        match self {
            Self::CopyToRepo | Self::NewLocal => Some(Side::Local),
            Self::CopyToLocal | Self::NewRepo => Some(Side::Repo),
            _ => None,
        }
    }

    /// Side whose copy is removed, for delete actions
    #[must_use]
    pub const fn delete_target(self) -> Option<Side> {
        match self {
            Self::DeletedLocal => Some(Side::Repo),
            Self::DeletedRepo => Some(Side::Local),
            _ => None,
        }
    }

    /// Whether this is a copy action
    #[must_use]
    pub const fn is_copy(self) -> bool {
        self.source_side().is_some()
    }

    /// Whether this is a delete action
    #[must_use]
    pub const fn is_delete(self) -> bool {
        self.delete_target().is_some()
    }

    /// Whether executing this action changes anything
    #[must_use]
    pub const fn needs_action(self) -> bool {
        !matches!(self, Self::Unchanged | Self::Skip)
    }

    /// Human-readable direction of the action
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::CopyToRepo | Self::NewLocal | Self::DeletedLocal => "local → repo",
            Self::CopyToLocal | Self::NewRepo | Self::DeletedRepo => "repo → local",
            Self::Unchanged | Self::Conflict | Self::Skip => "-",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the ledger knew the item when the decision was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// A ledger entry existed
    #[default]
    Tracked,
    /// No ledger entry: the item is seen for the first time
    FirstContact,
}

/// Content observed on each side; `None` means the item is absent there
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// Local content hash
    pub local: Option<ContentHash>,
    /// Repository content hash
    pub repo: Option<ContentHash>,
}

impl Observation {
    /// Hash observed on `side`
    #[must_use]
    pub const fn get(&self, side: Side) -> Option<&ContentHash> {
        match side {
            Side::Local => self.local.as_ref(),
            Side::Repo => self.repo.as_ref(),
        }
    }
}

/// Outcome of [`classify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Chosen action
    pub action_type: ActionType,
    /// Why it was chosen
    pub reason: String,
    /// Whether a ledger entry existed
    pub provenance: Provenance,
}

fn capitalized(side: Side) -> &'static str {
    match side {
        Side::Local => "Local",
        Side::Repo => "Repo",
    }
}

/// Decide what to do with an item
///
/// A missing ledger entry counts as a change on both sides, so an item that
/// differs between sides on first contact is a conflict unless the mode has an
/// authoritative side.
#[must_use]
pub fn classify(
    observation: &Observation,
    last_hash: Option<&ContentHash>,
    mode: SyncMode,
) -> Decision {
    let provenance = if last_hash.is_some() {
        Provenance::Tracked
    } else {
        Provenance::FirstContact
    };
    let decide = |action_type, reason: String| Decision {
        action_type,
        reason,
        provenance,
    };

    match (observation.local.as_ref(), observation.repo.as_ref()) {
        (None, None) => decide(
            ActionType::Skip,
            "Item doesn't exist in either location".to_string(),
        ),
        (Some(_), None) => one_sided(Side::Local, last_hash.is_some(), mode, decide),
        (None, Some(_)) => one_sided(Side::Repo, last_hash.is_some(), mode, decide),
        (Some(local), Some(repo)) => {
            if local == repo {
                return decide(ActionType::Unchanged, "Content identical".to_string());
            }

            let changed = |hash: &ContentHash| last_hash.is_none_or(|last| last != hash);
            match (changed(local), changed(repo)) {
                (true, true) => match mode.authoritative() {
                    Some(winner) => decide(
                        ActionType::copy_from(winner),
                        format!(
                            "Both changed, preferring {winner} ({} mode)",
                            mode.as_str()
                        ),
                    ),
                    None => decide(
                        ActionType::Conflict,
                        "Both local and repo changed".to_string(),
                    ),
                },
                (true, false) => changed_on(Side::Local, mode, decide),
                (false, true) => changed_on(Side::Repo, mode, decide),
                // Both differ from each other yet neither differs from the ledger
                (false, false) => decide(ActionType::Unchanged, "No changes detected".to_string()),
            }
        }
    }
}

fn one_sided(
    present: Side,
    tracked: bool,
    mode: SyncMode,
    decide: impl Fn(ActionType, String) -> Decision,
) -> Decision {
    let absent = present.other();

    if tracked {
        if mode.authoritative() == Some(present) {
            decide(
                ActionType::new_from(present),
                format!("Re-create in {absent} ({} mode)", mode.as_str()),
            )
        } else {
            decide(
                ActionType::deleted_on(absent),
                format!("Deleted from {absent}"),
            )
        }
    } else if mode.authoritative() == Some(absent) {
        decide(
            ActionType::Skip,
            format!("New {present} item skipped ({} mode)", mode.as_str()),
        )
    } else {
        decide(
            ActionType::new_from(present),
            format!("New item in {present}"),
        )
    }
}

fn changed_on(
    side: Side,
    mode: SyncMode,
    decide: impl Fn(ActionType, String) -> Decision,
) -> Decision {
    if mode.allows_flow_from(side) {
        decide(
            ActionType::copy_from(side),
            format!("{} changed", capitalized(side)),
        )
    } else {
        decide(
            ActionType::Skip,
            format!("{} changed but {} mode", capitalized(side), mode.as_str()),
        )
    }
}

/// A synchronization action for one item
#[derive(Debug, Clone)]
pub struct SyncAction {
    /// The item acted on
    pub item: SyncItem,
    /// What to do
    pub action_type: ActionType,
    /// Copy source (copies only)
    pub source: Option<PathBuf>,
    /// Copy destination, or the path to remove for deletes
    pub dest: Option<PathBuf>,
    /// Why the action was chosen
    pub reason: String,
    /// Whether a ledger entry existed
    pub provenance: Provenance,
    /// Error encountered while deciding
    pub error: Option<String>,
}

impl SyncAction {
    /// Attach an item's paths to a classifier decision
    #[must_use]
    pub fn from_decision(item: SyncItem, decision: Decision) -> Self {
        let (source, dest) = if let Some(from) = decision.action_type.source_side() {
            (
                Some(item.path(from).to_path_buf()),
                Some(item.path(from.other()).to_path_buf()),
            )
        } else if let Some(target) = decision.action_type.delete_target() {
            (None, Some(item.path(target).to_path_buf()))
        } else {
            (None, None)
        };

        Self {
            item,
            action_type: decision.action_type,
            source,
            dest,
            reason: decision.reason,
            provenance: decision.provenance,
            error: None,
        }
    }

    /// The same item resolved by copying from `side`
    #[must_use]
    pub fn resolved_toward(&self, side: Side, reason: impl Into<String>) -> Self {
        Self::from_decision(
            self.item.clone(),
            Decision {
                action_type: ActionType::copy_from(side),
                reason: reason.into(),
                provenance: self.provenance,
            },
        )
    }

    /// Whether this was decided without a ledger entry
    #[must_use]
    pub fn is_first_contact(&self) -> bool {
        self.provenance == Provenance::FirstContact
    }
}

/// Observe an item on disk and classify it
///
/// A hashing failure yields [`ActionType::Skip`] with the error recorded.
#[must_use]
pub fn determine_action(
    item: SyncItem,
    last_hash: Option<&ContentHash>,
    mode: SyncMode,
) -> SyncAction {
    let observed = item
        .hash(Side::Local)
        .and_then(|local| Ok((local, item.hash(Side::Repo)?)));

    match observed {
        Ok((local, repo)) => {
            let decision = classify(&Observation { local, repo }, last_hash, mode);
            tracing::debug!(
                "{}:{} -> {} ({})",
                item.category,
                item.name,
                decision.action_type,
                decision.reason
            );
            SyncAction::from_decision(item, decision)
        }
        Err(e) => {
            tracing::warn!("Cannot inspect {}:{}: {e}", item.category, item.name);
            let provenance = if last_hash.is_some() {
                Provenance::Tracked
            } else {
                Provenance::FirstContact
            };
            let mut action = SyncAction::from_decision(
                item,
                Decision {
                    action_type: ActionType::Skip,
                    reason: "Could not read item".to_string(),
                    provenance,
                },
            );
            action.error = Some(e.to_string());
            action
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::content_hash;

    fn h(s: &str) -> ContentHash {
        content_hash(s.as_bytes())
    }

    fn obs(local: Option<&str>, repo: Option<&str>) -> Observation {
        Observation {
            local: local.map(h),
            repo: repo.map(h),
        }
    }

    fn action(o: &Observation, last: Option<&str>, mode: SyncMode) -> ActionType {
        let last = last.map(h);
        classify(o, last.as_ref(), mode).action_type
    }

    use ActionType::*;
    use SyncMode::{Bidirectional, LocalToRepo, RepoToLocal};

    #[test]
    fn test_neither_exists() {
        for mode in [Bidirectional, LocalToRepo, RepoToLocal] {
            assert_eq!(action(&obs(None, None), Some("x"), mode), Skip);
        }
    }

    #[test]
    fn test_local_only() {
        let o = obs(Some("a"), None);
        assert_eq!(action(&o, Some("a"), Bidirectional), DeletedRepo);
        assert_eq!(action(&o, Some("a"), RepoToLocal), DeletedRepo);
        assert_eq!(action(&o, Some("a"), LocalToRepo), NewLocal);
        assert_eq!(action(&o, None, Bidirectional), NewLocal);
        assert_eq!(action(&o, None, LocalToRepo), NewLocal);
        assert_eq!(action(&o, None, RepoToLocal), Skip);
    }

    #[test]
    fn test_repo_only() {
        let o = obs(None, Some("a"));
        assert_eq!(action(&o, Some("a"), Bidirectional), DeletedLocal);
        assert_eq!(action(&o, Some("a"), LocalToRepo), DeletedLocal);
        assert_eq!(action(&o, Some("a"), RepoToLocal), NewRepo);
        assert_eq!(action(&o, None, Bidirectional), NewRepo);
        assert_eq!(action(&o, None, RepoToLocal), NewRepo);
        assert_eq!(action(&o, None, LocalToRepo), Skip);
    }

    #[test]
    fn test_identical_is_unchanged_regardless_of_ledger() {
        let o = obs(Some("a"), Some("a"));
        for last in [None, Some("a"), Some("old")] {
            assert_eq!(action(&o, last, Bidirectional), Unchanged);
        }
    }

    #[test]
    fn test_one_side_changed() {
        let local_edit = obs(Some("new"), Some("base"));
        assert_eq!(action(&local_edit, Some("base"), Bidirectional), CopyToRepo);
        assert_eq!(action(&local_edit, Some("base"), LocalToRepo), CopyToRepo);
        assert_eq!(action(&local_edit, Some("base"), RepoToLocal), Skip);

        let repo_edit = obs(Some("base"), Some("new"));
        assert_eq!(action(&repo_edit, Some("base"), Bidirectional), CopyToLocal);
        assert_eq!(action(&repo_edit, Some("base"), RepoToLocal), CopyToLocal);
        assert_eq!(action(&repo_edit, Some("base"), LocalToRepo), Skip);
    }

    #[test]
    fn test_both_changed() {
        let o = obs(Some("l"), Some("r"));
        assert_eq!(action(&o, Some("base"), Bidirectional), Conflict);
        assert_eq!(action(&o, Some("base"), LocalToRepo), CopyToRepo);
        assert_eq!(action(&o, Some("base"), RepoToLocal), CopyToLocal);
    }

    #[test]
    fn test_first_contact_divergence_is_conflict() {
        let decision = classify(&obs(Some("l"), Some("r")), None, Bidirectional);
        assert_eq!(decision.action_type, Conflict);
        assert_eq!(decision.provenance, Provenance::FirstContact);

        let forced = classify(&obs(Some("l"), Some("r")), None, LocalToRepo);
        assert_eq!(forced.action_type, CopyToRepo);
        assert!(forced.reason.contains("preferring local (local_to_repo mode)"));
    }

    #[test]
    fn test_first_contact_symmetry() {
        for mode in [Bidirectional, LocalToRepo, RepoToLocal] {
            let mirrored = match mode {
                Bidirectional => Bidirectional,
                LocalToRepo => RepoToLocal,
                RepoToLocal => LocalToRepo,
            };
            for last in [None, Some("a")] {
                let left = action(&obs(Some("a"), None), last, mode);
                let right = action(&obs(None, Some("a")), last, mirrored);
                let mirror = |t: ActionType| match t {
                    NewLocal => NewRepo,
                    NewRepo => NewLocal,
                    DeletedLocal => DeletedRepo,
                    DeletedRepo => DeletedLocal,
                    CopyToRepo => CopyToLocal,
                    CopyToLocal => CopyToRepo,
                    other => other,
                };
                assert_eq!(mirror(left), right, "mode {mode:?} last {last:?}");
            }
        }
    }

    #[test]
    fn test_reasons() {
        let d = classify(&obs(Some("a"), None), None, Bidirectional);
        assert_eq!(d.reason, "New item in local");
        let d = classify(&obs(Some("a"), None), Some(&h("a")), Bidirectional);
        assert_eq!(d.reason, "Deleted from repo");
        let d = classify(&obs(Some("new"), Some("base")), Some(&h("base")), RepoToLocal);
        assert_eq!(d.reason, "Local changed but repo_to_local mode");
    }

    #[test]
    fn test_action_type_helpers() {
        assert_eq!(ActionType::copy_from(Side::Local), CopyToRepo);
        assert_eq!(NewRepo.source_side(), Some(Side::Repo));
        assert_eq!(DeletedLocal.delete_target(), Some(Side::Repo));
        assert!(!Conflict.is_copy());
        assert!(Conflict.needs_action());
        assert!(!Skip.needs_action());
        assert_eq!(DeletedRepo.as_str(), "deleted_repo");
        assert_eq!(ActionType::ALL.len(), 9);
    }
}
