//! Append flow: fold duplicated folders back into their originals.
//!
//! Every folder directly under the root is a duplicate ("append") of a same-named folder
//! elsewhere in the store ("origin"). Only a unique origin forms a pair.

use tracing::{debug, error, info, warn};

use crate::drive::{DriveError, RemoteStore};
use crate::model::RemoteEntry;
use crate::progress::{BatchOutcome, ProgressReporter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePair {
    pub origin: RemoteEntry,
    pub append: RemoteEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginMatch {
    Unique(RemoteEntry),
    Ambiguous(usize),
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupPlan {
    pub candidates: usize,
    pub pairs: Vec<MergePair>,
    /// Names that had no origin or more than one.
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub moves: BatchOutcome,
    pub removed: usize,
    /// Duplicates left in place because moving their content failed somewhere.
    pub kept: usize,
}

/// Pick the origin of `append` among same-named folders, ignoring the root's children.
pub fn resolve_origin(root_id: &str, append: &RemoteEntry, found: Vec<RemoteEntry>) -> OriginMatch {
    let mut origins: Vec<RemoteEntry> = found
        .into_iter()
        .filter(|f| f.name == append.name && !f.is_child_of(root_id))
        .collect();

    match origins.len() {
        0 => OriginMatch::Missing,
        1 => OriginMatch::Unique(origins.remove(0)),
        n => OriginMatch::Ambiguous(n),
    }
}

pub async fn plan(store: &dyn RemoteStore, root_id: &str) -> Result<DedupPlan, DriveError> {
    let appends = store.list(Some(root_id), true).await?;
    info!("Found {} entries.", appends.len());

    let mut plan = DedupPlan {
        candidates: appends.len(),
        ..DedupPlan::default()
    };

    for append in appends {
        let found = store.find(&append.name, None, true).await?;
        match resolve_origin(root_id, &append, found) {
            OriginMatch::Unique(origin) => {
                info!("Found origin of '{}'", append.name);
                plan.pairs.push(MergePair { origin, append });
            }
            OriginMatch::Ambiguous(count) => {
                error!("Found {} entries for '{}'. So ignore it.", count, append.name);
                plan.skipped.push(append.name);
            }
            OriginMatch::Missing => {
                error!("Can't process '{}'", append.name);
                plan.skipped.push(append.name);
            }
        }
    }

    Ok(plan)
}

/// Move everything inside the duplicate into the origin, then trash the duplicate.
///
/// The duplicate is only trashed when every item moved, so nothing is trashed with it.
pub async fn merge_pair(
    store: &dyn RemoteStore,
    pair: &MergePair,
    reporter: &dyn ProgressReporter,
) -> Result<MergeOutcome, DriveError> {
    let MergePair { origin, append } = pair;
    let items = store.list(Some(&append.id), false).await?;
    info!("Found {} items in {}.", items.len(), append.name);

    let total = items.len();
    let mut outcome = MergeOutcome::default();
    reporter.on_batch_start(&origin.name, total);

    for (i, item) in items.iter().enumerate() {
        debug!("Moving items in '{}' ({}/{})", origin.name, i + 1, total);
        let result = store
            .move_entry(&item.id, Some(&origin.id), Some(&append.id))
            .await;
        if let Err(err) = &result {
            error!("Error occurs when moving \"{}\": {}", item.name, err);
        }
        outcome.moves.record(&result);
        reporter.on_item(i + 1, total);
    }
    reporter.on_batch_complete(&origin.name, &outcome.moves);

    if outcome.moves.failed > 0 {
        warn!(
            "Keeping '{}': {} item(s) could not be moved",
            append.name, outcome.moves.failed
        );
        outcome.kept += 1;
        return Ok(outcome);
    }

    debug!("Removing {}", append.name);
    match store.remove(&append.id).await {
        Ok(()) => outcome.removed += 1,
        Err(err) => {
            error!("Error occurs when removing \"{}\": {}", append.name, err);
            outcome.kept += 1;
        }
    }

    Ok(outcome)
}

/// Merge every pair. A pair whose content cannot be listed is logged and skipped.
pub async fn execute(
    store: &dyn RemoteStore,
    plan: &DedupPlan,
    reporter: &dyn ProgressReporter,
) -> MergeOutcome {
    info!("Moving items to origin folder");
    let mut total = MergeOutcome::default();

    for pair in &plan.pairs {
        match merge_pair(store, pair, reporter).await {
            Ok(outcome) => {
                total.moves.merge(outcome.moves);
                total.removed += outcome.removed;
                total.kept += outcome.kept;
            }
            Err(err) => {
                error!("Error occurs when listing \"{}\": {}", pair.append.name, err);
                total.kept += 1;
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, name: &str, parent: &str) -> RemoteEntry {
        RemoteEntry {
            id: id.to_string(),
            name: name.to_string(),
            parents: vec![parent.to_string()],
            created_at: None,
            modified_at: None,
        }
    }

    #[test]
    fn test_unique_origin_outside_root() {
        let append = folder("a", "Vacation", "root");
        let found = vec![append.clone(), folder("o", "Vacation", "photos")];
        assert_eq!(
            resolve_origin("root", &append, found),
            OriginMatch::Unique(folder("o", "Vacation", "photos"))
        );
    }

    #[test]
    fn test_two_origins_are_ambiguous() {
        let append = folder("a", "Vacation", "root");
        let found = vec![
            append.clone(),
            folder("o1", "Vacation", "photos"),
            folder("o2", "Vacation", "archive"),
        ];
        assert_eq!(resolve_origin("root", &append, found), OriginMatch::Ambiguous(2));
    }

    #[test]
    fn test_no_origin_when_only_root_children_match() {
        let append = folder("a", "Vacation", "root");
        let found = vec![append.clone(), folder("b", "Vacation", "root")];
        assert_eq!(resolve_origin("root", &append, found), OriginMatch::Missing);
    }

    #[test]
    fn test_other_names_are_ignored() {
        let append = folder("a", "Vacation", "root");
        let found = vec![folder("o", "vacation", "photos")];
        assert_eq!(resolve_origin("root", &append, found), OriginMatch::Missing);
    }
}
