//! Clean flow: route loosely named entries into stash group folders.
//!
//! Only entries naming exactly one group take part. An entry whose group matches an
//! existing stash folder joins that folder; otherwise it becomes a candidate for a new
//! folder, created only when the candidate collects at least `threshold` entries.

use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use super::move_entries;
use crate::drive::{DriveError, RemoteStore};
use crate::model::{Entry, RemoteEntry, StashGroup};
use crate::progress::{BatchOutcome, ProgressReporter};
use crate::settings::CleanProfile;

pub const NEW_GROUP_COLOR: &str = "#9fe1e7";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Existing stash folders that received entries, largest first.
    pub old_groups: Vec<StashGroup>,
    /// Candidates that reached the threshold, largest first.
    pub new_groups: Vec<StashGroup>,
    /// Entries that take no part in this pass.
    pub dropped: Vec<Entry>,
}

impl Partition {
    pub fn old_entry_count(&self) -> usize {
        self.old_groups.iter().map(StashGroup::len).sum()
    }

    pub fn new_entry_count(&self) -> usize {
        self.new_groups.iter().map(StashGroup::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanChoice {
    OldOnly,
    NewOnly,
    Both,
}

impl CleanChoice {
    /// Read a menu answer; an empty answer picks `Both`.
    pub fn from_answer(answer: &str) -> Option<CleanChoice> {
        match answer.trim() {
            "1" => Some(CleanChoice::OldOnly),
            "2" => Some(CleanChoice::NewOnly),
            "" | "3" => Some(CleanChoice::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanOutcome {
    pub old_moves: BatchOutcome,
    pub new_moves: BatchOutcome,
    pub folders_created: usize,
    pub folders_failed: usize,
}

/// Stash folders keyed by name, in listing order. The first folder with a name wins.
fn stash_groups(stash: &[RemoteEntry]) -> (Vec<StashGroup>, HashMap<String, usize>) {
    let mut groups: Vec<StashGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for folder in stash {
        if index.contains_key(&folder.name) {
            warn!(
                "Stash holds more than one folder named '{}', keeping the first",
                folder.name
            );
            continue;
        }
        index.insert(folder.name.clone(), groups.len());
        groups.push(StashGroup::existing(&folder.id, &folder.name));
    }

    (groups, index)
}

pub fn partition(stash: &[RemoteEntry], entries: Vec<Entry>, threshold: usize) -> Partition {
    let (mut old_groups, old_index) = stash_groups(stash);
    let mut candidates: Vec<StashGroup> = Vec::new();
    let mut candidate_index: HashMap<String, usize> = HashMap::new();
    let mut dropped: Vec<Entry> = Vec::new();

    for entry in entries {
        let group = match entry.single_group() {
            Some(group) if !group.is_empty() => group.to_string(),
            _ => {
                dropped.push(entry);
                continue;
            }
        };

        if let Some(&i) = old_index.get(&group) {
            old_groups[i].entries.push(entry);
        } else {
            let i = *candidate_index.entry(group.clone()).or_insert_with(|| {
                candidates.push(StashGroup::candidate(&group));
                candidates.len() - 1
            });
            candidates[i].entries.push(entry);
        }
    }

    old_groups.retain(|g| !g.is_empty());
    old_groups.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut new_groups: Vec<StashGroup> = Vec::new();
    for candidate in candidates {
        if candidate.len() >= threshold {
            new_groups.push(candidate);
        } else {
            debug!(
                "Group '{}' has {} entries, below threshold {}",
                candidate.name,
                candidate.len(),
                threshold
            );
            dropped.extend(candidate.entries);
        }
    }
    new_groups.sort_by(|a, b| b.len().cmp(&a.len()));

    Partition {
        old_groups,
        new_groups,
        dropped,
    }
}

/// List the stash and every target, then partition what was found.
pub async fn plan(
    store: &dyn RemoteStore,
    profile: &CleanProfile,
    threshold: usize,
) -> Result<Partition, DriveError> {
    let stash = store.list(Some(&profile.stash.id), true).await?;
    info!("Found {} group(s).", stash.len());

    let total = profile.targets.len();
    let mut entries: Vec<Entry> = Vec::new();
    for (i, target) in profile.targets.iter().enumerate() {
        debug!("Getting files from target ({}/{}).", i + 1, total);
        let listed = store.list(Some(&target.id), true).await?;
        entries.extend(listed.iter().map(Entry::from));
    }
    info!("Found {} file(s).", entries.len());

    Ok(partition(&stash, entries, threshold))
}

pub async fn process_old_groups(
    store: &dyn RemoteStore,
    groups: &[StashGroup],
    reporter: &dyn ProgressReporter,
) -> BatchOutcome {
    info!("Working on old groups");
    let mut outcome = BatchOutcome::default();

    for group in groups {
        let Some(folder_id) = group.id.as_deref() else {
            error!("Group \"{}\" has no folder, skipping", group.name);
            outcome.failed += group.len();
            continue;
        };
        outcome.merge(move_entries(store, &group.entries, folder_id, &group.name, reporter).await);
    }

    outcome
}

/// Create a folder per candidate, then move its entries in. A candidate whose folder
/// cannot be created is skipped whole.
pub async fn process_new_groups(
    store: &dyn RemoteStore,
    groups: &[StashGroup],
    stash_id: &str,
    reporter: &dyn ProgressReporter,
) -> CleanOutcome {
    info!("Working on new groups");
    let mut outcome = CleanOutcome::default();

    for group in groups {
        info!("Group: \"{}\"", group.name);
        debug!("Creating folder \"{}\"", group.name);

        let folder = match store
            .create_folder(&group.name, Some(stash_id), Some(NEW_GROUP_COLOR))
            .await
        {
            Ok(folder) => folder,
            Err(err) => {
                error!("Error occurs when creating folder \"{}\": {}", group.name, err);
                outcome.folders_failed += 1;
                continue;
            }
        };
        outcome.folders_created += 1;

        let moved = move_entries(store, &group.entries, &folder.id, &folder.name, reporter).await;
        outcome.new_moves.merge(moved);
    }

    outcome
}

pub async fn execute(
    store: &dyn RemoteStore,
    partition: &Partition,
    stash_id: &str,
    choice: CleanChoice,
    reporter: &dyn ProgressReporter,
) -> CleanOutcome {
    let run_old = match choice {
        CleanChoice::OldOnly => true,
        CleanChoice::NewOnly => false,
        CleanChoice::Both => partition.old_entry_count() > 0,
    };
    let run_new = match choice {
        CleanChoice::OldOnly => false,
        CleanChoice::NewOnly => true,
        CleanChoice::Both => partition.new_entry_count() > 0,
    };

    let mut outcome = CleanOutcome::default();
    if run_old {
        outcome.old_moves = process_old_groups(store, &partition.old_groups, reporter).await;
    }
    if run_new {
        let created = process_new_groups(store, &partition.new_groups, stash_id, reporter).await;
        outcome.new_moves = created.new_moves;
        outcome.folders_created = created.folders_created;
        outcome.folders_failed = created.folders_failed;
    }
    outcome
}
