//! Import flow: sort freshly uploaded folders into configured groups.

use tracing::{error, info};

use super::classifier::classify;
use super::move_entries;
use crate::drive::{DriveError, RemoteStore};
use crate::error::GroupError;
use crate::model::Entry;
use crate::progress::{BatchOutcome, ProgressReporter};
use crate::settings::{Group, Settings, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// In order of first appearance.
    pub categories: Vec<Category>,
    pub uncategorized: Vec<Entry>,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.uncategorized.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub moves: BatchOutcome,
    pub skipped_groups: Vec<String>,
}

pub fn categorize(entries: Vec<Entry>, groups: &[Group]) -> ImportPlan {
    let mut plan = ImportPlan::default();

    for entry in entries {
        let entry = classify(entry, groups);
        let Some(category) = entry.category.clone() else {
            plan.uncategorized.push(entry);
            continue;
        };
        match plan.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.entries.push(entry),
            None => plan.categories.push(Category {
                name: category,
                entries: vec![entry],
            }),
        }
    }

    plan
}

pub async fn plan(
    store: &dyn RemoteStore,
    target: &Target,
    groups: &[Group],
) -> Result<ImportPlan, DriveError> {
    let listed = store.list(Some(&target.id), true).await?;
    if listed.is_empty() {
        info!("Found 0 entries in '{}'", target.display_name());
    }
    Ok(categorize(listed.iter().map(Entry::from).collect(), groups))
}

fn destination<'a>(settings: &'a Settings, name: &str) -> Result<(&'a Group, &'a str), GroupError> {
    let group = settings.group(name)?;
    let folder_id = group
        .id
        .as_deref()
        .ok_or_else(|| GroupError::NoFolder(name.to_string()))?;
    Ok((group, folder_id))
}

pub async fn execute(
    store: &dyn RemoteStore,
    plan: &ImportPlan,
    settings: &Settings,
    reporter: &dyn ProgressReporter,
) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for category in &plan.categories {
        let (group, folder_id) = match destination(settings, &category.name) {
            Ok(found) => found,
            Err(err) => {
                error!("Cannot import into '{}': {}", category.name, err);
                outcome.skipped_groups.push(category.name.clone());
                continue;
            }
        };
        let moved = move_entries(store, &category.entries, folder_id, &group.name, reporter).await;
        outcome.moves.merge(moved);
    }

    outcome
}
