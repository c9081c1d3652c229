//! Picks the configured group an entry belongs to by tag overlap.
//!
//! A group scores `-|tags|`, plus one for every entry tag it lists, minus one for every
//! entry tag it disallows. The best score starts at zero, so a group scoring exactly zero
//! is a winner unless another group scores strictly higher. Several winners leave the entry
//! uncategorized.

use tracing::error;

use crate::model::Entry;
use crate::settings::Group;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched(String),
    Ambiguous(Vec<String>),
    Unmatched,
}

pub fn score(entry: &Entry, group: &Group) -> i64 {
    let mut score = -(group.tags.len() as i64);
    for tag in &entry.tags {
        if group.tags.contains(tag) {
            score += 1;
        }
        if group.noallow.contains(tag) {
            score -= 1;
        }
    }
    score
}

/// Rank `groups` in configuration order; the winner list keeps that order.
pub fn select(entry: &Entry, groups: &[Group]) -> Classification {
    let mut best = 0;
    let mut winners: Vec<String> = Vec::new();

    for group in groups {
        let score = score(entry, group);
        if score > best {
            best = score;
            winners = vec![group.name.clone()];
        } else if score == best {
            winners.push(group.name.clone());
        }
    }

    match winners.len() {
        0 => Classification::Unmatched,
        1 => Classification::Matched(winners.remove(0)),
        _ => Classification::Ambiguous(winners),
    }
}

/// Set `entry.category` when exactly one group wins, logging the other outcomes.
pub fn classify(mut entry: Entry, groups: &[Group]) -> Entry {
    match select(&entry, groups) {
        Classification::Matched(name) => entry.category = Some(name),
        Classification::Ambiguous(names) => {
            error!(
                "Found multiple category for '{}' :: {}",
                entry.fullname,
                names.join(", ")
            );
        }
        Classification::Unmatched => {
            error!("Not found category for '{}'", entry.fullname);
        }
    }
    entry
}
