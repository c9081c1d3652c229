//! Console rendering of plans and batch progress.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use std::sync::Mutex;

use crate::model::{Entry, StashGroup};
use crate::organize::dedup::DedupPlan;
use crate::organize::import::ImportPlan;
use crate::organize::reconcile::Partition;
use crate::progress::{BatchOutcome, ProgressReporter};
use crate::settings::Group;

pub fn render_import_plan(plan: &ImportPlan) -> String {
    let mut out = String::new();
    for category in &plan.categories {
        let _ = writeln!(out, "Group {}:", category.name.bold());
        render_entries(&mut out, &category.entries);
        out.push('\n');
    }
    if !plan.uncategorized.is_empty() {
        let _ = writeln!(out, "{}", "No-group:".yellow());
        render_entries(&mut out, &plan.uncategorized);
        out.push('\n');
    }
    out
}

fn render_entries(out: &mut String, entries: &[Entry]) {
    for entry in entries {
        let _ = writeln!(out, "++ {}", entry.fullname);
    }
}

pub fn render_partition(partition: &Partition) -> String {
    let mut out = String::new();

    let old_count = partition.old_entry_count();
    if old_count > 0 {
        let _ = writeln!(
            out,
            "\nWe found {} files for {} old groups.",
            old_count.to_string().green(),
            partition.old_groups.len()
        );
        render_groups(&mut out, &partition.old_groups);
    }

    let new_count = partition.new_entry_count();
    if new_count > 0 {
        let _ = writeln!(
            out,
            "\nWe found {} files for {} new groups.",
            new_count.to_string().cyan(),
            partition.new_groups.len()
        );
        render_groups(&mut out, &partition.new_groups);
    }

    out
}

fn render_groups(out: &mut String, groups: &[StashGroup]) {
    for group in groups {
        let _ = writeln!(out, "+ {} ({} entries).", group.name.bold(), group.len());
        for entry in &group.entries {
            let _ = writeln!(out, "    {}", entry.fullname);
        }
    }
}

pub fn render_clean_menu() -> String {
    [
        "\nWhatcha you want to do?",
        "1. Process old groups only",
        "2. Process new groups only",
        "3. Process all",
    ]
    .join("\n")
}

pub fn render_dedup_plan(plan: &DedupPlan) -> String {
    let mut out = String::new();
    for pair in &plan.pairs {
        let _ = writeln!(
            out,
            "{} {} -> {}",
            "merge".green(),
            pair.append.name,
            pair.origin.id.dimmed()
        );
    }
    for name in &plan.skipped {
        let _ = writeln!(out, "{} {}", "skip".red(), name);
    }
    out
}

pub fn render_group(group: &Group) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", group.name.bold());
    let _ = writeln!(out, "  id:      {}", group.id.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "  tags:    {}", group.tags.join(", "));
    let _ = writeln!(out, "  noallow: {}", group.noallow.join(", "));
    out
}

pub fn render_group_list(groups: &[Group]) -> String {
    let mut out = String::new();
    for (i, group) in groups.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} [{}]",
            i + 1,
            group.name.bold(),
            group.tags.join("; ")
        );
    }
    out
}

/// CLI progress reporter using an indicatif bar per batch.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut guard) = self.bar.lock() {
            f(&mut guard);
        }
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliReporter {
    fn on_batch_start(&self, label: &str, total: usize) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {pos}/{len}",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(label.to_string());
        self.with_bar(|slot| {
            if let Some(old) = slot.replace(pb) {
                old.finish_and_clear();
            }
        });
    }

    fn on_item(&self, done: usize, _total: usize) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.as_ref() {
                pb.set_position(done as u64);
            }
        });
    }

    fn on_batch_complete(&self, label: &str, outcome: &BatchOutcome) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        });
        let mark = if outcome.failed == 0 {
            "✓".green()
        } else {
            "✗".red()
        };
        eprintln!(
            "  {} {}: {} moved, {} failed",
            mark, label, outcome.succeeded, outcome.failed
        );
    }
}
