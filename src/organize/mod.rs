pub mod classifier;
pub mod dedup;
pub mod import;
pub mod parser;
pub mod reconcile;

use tracing::{debug, error};

use crate::drive::RemoteStore;
use crate::model::Entry;
use crate::progress::{BatchOutcome, ProgressReporter};

/// Move every entry into `folder_id`, detaching it from its current parent.
/// A failed move is logged and the batch carries on.
pub(crate) async fn move_entries(
    store: &dyn RemoteStore,
    entries: &[Entry],
    folder_id: &str,
    folder_name: &str,
    reporter: &dyn ProgressReporter,
) -> BatchOutcome {
    let total = entries.len();
    let mut outcome = BatchOutcome::default();
    reporter.on_batch_start(folder_name, total);

    for (i, entry) in entries.iter().enumerate() {
        debug!("Moving \"{}\" to \"{}\"", entry.fullname, folder_name);
        let result = store
            .move_entry(&entry.id, Some(folder_id), entry.parent.as_deref())
            .await;
        if let Err(err) = &result {
            error!("Error occurs when moving \"{}\": {}", entry.fullname, err);
        }
        outcome.record(&result);
        reporter.on_item(i + 1, total);
    }

    reporter.on_batch_complete(folder_name, &outcome);
    outcome
}
