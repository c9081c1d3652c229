use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CleanArgs;
use crate::config::AppConfig;
use crate::drive::RemoteStore;
use crate::organize::reconcile::{self, CleanChoice};
use crate::report::{self, CliReporter};
use crate::settings::CleanProfile;
use crate::utils::prompt::prompt_line;

pub async fn run(config: &AppConfig, args: &CleanArgs) -> Result<()> {
    let settings = super::load_settings(config)?;
    let profile = settings.clean_profile(&args.profile)?;
    let threshold = profile.threshold(args.threshold);
    let drive = super::connect(config).await?;
    run_with(&drive, profile, threshold).await
}

pub async fn run_with(
    store: &dyn RemoteStore,
    profile: &CleanProfile,
    threshold: usize,
) -> Result<()> {
    info!("Cleaning with threshold {}", threshold);
    let partition = reconcile::plan(store, profile, threshold)
        .await
        .context("Cannot list stash or targets")?;

    if partition.old_entry_count() == 0 && partition.new_entry_count() == 0 {
        info!("Nothing to clean.");
        return Ok(());
    }

    print!("{}", report::render_partition(&partition));
    println!("{}", report::render_clean_menu());

    let answer = prompt_line("Choose 1 2 or [3]: ")?;
    let Some(choice) = CleanChoice::from_answer(&answer) else {
        println!("Wrong answer!");
        return Ok(());
    };

    let outcome = reconcile::execute(
        store,
        &partition,
        &profile.stash.id,
        choice,
        &CliReporter::new(),
    )
    .await;
    info!(
        "Clean done: {} moved into old groups, {} into new groups, {} folder(s) created, {} failed",
        outcome.old_moves.succeeded,
        outcome.new_moves.succeeded,
        outcome.folders_created,
        outcome.folders_failed
    );
    Ok(())
}
