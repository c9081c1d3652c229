use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::drive::RemoteStore;
use crate::organize::dedup;
use crate::report::{self, CliReporter};
use crate::settings::Settings;
use crate::utils::prompt::prompt_confirm;

pub async fn run(config: &AppConfig) -> Result<()> {
    let settings = super::load_settings(config)?;
    settings.append_target()?;
    let drive = super::connect(config).await?;
    run_with(&drive, &settings).await
}

pub async fn run_with(store: &dyn RemoteStore, settings: &Settings) -> Result<()> {
    let target = settings.append_target()?;
    let plan = dedup::plan(store, &target.id)
        .await
        .with_context(|| format!("Cannot search duplicates of '{}'", target.display_name()))?;

    if plan.pairs.is_empty() {
        info!("Nothing to merge.");
        return Ok(());
    }

    print!("{}", report::render_dedup_plan(&plan));

    if !prompt_confirm("Process?", Some(true))? {
        return Ok(());
    }

    let outcome = dedup::execute(store, &plan, &CliReporter::new()).await;
    info!(
        "Append done: {} moved, {} failed, {} folder(s) removed, {} kept",
        outcome.moves.succeeded, outcome.moves.failed, outcome.removed, outcome.kept
    );
    Ok(())
}
