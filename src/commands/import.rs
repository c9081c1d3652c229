use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::drive::RemoteStore;
use crate::organize::import;
use crate::report::{self, CliReporter};
use crate::settings::Settings;
use crate::utils::prompt::prompt_confirm;

pub async fn run(config: &AppConfig) -> Result<()> {
    let settings = super::load_settings(config)?;
    settings.import_target()?;
    let drive = super::connect(config).await?;
    run_with(&drive, &settings).await
}

pub async fn run_with(store: &dyn RemoteStore, settings: &Settings) -> Result<()> {
    let target = settings.import_target()?;
    let plan = import::plan(store, target, &settings.groups)
        .await
        .with_context(|| format!("Cannot list import target '{}'", target.display_name()))?;

    if plan.is_empty() {
        return Ok(());
    }

    print!("{}", report::render_import_plan(&plan));

    if plan.categories.is_empty() || !prompt_confirm("Process?", Some(true))? {
        return Ok(());
    }

    let outcome = import::execute(store, &plan, settings, &CliReporter::new()).await;
    info!(
        "Import done: {} moved, {} failed, {} group(s) skipped",
        outcome.moves.succeeded,
        outcome.moves.failed,
        outcome.skipped_groups.len()
    );
    Ok(())
}
