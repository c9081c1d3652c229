pub mod append;
pub mod clean;
pub mod groups;
pub mod import;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::AppConfig;
use crate::drive::auth::{self, OAuth2};
use crate::drive::GoogleDrive;
use crate::settings::Settings;

/// Authorize against Google and open a Drive client.
pub async fn connect(config: &AppConfig) -> Result<GoogleDrive> {
    let credentials_path = config.credentials_path();
    let credentials = auth::load_credentials(&credentials_path)
        .with_context(|| format!("Cannot load credentials from {}", credentials_path.display()))?;

    let oauth = OAuth2::new(credentials)?;
    let token = oauth
        .authorize(
            &config.google.scopes,
            &config.token_path(),
            &config.data_path(&config.google.token),
        )
        .await
        .context("Authorization failed")?;

    debug!("Authorized, page size {}", config.drive.search_page_size);
    Ok(GoogleDrive::new(
        &token.access_token,
        config.drive.search_page_size,
    )?)
}

pub fn load_settings(config: &AppConfig) -> Result<Settings> {
    Ok(Settings::load(&config.settings_path())?)
}
