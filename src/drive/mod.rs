pub mod auth;
pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::RemoteEntry;

pub use client::GoogleDrive;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations the organizer needs from a hierarchical file store.
///
/// Listing calls exclude trashed items and return every page.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(
        &self,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Result<Vec<RemoteEntry>, DriveError>;

    /// Like `list`, keeping only entries named exactly `name`.
    async fn find(
        &self,
        name: &str,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Result<Vec<RemoteEntry>, DriveError>;

    async fn move_entry(
        &self,
        file_id: &str,
        add_parent: Option<&str>,
        remove_parent: Option<&str>,
    ) -> Result<(), DriveError>;

    /// Soft delete.
    async fn remove(&self, file_id: &str) -> Result<(), DriveError>;

    async fn rename(&self, file_id: &str, new_name: &str) -> Result<(), DriveError>;

    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        color: Option<&str>,
    ) -> Result<RemoteEntry, DriveError>;
}
