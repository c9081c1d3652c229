//! Google Drive v3 client over plain REST calls.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use super::{DriveError, RemoteStore, FOLDER_MIME_TYPE};
use crate::model::RemoteEntry;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const USER_AGENT: &str = concat!("gman/", env!("CARGO_PKG_VERSION"));
const LIST_FIELDS: &str = "nextPageToken, files(id, name, parents, createdTime, modifiedTime)";
const CREATE_FIELDS: &str = "id, name, mimeType, parents";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteEntry>,
    next_page_token: Option<String>,
}

pub struct GoogleDrive {
    http: reqwest::Client,
    access_token: String,
    page_size: u32,
}

impl GoogleDrive {
    pub fn new(access_token: &str, page_size: u32) -> Result<Self, DriveError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            access_token: access_token.to_string(),
            page_size,
        })
    }

    async fn list_pages(&self, query: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        collect_pages(|page_token| self.fetch_page(query, page_token)).await
    }

    async fn fetch_page(
        &self,
        query: &str,
        page_token: Option<String>,
    ) -> Result<FileList, DriveError> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("spaces", "drive".to_string()),
            ("pageSize", self.page_size.to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ];
        if let Some(token) = &page_token {
            params.push(("pageToken", token.clone()));
        }

        debug!(query = %query, page = ?page_token, "Listing drive files");

        let response = self
            .http
            .get(FILES_URL)
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update(
        &self,
        file_id: &str,
        params: &[(&str, &str)],
        body: serde_json::Value,
    ) -> Result<(), DriveError> {
        let url = format!("{}/{}", FILES_URL, file_id);
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.access_token)
            .query(params)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for GoogleDrive {
    async fn list(
        &self,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Result<Vec<RemoteEntry>, DriveError> {
        self.list_pages(&build_query(parent_id, only_folder, None))
            .await
    }

    async fn find(
        &self,
        name: &str,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Result<Vec<RemoteEntry>, DriveError> {
        self.list_pages(&build_query(parent_id, only_folder, Some(name)))
            .await
    }

    async fn move_entry(
        &self,
        file_id: &str,
        add_parent: Option<&str>,
        remove_parent: Option<&str>,
    ) -> Result<(), DriveError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(add) = add_parent {
            params.push(("addParents", add));
        }
        if let Some(remove) = remove_parent {
            params.push(("removeParents", remove));
        }
        self.update(file_id, &params, json!({})).await
    }

    async fn remove(&self, file_id: &str) -> Result<(), DriveError> {
        self.update(file_id, &[], json!({ "trashed": true })).await
    }

    async fn rename(&self, file_id: &str, new_name: &str) -> Result<(), DriveError> {
        self.update(file_id, &[], json!({ "name": new_name })).await
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        color: Option<&str>,
    ) -> Result<RemoteEntry, DriveError> {
        let mut metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
        });
        if let Some(parent) = parent_id {
            metadata["parents"] = json!([parent]);
        }
        if let Some(color) = color {
            metadata["folderColorRgb"] = json!(color);
        }

        let response = self
            .http
            .post(FILES_URL)
            .bearer_auth(&self.access_token)
            .query(&[("fields", CREATE_FIELDS)])
            .json(&metadata)
            .send()
            .await?;
        let folder: RemoteEntry = check_status(response).await?.json().await?;
        Ok(folder)
    }
}

/// Fetch pages until one comes back without a continuation token, keeping page order.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<RemoteEntry>, DriveError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<FileList, DriveError>>,
{
    let mut files: Vec<RemoteEntry> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch(page_token.take()).await?;
        files.extend(page.files);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(files)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(DriveError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Build a Drive search expression.
pub fn build_query(parent_id: Option<&str>, only_folder: bool, name: Option<&str>) -> String {
    let mut query = String::from("trashed = false");
    if let Some(parent) = parent_id {
        query.push_str(&format!(" and '{}' in parents", escape(parent)));
    }
    if only_folder {
        query.push_str(&format!(" and mimeType = '{}'", FOLDER_MIME_TYPE));
    }
    if let Some(name) = name {
        query.push_str(&format!(" and name = '{}'", escape(name)));
    }
    query
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
