use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file or folder as the remote store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(rename = "createdTime", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "modifiedTime", default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl RemoteEntry {
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn is_child_of(&self, parent_id: &str) -> bool {
        self.parents.iter().any(|p| p == parent_id)
    }
}

/// A remote entry plus the facets derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub fullname: String,
    pub parent: Option<String>,
    pub name: String,
    pub tags: Vec<String>,
    /// May hold a compound token followed by its split parts, so the length is meaningful.
    pub groups: Vec<String>,
    pub category: Option<String>,
}

impl Entry {
    /// The derived group when the entry names exactly one.
    pub fn single_group(&self) -> Option<&str> {
        match self.groups.as_slice() {
            [group] => Some(group.as_str()),
            _ => None,
        }
    }
}

impl From<&RemoteEntry> for Entry {
    fn from(remote: &RemoteEntry) -> Self {
        crate::organize::parser::parse_entry(
            &remote.id,
            &remote.name,
            remote.first_parent().map(str::to_string),
        )
    }
}

/// A folder under the stash (or a candidate for one) with the entries routed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashGroup {
    pub name: String,
    /// `None` until the folder is created in the store.
    pub id: Option<String>,
    pub entries: Vec<Entry>,
}

impl StashGroup {
    pub fn existing(id: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: Some(id.to_string()),
            entries: Vec::new(),
        }
    }

    pub fn candidate(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
