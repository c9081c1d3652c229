#![allow(dead_code)]

use async_trait::async_trait;
use gman::drive::{DriveError, RemoteStore};
use gman::model::RemoteEntry;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct Node {
    entry: RemoteEntry,
    folder: bool,
    trashed: bool,
    color: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<Node>,
    fail_moves: HashSet<String>,
    fail_creates: HashSet<String>,
    calls: Vec<String>,
    next_id: usize,
}

/// In-process store with just enough behavior for the organizer.
#[derive(Debug, Default)]
pub struct MemoryDrive {
    state: Mutex<State>,
}

fn failure(what: &str) -> DriveError {
    DriveError::Api {
        status: 500,
        message: format!("{} failed", what),
    }
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(&self, id: &str, name: &str, parent: &str) -> &Self {
        self.insert(id, name, parent, true);
        self
    }

    pub fn file(&self, id: &str, name: &str, parent: &str) -> &Self {
        self.insert(id, name, parent, false);
        self
    }

    fn insert(&self, id: &str, name: &str, parent: &str, folder: bool) {
        let mut state = self.state.lock().unwrap();
        state.nodes.push(Node {
            entry: RemoteEntry {
                id: id.to_string(),
                name: name.to_string(),
                parents: vec![parent.to_string()],
                created_at: None,
                modified_at: None,
            },
            folder,
            trashed: false,
            color: None,
        });
    }

    pub fn fail_move(&self, id: &str) {
        self.state.lock().unwrap().fail_moves.insert(id.to_string());
    }

    pub fn fail_create(&self, name: &str) {
        self.state.lock().unwrap().fail_creates.insert(name.to_string());
    }

    pub fn parents(&self, id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .iter()
            .find(|n| n.entry.id == id)
            .map(|n| n.entry.parents.clone())
            .unwrap_or_default()
    }

    pub fn is_trashed(&self, id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.nodes.iter().any(|n| n.entry.id == id && n.trashed)
    }

    /// Folders with this name, as (id, parent, color).
    pub fn folders_named(&self, name: &str) -> Vec<(String, String, Option<String>)> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .iter()
            .filter(|n| n.folder && n.entry.name == name)
            .map(|n| {
                (
                    n.entry.id.clone(),
                    n.entry.parents.first().cloned().unwrap_or_default(),
                    n.color.clone(),
                )
            })
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn listing(
        &self,
        name: Option<&str>,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Vec<RemoteEntry> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .iter()
            .filter(|n| !n.trashed)
            .filter(|n| !only_folder || n.folder)
            .filter(|n| parent_id.map_or(true, |p| n.entry.is_child_of(p)))
            .filter(|n| name.map_or(true, |name| n.entry.name == name))
            .map(|n| n.entry.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteStore for MemoryDrive {
    async fn list(
        &self,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Result<Vec<RemoteEntry>, DriveError> {
        Ok(self.listing(None, parent_id, only_folder))
    }

    async fn find(
        &self,
        name: &str,
        parent_id: Option<&str>,
        only_folder: bool,
    ) -> Result<Vec<RemoteEntry>, DriveError> {
        Ok(self.listing(Some(name), parent_id, only_folder))
    }

    async fn move_entry(
        &self,
        file_id: &str,
        add_parent: Option<&str>,
        remove_parent: Option<&str>,
    ) -> Result<(), DriveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("move {}", file_id));
        if state.fail_moves.contains(file_id) {
            return Err(failure("move"));
        }
        let node = state
            .nodes
            .iter_mut()
            .find(|n| n.entry.id == file_id)
            .ok_or_else(|| failure("lookup"))?;
        if let Some(remove) = remove_parent {
            node.entry.parents.retain(|p| p != remove);
        }
        if let Some(add) = add_parent {
            node.entry.parents.push(add.to_string());
        }
        Ok(())
    }

    async fn remove(&self, file_id: &str) -> Result<(), DriveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("remove {}", file_id));
        let node = state
            .nodes
            .iter_mut()
            .find(|n| n.entry.id == file_id)
            .ok_or_else(|| failure("lookup"))?;
        node.trashed = true;
        Ok(())
    }

    async fn rename(&self, file_id: &str, new_name: &str) -> Result<(), DriveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("rename {}", file_id));
        let node = state
            .nodes
            .iter_mut()
            .find(|n| n.entry.id == file_id)
            .ok_or_else(|| failure("lookup"))?;
        node.entry.name = new_name.to_string();
        Ok(())
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        color: Option<&str>,
    ) -> Result<RemoteEntry, DriveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create {}", name));
        if state.fail_creates.contains(name) {
            return Err(failure("create"));
        }
        state.next_id += 1;
        let entry = RemoteEntry {
            id: format!("new-{}", state.next_id),
            name: name.to_string(),
            parents: parent_id.map(|p| vec![p.to_string()]).unwrap_or_default(),
            created_at: None,
            modified_at: None,
        };
        state.nodes.push(Node {
            entry: entry.clone(),
            folder: true,
            trashed: false,
            color: color.map(str::to_string),
        });
        Ok(entry)
    }
}
