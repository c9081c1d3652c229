use std::path::PathBuf;
use thiserror::Error;

use crate::drive::DriveError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Cannot find profile: {0}")]
    ProfileNotFound(String),

    #[error("Settings have no '{0}' section")]
    MissingSection(&'static str),

    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("Group error: {0}")]
    Group(#[from] GroupError),

    #[error("{0}")]
    Other(String),
}

/// Failure to read the settings document, keeping "not there" apart from "not valid".
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings file {} not found", .0.display())]
    Absent(PathBuf),

    #[error("settings file {} is not valid: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write settings file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GroupError {
    #[error("found 0 group with name '{0}'")]
    NotFound(String),

    #[error("found {count} groups with name '{name}'")]
    Duplicate { name: String, count: usize },

    #[error("group '{0}' has no remote folder id")]
    NoFolder(String),

    #[error("group name must not be empty")]
    EmptyName,
}
