use config::{Config, Environment, File as ConfigFile, FileFormat};
use serde_json::{Map, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Error;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/gman/config.json";
const DEFAULT_DATA_DIR: &str = "/etc/gman";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub settings: String,
    pub google: GoogleConfig,
    pub drive: DriveConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GoogleConfig {
    pub credentials: String,
    pub token: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DriveConfig {
    pub search_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            settings: "settings.json".to_string(),
            google: GoogleConfig {
                credentials: "credentials.json".to_string(),
                token: "token.json".to_string(),
                scopes: vec![
                    "https://www.googleapis.com/auth/photoslibrary".to_string(),
                    "https://www.googleapis.com/auth/drive.metadata.readonly".to_string(),
                    "https://www.googleapis.com/auth/drive".to_string(),
                    "profile".to_string(),
                ],
            },
            drive: DriveConfig {
                search_page_size: 100,
            },
        }
    }
}

impl AppConfig {
    /// Use `file` as given when it exists, otherwise look for it under the data directory.
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.exists() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn data_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.resolve(&self.settings)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.resolve(&self.google.credentials)
    }

    pub fn token_path(&self) -> PathBuf {
        self.resolve(&self.google.token)
    }
}

/// Load the configuration from defaults, the file at `path` and `GMAN_*` variables.
/// A missing file is first created with the defaults.
pub fn load_configuration(path: &Path) -> Result<AppConfig, Error> {
    if !path.exists() {
        write_defaults(path)?;
    }
    let text = upgrade_legacy_keys(&fs::read_to_string(path)?, path);

    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
        .set_default("settings", defaults.settings)?
        .set_default("google.credentials", defaults.google.credentials)?
        .set_default("google.token", defaults.google.token)?
        .set_default("google.scopes", defaults.google.scopes)?
        .set_default("drive.search_page_size", defaults.drive.search_page_size as i64)?
        .add_source(ConfigFile::from_str(&text, FileFormat::Json))
        .add_source(
            Environment::with_prefix("GMAN")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(builder.try_deserialize::<AppConfig>()?)
}

/// Earlier releases wrote `dataDir` and `drive.searchPageSize`. Move them to the current
/// keys unless the current key is already present. Text that is not a JSON object is left
/// for the config loader to reject.
fn upgrade_legacy_keys(text: &str, path: &Path) -> String {
    let Ok(mut doc) = serde_json::from_str::<Value>(text) else {
        return text.to_string();
    };
    let Some(root) = doc.as_object_mut() else {
        return text.to_string();
    };

    let mut renamed: Vec<&str> = Vec::new();
    if rename_key(root, "dataDir", "data_dir") {
        renamed.push("dataDir");
    }
    if let Some(drive) = root.get_mut("drive").and_then(Value::as_object_mut) {
        if rename_key(drive, "searchPageSize", "search_page_size") {
            renamed.push("drive.searchPageSize");
        }
    }

    if renamed.is_empty() {
        return text.to_string();
    }
    warn!(
        "{} uses old key(s) {}, please rename them to snake_case",
        path.display(),
        renamed.join(", ")
    );
    doc.to_string()
}

fn rename_key(map: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    match map.remove(from) {
        Some(value) => {
            map.entry(to.to_string()).or_insert(value);
            true
        }
        None => false,
    }
}

fn write_defaults(path: &Path) -> Result<(), Error> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let text = serde_json::to_string_pretty(&AppConfig::default())
        .map_err(|e| Error::Other(format!("cannot encode default configuration: {}", e)))?;
    fs::write(path, text)?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gman").join("config.json");

        let config = load_configuration(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.settings, "settings.json");
        assert_eq!(config.drive.search_page_size, 100);
        assert_eq!(config.google.scopes.len(), 4);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "data_dir": "/srv/gman", "drive": { "search_page_size": 25 } }"#,
        )
        .unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/gman"));
        assert_eq!(config.drive.search_page_size, 25);
        assert_eq!(config.google.token, "token.json");
    }

    #[test]
    fn test_legacy_camel_case_keys_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "dataDir": "/srv/old-gman", "drive": { "searchPageSize": 40 } }"#,
        )
        .unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/old-gman"));
        assert_eq!(config.drive.search_page_size, 40);
        assert_eq!(
            config.settings_path(),
            PathBuf::from("/srv/old-gman/settings.json")
        );
    }

    #[test]
    fn test_current_key_wins_over_legacy_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "dataDir": "/old", "data_dir": "/new" }"#).unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/new"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_configuration(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_prefers_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("settings.json");
        fs::write(&existing, "{}").unwrap();

        let config = AppConfig {
            data_dir: PathBuf::from("/nowhere"),
            ..AppConfig::default()
        };
        let existing_str = existing.to_string_lossy().into_owned();
        assert_eq!(config.resolve(&existing_str), existing);
        assert_eq!(
            config.resolve("missing-file.json"),
            PathBuf::from("/nowhere/missing-file.json")
        );
    }
}
