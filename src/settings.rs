use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, GroupError, SettingsError};

pub const DEFAULT_THRESHOLD: i64 = 5;
const DEFAULT_PROFILE: &str = "default";

/// A remote container the import or append flow works on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Target {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Target {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("$noname")
    }
}

/// A configured destination group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub noallow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CleanProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,
    pub stash: Target,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl CleanProfile {
    pub fn is_default(&self) -> bool {
        self.default.unwrap_or(false)
    }

    /// The population threshold, honoring an override. Never below 1.
    pub fn threshold(&self, override_value: Option<i64>) -> usize {
        let value = override_value
            .filter(|t| *t > 0)
            .or(self.threshold.filter(|t| *t > 0))
            .unwrap_or(DEFAULT_THRESHOLD);
        value as usize
    }
}

/// The operator's settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append: Option<Target>,
    #[serde(default)]
    pub clean: BTreeMap<String, CleanProfile>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SettingsError::Absent(path.to_path_buf()))
            }
            Err(err) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };

        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        for (name, count) in settings.duplicate_group_names() {
            warn!("Found {} groups with name '{}'", count, name);
        }

        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        let text = serde_json::to_string_pretty(self).map_err(io::Error::from).map_err(write_err)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        fs::write(path, text).map_err(write_err)
    }

    pub fn import_target(&self) -> Result<&Target, Error> {
        self.import.as_ref().ok_or(Error::MissingSection("import"))
    }

    pub fn append_target(&self) -> Result<&Target, Error> {
        self.append.as_ref().ok_or(Error::MissingSection("append"))
    }

    /// Resolve a clean profile. `default` first selects a profile flagged as default,
    /// then falls back to a profile literally named `default`.
    pub fn clean_profile(&self, profile: &str) -> Result<&CleanProfile, Error> {
        if profile == DEFAULT_PROFILE {
            if let Some(found) = self.clean.values().find(|p| p.is_default()) {
                return Ok(found);
            }
        }

        self.clean
            .get(profile)
            .ok_or_else(|| Error::ProfileNotFound(profile.to_string()))
    }

    /// Look up a group by name, rejecting names shared by several groups.
    pub fn group(&self, name: &str) -> Result<&Group, GroupError> {
        let mut found = self.groups.iter().filter(|g| g.name == name);
        match (found.next(), found.count()) {
            (None, _) => Err(GroupError::NotFound(name.to_string())),
            (Some(group), 0) => Ok(group),
            (Some(_), rest) => Err(GroupError::Duplicate {
                name: name.to_string(),
                count: rest + 1,
            }),
        }
    }

    pub fn add_group(&mut self, group: Group) -> Result<(), GroupError> {
        if group.name.trim().is_empty() {
            return Err(GroupError::EmptyName);
        }
        if self.groups.iter().any(|g| g.name == group.name) {
            return Err(GroupError::Duplicate {
                name: group.name,
                count: 2,
            });
        }
        self.groups.push(group);
        Ok(())
    }

    /// Replace the group called `name`, keeping its position in the list.
    pub fn replace_group(&mut self, name: &str, group: Group) -> Result<(), GroupError> {
        self.group(name)?;
        if group.name.trim().is_empty() {
            return Err(GroupError::EmptyName);
        }
        if group.name != name && self.groups.iter().any(|g| g.name == group.name) {
            return Err(GroupError::Duplicate {
                name: group.name,
                count: 2,
            });
        }
        if let Some(slot) = self.groups.iter_mut().find(|g| g.name == name) {
            *slot = group;
        }
        Ok(())
    }

    pub fn remove_group(&mut self, name: &str) -> Result<Group, GroupError> {
        self.group(name)?;
        let index = self
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| GroupError::NotFound(name.to_string()))?;
        Ok(self.groups.remove(index))
    }

    fn duplicate_group_names(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for group in &self.groups {
            *counts.entry(group.name.as_str()).or_default() += 1;
        }
        let mut dupes: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        dupes.sort();
        dupes
    }
}

/// Split operator input like `a, b; c` into trimmed, non-empty items.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str) -> Group {
        Group {
            name: name.to_string(),
            id: None,
            tags: Vec::new(),
            noallow: Vec::new(),
        }
    }

    fn profile(default: Option<bool>, threshold: Option<i64>) -> CleanProfile {
        CleanProfile {
            default,
            threshold,
            stash: Target {
                id: "stash".to_string(),
                name: None,
            },
            targets: Vec::new(),
        }
    }

    #[test]
    fn test_threshold_fallbacks() {
        assert_eq!(profile(None, None).threshold(None), 5);
        assert_eq!(profile(None, Some(0)).threshold(None), 5);
        assert_eq!(profile(None, Some(-2)).threshold(None), 5);
        assert_eq!(profile(None, Some(3)).threshold(None), 3);
        assert_eq!(profile(None, Some(3)).threshold(Some(7)), 7);
        assert_eq!(profile(None, Some(3)).threshold(Some(0)), 3);
    }

    #[test]
    fn test_clean_profile_default_flag_wins() {
        let mut settings = Settings::default();
        settings.clean.insert("alpha".to_string(), profile(None, Some(1)));
        settings.clean.insert("beta".to_string(), profile(Some(true), Some(2)));

        let found = settings.clean_profile("default").unwrap();
        assert_eq!(found.threshold, Some(2));
        assert_eq!(settings.clean_profile("alpha").unwrap().threshold, Some(1));
    }

    #[test]
    fn test_clean_profile_not_found() {
        let settings = Settings::default();
        assert!(matches!(
            settings.clean_profile("default"),
            Err(Error::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_group_lookup_detects_duplicates() {
        let mut settings = Settings::default();
        settings.groups = vec![group("A"), group("B"), group("A")];

        assert_eq!(settings.group("B").unwrap().name, "B");
        assert_eq!(
            settings.group("A"),
            Err(GroupError::Duplicate {
                name: "A".to_string(),
                count: 2
            })
        );
        assert_eq!(settings.group("C"), Err(GroupError::NotFound("C".to_string())));
    }

    #[test]
    fn test_add_and_replace_keep_names_unique() {
        let mut settings = Settings::default();
        settings.add_group(group("A")).unwrap();
        settings.add_group(group("B")).unwrap();
        assert!(settings.add_group(group("A")).is_err());
        assert!(settings.replace_group("A", group("B")).is_err());

        settings.replace_group("A", group("C")).unwrap();
        let names: Vec<&str> = settings.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b;c ;; "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
