use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::GroupCommands;
use crate::config::AppConfig;
use crate::drive::RemoteStore;
use crate::error::SettingsError;
use crate::report;
use crate::settings::{split_list, Group, Settings};
use crate::utils::prompt::{confirm_with, prompt_confirm, prompt_line, prompt_with_default};

pub async fn run(config: &AppConfig, command: &GroupCommands) -> Result<()> {
    let path = config.settings_path();
    let mut settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(SettingsError::Absent(_)) => {
            warn!("No settings at {}, starting empty", path.display());
            Settings::default()
        }
        Err(err) => return Err(err.into()),
    };

    match command {
        GroupCommands::List => {
            if settings.groups.is_empty() {
                println!("No group configured.");
            } else {
                print!("{}", report::render_group_list(&settings.groups));
            }
        }
        GroupCommands::Show { name } => {
            let group = settings.group(name)?;
            print!("{}", report::render_group(group));
        }
        GroupCommands::Add => {
            let group = read_new_group()?;
            let name = group.name.clone();
            settings.add_group(group)?;
            save(&settings, &path)?;
            info!("Group '{}' added", name);
        }
        GroupCommands::Edit { name } => {
            let current = settings.group(name)?.clone();
            print!("{}", report::render_group(&current));
            let edited = read_edited_group(&current)?;
            settings.replace_group(name, edited.clone())?;
            save(&settings, &path)?;
            info!("Group '{}' saved", edited.name);

            if edited.name != current.name {
                rename_remote_folder(config, &edited).await?;
            }
        }
        GroupCommands::Remove { name } => {
            settings.group(name)?;
            if confirm_removal(&mut io::stdin().lock(), &mut io::stdout(), name)? {
                settings.remove_group(name)?;
                save(&settings, &path)?;
                info!("Group '{}' removed", name);
            }
        }
    }

    Ok(())
}

fn save(settings: &Settings, path: &Path) -> Result<()> {
    settings
        .save(path)
        .with_context(|| format!("Cannot save groups to {}", path.display()))
}

fn read_new_group() -> Result<Group> {
    let name = prompt_line("Name: ")?;
    let id = prompt_line("Folder id (empty for none): ")?;
    let tags = prompt_line("Tags (separated by , or ;): ")?;
    let noallow = prompt_line("Disallowed tags (separated by , or ;): ")?;
    Ok(build_group(&name, &id, &tags, &noallow))
}

fn read_edited_group(current: &Group) -> Result<Group> {
    let name = prompt_with_default("Name", &current.name)?;
    let id = prompt_with_default(
        "Folder id ('-' for none)",
        current.id.as_deref().unwrap_or("-"),
    )?;
    let tags = prompt_with_default("Tags ('-' for none)", &shown_list(&current.tags))?;
    let noallow = prompt_with_default(
        "Disallowed tags ('-' for none)",
        &shown_list(&current.noallow),
    )?;
    Ok(build_group(&name, &id, &tags, &noallow))
}

fn confirm_removal<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    name: &str,
) -> io::Result<bool> {
    confirm_with(input, output, &format!("Remove group '{}'?", name), Some(true))
}

fn shown_list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join("; ")
    }
}

/// Assemble a group from raw answers. An id of `-` or nothing means no folder; a list of
/// `-` means no items.
pub fn build_group(name: &str, id: &str, tags: &str, noallow: &str) -> Group {
    let id = id.trim();
    Group {
        name: name.trim().to_string(),
        id: match id {
            "" | "-" => None,
            id => Some(id.to_string()),
        },
        tags: answer_list(tags),
        noallow: answer_list(noallow),
    }
}

fn answer_list(answer: &str) -> Vec<String> {
    match answer.trim() {
        "-" => Vec::new(),
        answer => split_list(answer),
    }
}

async fn rename_remote_folder(config: &AppConfig, group: &Group) -> Result<()> {
    let Some(folder_id) = group.id.as_deref() else {
        return Ok(());
    };
    if !prompt_confirm("Rename the remote folder as well?", Some(true))? {
        return Ok(());
    }

    let drive = super::connect(config).await?;
    drive
        .rename(folder_id, &group.name)
        .await
        .with_context(|| format!("Cannot rename folder {}", folder_id))?;
    info!("Folder {} renamed to '{}'", folder_id, group.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_build_group_parses_answers() {
        let group = build_group(" Beach ", " abc ", "sea, sand; sun", "city");
        assert_eq!(group.name, "Beach");
        assert_eq!(group.id.as_deref(), Some("abc"));
        assert_eq!(group.tags, vec!["sea", "sand", "sun"]);
        assert_eq!(group.noallow, vec!["city"]);
    }

    #[test]
    fn test_dash_clears_lists() {
        let group = build_group("Catch-all", "abc", "-", " - ");
        assert!(group.tags.is_empty());
        assert!(group.noallow.is_empty());
    }

    #[test]
    fn test_empty_lists_are_shown_as_dash() {
        // What the edit prompt shows must parse back to the same list when kept.
        let group = build_group("A", "-", &shown_list(&[]), &shown_list(&["x".to_string()]));
        assert!(group.tags.is_empty());
        assert_eq!(group.noallow, vec!["x"]);
    }

    #[test]
    fn test_removal_confirmed_by_empty_answer() {
        let mut output = Vec::new();
        let mut empty = Cursor::new(b"\n".to_vec());
        assert!(confirm_removal(&mut empty, &mut output, "Beach").unwrap());
        assert!(String::from_utf8(output)
            .unwrap()
            .contains("Remove group 'Beach'? (Y/n)"));

        let mut no = Cursor::new(b"n\n".to_vec());
        assert!(!confirm_removal(&mut no, &mut Vec::new(), "Beach").unwrap());

        let mut closed = Cursor::new(Vec::new());
        assert!(confirm_removal(&mut closed, &mut Vec::new(), "Beach").is_err());
    }

    #[test]
    fn test_build_group_without_folder() {
        assert_eq!(build_group("A", "-", "", "").id, None);
        assert_eq!(build_group("A", "", "", "").id, None);
    }
}
