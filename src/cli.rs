use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "gman")]
#[command(about = "Sorts drive folders into groups named after them", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "GMAN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move new uploads into the configured group folders
    Import,
    /// Merge duplicated folders back into their originals
    Append,
    /// Gather tagged folders into stash group folders
    Clean(CleanArgs),
    /// View and edit configured groups
    #[command(subcommand)]
    Groups(GroupCommands),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Clean profile to use
    #[arg(short, long, default_value = "default")]
    pub profile: String,
    /// Minimum number of entries for a new group folder
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..))]
    pub threshold: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum GroupCommands {
    /// List configured groups
    List,
    /// Show one group
    Show { name: String },
    /// Add a group interactively
    Add,
    /// Edit a group interactively
    Edit { name: String },
    /// Remove a group
    Remove { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_arguments() {
        let cli = Cli::try_parse_from(["gman", "clean", "-p", "photos", "-t", "3"]).unwrap();
        match cli.command {
            Some(Commands::Clean(args)) => {
                assert_eq!(args.profile, "photos");
                assert_eq!(args.threshold, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_clean_rejects_zero_threshold() {
        assert!(Cli::try_parse_from(["gman", "clean", "--threshold", "0"]).is_err());
    }

    #[test]
    fn test_groups_edit_takes_name() {
        let cli = Cli::try_parse_from(["gman", "--config", "/tmp/c.json", "groups", "edit", "Trips"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/c.json"));
        assert!(matches!(
            cli.command,
            Some(Commands::Groups(GroupCommands::Edit { ref name })) if name == "Trips"
        ));
    }
}
