use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gamevault")]
#[command(about = "Find installed games and back up their saves", long_about = None)]
pub struct Cli {
    /// Use this configuration file instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List installed games with their resolved save paths
    Scan,
    /// Extract and cache icons for every installed game
    Icons,
    /// Show hero and logo artwork for a game, downloading if needed
    Assets { id: String },
    /// Back up a game's saves
    Backup { id: String },
    /// List existing backups of a game
    Backups { id: String },
    /// Show save size and backup history of a game
    Details { id: String },
    /// Delete a backup archive
    Delete { path: PathBuf },
    /// Library overview
    Dashboard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_config_after_subcommand() {
        let cli = Cli::parse_from(["gamevault", "backup", "42", "--config", "/tmp/gv.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gv.toml")));
        assert!(matches!(cli.command, Some(Commands::Backup { id }) if id == "42"));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::parse_from(["gamevault"]);
        assert!(cli.command.is_none());
    }
}
