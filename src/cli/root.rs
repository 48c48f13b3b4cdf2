use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::{ListCommand, ShowCommand};
use crate::config::Config;
use crate::{init_logging, tui, LogTarget};

/// trackview - browse GPS tracks page by page in your terminal
#[derive(Parser)]
#[command(
    name = "trackview",
    version,
    about = "Browse GPS tracks page by page in your terminal",
    long_about = r#"trackview lists a track catalogue in a paginated pane and shows the selected
track on a map together with its elevation profile.

Examples:
  trackview                                   # Start interactive mode
  trackview --endpoint ./tracks               # Read tracks from a directory
  trackview list --rows 20 --page 2           # Print the second page of 20 rows
  trackview show morning-loop                 # Summarise a single track"#
)]
pub struct Cli {
    /// Configuration file to use instead of the default locations
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Track endpoint, overrides the configuration
    #[arg(short = 'e', long = "endpoint", global = true)]
    pub endpoint: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the catalogue one page at a time
    List(ListCommand),

    /// Summarise a single track
    Show(ShowCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = Config::init(self.config.as_deref()).await?;
        if let Some(endpoint) = &self.endpoint {
            config.tracks.endpoint = endpoint.clone();
        }
        config.validate()?;

        let target = match self.command {
            None => LogTarget::File(config.log_path()),
            Some(_) => LogTarget::Stderr,
        };
        init_logging(self.debug, target)?;
        debug!(endpoint = %config.tracks.endpoint, "Configuration initialized");

        match self.command {
            Some(Commands::List(list_cmd)) => list_cmd.execute(&config).await,
            Some(Commands::Show(show_cmd)) => show_cmd.execute(&config).await,
            None => {
                info!("Starting interactive mode");
                tui::run(&config).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["trackview", "--endpoint", "./tracks", "list", "--rows", "5"]);
        assert_eq!(cli.endpoint.as_deref(), Some("./tracks"));
        match cli.command {
            Some(Commands::List(list)) => {
                assert_eq!(list.rows, 5);
                assert_eq!(list.page, None);
            }
            _ => panic!("expected list command"),
        }

        let cli = Cli::parse_from(["trackview", "show", "t1", "-d"]);
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Show(show)) if show.id == "t1"));
    }

    #[test]
    fn test_interactive_by_default() {
        let cli = Cli::parse_from(["trackview"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }
}
