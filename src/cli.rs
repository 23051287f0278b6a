//! CLI definitions for licita.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Licita CLI.
#[derive(Parser)]
#[command(name = "licita")]
#[command(about = "Messaging runtime of the Naval Auction Assistant extension")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to ~/.licita/config.toml when present)
    #[arg(short, long, global = true, env = "LICITA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a simulated session: background, one content script per tab and a popup
    Run {
        /// Number of auction tabs to open
        #[arg(long, default_value_t = 1)]
        tabs: usize,

        /// URL loaded in every tab
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,

        /// Start as an update from this version instead of a fresh install
        #[arg(long)]
        previous_version: Option<String>,
    },

    /// Ping the background from another context
    Ping {
        #[arg(long, value_enum, default_value_t = PingFrom::Popup)]
        from: PingFrom,
    },

    /// List every category:action pair of the routing vocabulary
    Routes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PingFrom {
    Popup,
    Content,
}

pub(crate) const DEFAULT_URL: &str = "https://e-licitatie.ro/pub/notices/contract-notices/list/0/0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["licita", "run"]).unwrap();
        match cli.command {
            Some(Commands::Run {
                tabs,
                url,
                previous_version,
            }) => {
                assert_eq!(tabs, 1);
                assert_eq!(url, DEFAULT_URL);
                assert!(previous_version.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_ping_from_content() {
        let cli = Cli::try_parse_from(["licita", "ping", "--from", "content"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Ping {
                from: PingFrom::Content
            })
        ));
    }

    #[test]
    fn test_global_config() {
        let cli = Cli::try_parse_from(["licita", "routes", "--config", "/tmp/licita.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/licita.toml")));
        assert!(matches!(cli.command, Some(Commands::Routes)));
    }
}
