use std::path::PathBuf;

use clap::{Parser, Subcommand};
use turok_core::SortKey;

#[derive(Parser)]
#[command(name = "turok")]
#[command(about = "Search public torrent indexers at once and rank the merged results")]
#[command(version)]
#[command(after_help = "Examples:
  turok search ubuntu 24.04               Top results across all sources
  turok search ubuntu -n 25 -s size       25 results, largest first
  turok search ubuntu --magnet 1          Print the magnet of the first result
  turok sites --all                       List every known source")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults are used when it does not exist)
    #[arg(short, long, global = true, env = "TUROK_CONFIG", default_value = "turok.toml")]
    pub config: PathBuf,

    /// Verbose logging (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every enabled source and print the ranked results
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results to show (default from config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Sort by seeders, size or name (default from config)
        #[arg(short, long)]
        sort: Option<SortKey>,

        /// Per-source timeout in seconds (default from config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Print a ready-to-open magnet link for result INDEX (1-based).
        /// With --json it goes in the top-level "magnet" field
        #[arg(long, value_name = "INDEX")]
        magnet: Option<usize>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured sources
    #[command(alias = "ls")]
    Sites {
        /// Include disabled sources
        #[arg(long)]
        all: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "turok", "search", "ubuntu", "24.04", "-n", "5", "-s", "size", "--magnet", "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                query,
                limit,
                sort,
                magnet,
                json,
                ..
            } => {
                assert_eq!(query, vec!["ubuntu", "24.04"]);
                assert_eq!(limit, Some(5));
                assert_eq!(sort, Some(SortKey::Size));
                assert_eq!(magnet, Some(2));
                assert!(!json);
            }
            Commands::Sites { .. } => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["turok", "search", "x", "-s", "leechers"]).is_err());
    }

    #[test]
    fn test_parse_requires_query() {
        assert!(Cli::try_parse_from(["turok", "search"]).is_err());
    }

    #[test]
    fn test_parse_sites() {
        let cli = Cli::try_parse_from(["turok", "--config", "my.toml", "sites", "--all"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("my.toml"));
        assert!(matches!(cli.command, Commands::Sites { all: true }));
    }
}
