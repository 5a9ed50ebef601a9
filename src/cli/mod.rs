//! CLI module for Autocast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Autocast - a daily podcast that writes and narrates itself
///
/// Each run picks an unused topic, writes a script about it, narrates the
/// script and adds the episode to the top of an RSS feed.
#[derive(Parser, Debug)]
#[command(name = "autocast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "AUTOCAST_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Produce and publish one episode
    Run {
        /// Episode date (YYYY-MM-DD), defaults to today (UTC)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Publish even if the feed already has an episode for this date
        #[arg(short, long)]
        force: bool,
    },

    /// Show topic pool usage
    Topics {
        /// Also list the remaining topics
        #[arg(short, long)]
        remaining: bool,
    },

    /// List episodes in the feed
    List,

    /// Create an empty feed from the channel settings
    FeedInit,

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_date() {
        let cli = Cli::try_parse_from(["autocast", "-vv", "run", "--date", "2026-10-19", "--force"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run { date, force } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 19));
                assert!(force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["autocast", "run", "--date", "19/10/2026"]).is_err());
    }
}
