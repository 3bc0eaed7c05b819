//! CLI module.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Alto Car Digital Manual
///
/// Ask questions or show photos of your car and get an AI diagnosis
/// together with repair tutorials from YouTube.
#[derive(Parser, Debug)]
#[command(name = "alto-manual")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a question about the car and get a diagnosis with videos
    Ask {
        /// The question to ask
        question: String,
    },

    /// Identify a component or problem from a photo
    Inspect {
        /// Path to an image file
        image: String,
    },

    /// Search repair videos for one or more queries
    Search {
        /// Search queries (at most three are used)
        #[arg(required = true)]
        queries: Vec<String>,

        /// Maximum number of videos to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show popular maintenance videos
    Popular,

    /// Check credentials and configuration
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

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["alto-manual", "-v", "search", "clutch", "gear box", "-l", "3"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Search { queries, limit } => {
                assert_eq!(queries, vec!["clutch", "gear box"]);
                assert_eq!(limit, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["alto-manual", "serve"]);
        assert!(matches!(cli.command, Commands::Serve { host: None, port: None }));
    }
}
