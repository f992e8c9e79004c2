//! CLI module for the crag-server binary
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CRAG - Corrective Retrieval Augmented Generation server
#[derive(Parser, Debug)]
#[command(
    name = "crag-server",
    version,
    about = "CRAG - Corrective Retrieval Augmented Generation server",
    long_about = "Answers questions from a local corpus, rewriting the question and\n\
                  searching the web when the retrieved passages are not relevant.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  crag-server                              # Start the server (requires crag.toml)\n    \
                  crag-server --config my.toml             # Use a custom config file\n    \
                  crag-server ask \"What is agent memory?\" # Answer one question\n    \
                  crag-server config --validate            # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "crag.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,

        /// Also print the stage path and the passages used
        #[arg(short, long)]
        trace: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
