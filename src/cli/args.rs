//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::builder::MAX_LEAVES;
use crate::domain::NodeId;

/// Visualize the forest of perfect binary trees behind a Utreexo-style accumulator
#[derive(Parser, Debug)]
#[command(name = "forestviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(long, global = true, env = "FORESTVIZ_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the forest for a leaf count and render it
    Build {
        /// Number of leaves
        #[arg(value_parser = leaf_count)]
        leaves: usize,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Fingerprint salt (default: current time)
        #[arg(long)]
        salt: Option<u64>,
        /// Include details of this node, e.g. leaf-2 or node-0
        #[arg(long)]
        select: Option<NodeId>,
    },

    /// Run the auto-sequence and print every step
    Demo {
        /// Stop after this many leaves
        #[arg(long, value_parser = positive_count)]
        max: Option<usize>,
        /// Milliseconds between steps
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },

    /// Interactive session reading commands from stdin
    Play,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template (at --config if given, else global)
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// termtree view with stats
    Text,
    /// Forest and scene as JSON
    Json,
    /// Standalone SVG document
    Svg,
}

fn leaf_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > MAX_LEAVES => Err(format!("must be at most {MAX_LEAVES}")),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn positive_count(s: &str) -> Result<usize, String> {
    match leaf_count(s)? {
        0 => Err("must be at least 1".to_string()),
        n => Ok(n),
    }
}
