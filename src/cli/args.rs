//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{ConnectorStyle, RelationshipModel};

/// Family tree editor: infer relationships, lay out generations, replay editing sessions
#[derive(Parser, Debug)]
#[command(name = "famtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "FAMTREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Relationship model (four-level, six-category, free-generation)
    #[arg(short, long, global = true)]
    pub model: Option<RelationshipModel>,

    /// Connector style (elbow, diagonal)
    #[arg(long, global = true)]
    pub connector_style: Option<ConnectorStyle>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a session script and show the resulting tree
    Run {
        /// Session script (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Also print connector geometry
        #[arg(long)]
        connectors: bool,
    },

    /// Replay a session script and list occupied levels with slots
    Levels {
        /// Session script (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
    },

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
    /// Show effective settings
    Show,
    /// Show global config file path
    Path,
}
