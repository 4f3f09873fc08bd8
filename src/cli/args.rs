//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Department hierarchy engine: inspect and reshape department trees
#[derive(Parser, Debug)]
#[command(name = "deptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Department snapshot file (overrides config)
    #[arg(short = 'f', long, global = true, value_hint = ValueHint::FilePath)]
    pub data_file: Option<PathBuf>,

    /// Company whose departments are loaded (overrides config)
    #[arg(short, long, global = true)]
    pub company: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Query options shared by the read commands.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Case-insensitive text matched against name and description
    #[arg(short, long)]
    pub query: Option<String>,

    /// Include inactive departments
    #[arg(short, long)]
    pub all: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hierarchy as tree
    Tree {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// List departments depth-first
    List {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show summary counts
    Stats {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Move a department (and its subtree) under another one
    Move {
        /// Department to move
        dragged: String,
        /// New parent
        #[arg(required_unless_present = "root", conflicts_with = "root")]
        target: Option<String>,
        /// Move to the top level instead
        #[arg(long)]
        root: bool,
    },

    /// Create a department
    Create {
        /// Department name (2-100 characters)
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Parent id, or "root"
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(long)]
        manager_id: Option<String>,
        #[arg(long)]
        manager_name: Option<String>,
    },

    /// Update department fields
    Update {
        /// Department id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Set active flag
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        manager_id: Option<String>,
        #[arg(long)]
        manager_name: Option<String>,
    },

    /// Delete a department; its children move up one level
    Delete {
        /// Department id
        id: String,
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
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
