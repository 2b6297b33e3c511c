//! CLI surface (§6 "Command surface"). Thin wrapper: every subcommand
//! parses its arguments and hands off to [`super::dispatch`], which calls
//! straight into [`crate::orchestrator`] — no business logic lives here.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codeloom")]
#[command(about = "Selector-driven CST query and refactoring engine with semantic code search")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file, layered over the embedded defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root to operate on (defaults to the current directory).
    #[arg(short = 'r', long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk `root` and (re)populate its structural index.
    Analyze {
        #[arg(long)]
        dataset: Option<String>,
        #[arg(long)]
        project_label: Option<String>,
    },
    /// Structural/full-text search.
    Search {
        #[command(subcommand)]
        kind: SearchCommand,
    },
    /// List every class/function/method block in a file.
    ListCstBlocks {
        file: PathBuf,
        #[arg(long)]
        include_code: bool,
    },
    /// Evaluate a selector against a file.
    QueryCst {
        file: PathBuf,
        selector: String,
        #[arg(long)]
        include_code: bool,
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Apply a batch of patch ops (JSON, `Vec<PatchOp>`) to a file.
    ComposeCstModule {
        file: PathBuf,
        /// Path to a JSON file holding the `[PatchOp]` array.
        ops_file: PathBuf,
        #[arg(long)]
        apply: bool,
        #[arg(long)]
        create_backup: bool,
        #[arg(long)]
        return_source: bool,
        #[arg(long)]
        return_diff: bool,
    },
    /// Regenerate the vector index from the store.
    RebuildFaiss {
        #[arg(long)]
        dataset: Option<String>,
    },
    /// Force re-chunking and re-embedding of specific files.
    Revectorize { paths: Vec<PathBuf> },
    /// Control the vectorization worker's background process.
    Daemon {
        #[command(subcommand)]
        action: DaemonCommand,
    },
    /// Run the vectorization worker loop in the foreground. Not part of
    /// the stable command surface: this is the child process `daemon
    /// start` spawns, never invoked directly by a human.
    #[command(hide = true, name = "daemon-worker")]
    DaemonWorker,
}

#[derive(Subcommand, Debug)]
pub enum SearchCommand {
    FindUsages {
        name: String,
        #[arg(long)]
        target_type: Option<CliUsageKind>,
        #[arg(long)]
        target_class: Option<String>,
    },
    Fulltext {
        query: String,
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    ClassMethods {
        #[arg(long)]
        class: Option<String>,
    },
    FindClasses { pattern: String },
    Semantic {
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
        #[arg(long)]
        max_distance: Option<f32>,
    },
}

/// CLI-facing mirror of [`crate::domain::types::UsageKind`] (clap's
/// `ValueEnum` derive needs a type it owns).
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliUsageKind {
    MethodCall,
    AttributeAccess,
    FunctionCall,
}

impl From<CliUsageKind> for crate::domain::types::UsageKind {
    fn from(kind: CliUsageKind) -> Self {
        match kind {
            CliUsageKind::MethodCall => Self::MethodCall,
            CliUsageKind::AttributeAccess => Self::AttributeAccess,
            CliUsageKind::FunctionCall => Self::FunctionCall,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    Start,
    Stop,
    Restart,
    Status,
}
