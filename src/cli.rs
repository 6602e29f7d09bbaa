//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: checking for broken
//! references, applying fixes, listing scan targets, or inspecting the
//! project file index.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Detect and fix broken resource references in web projects.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan files and report broken resource references with suggested fixes.
    Check {
        /// Project root to scan. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Glob patterns for directories/files to exclude (e.g., "legacy", "*.min.js").
        /// Dependency, build and VCS directories are excluded by default.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable the default exclusion of dependency/build/VCS directories.
        #[arg(long)]
        no_default_excludes: bool,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Apply suggested fixes to source files.
    Fix {
        /// Project root to scan. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Glob patterns for directories/files to exclude (e.g., "legacy", "*.min.js").
        /// Dependency, build and VCS directories are excluded by default.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable the default exclusion of dependency/build/VCS directories.
        #[arg(long)]
        no_default_excludes: bool,

        /// Interactively confirm each file's changes before writing it.
        #[arg(short, long)]
        interactive: bool,

        /// Skip the up-front confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List files that would be scanned without processing them.
    Scan {
        /// Project root to scan. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Glob patterns for directories/files to exclude (e.g., "legacy", "*.min.js").
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable the default exclusion of dependency/build/VCS directories.
        #[arg(long)]
        no_default_excludes: bool,
    },

    /// Print the project file index used for rename lookups.
    Index {
        /// Project root to index. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Glob patterns for directories/files to exclude (e.g., "legacy", "*.min.js").
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable the default exclusion of dependency/build/VCS directories.
        #[arg(long)]
        no_default_excludes: bool,
    },
}
