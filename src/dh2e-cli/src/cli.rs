//! CLI argument definitions for dh2e
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dh2e")]
#[command(about = "Dark Heresy 2E campaign data migration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default campaign data root (the directory holding data/)
        #[arg(long)]
        data_root: Option<PathBuf>,

        /// Set the default git revision that still holds the original
        /// narrative notes
        #[arg(long)]
        revision: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },

    /// Migrate every collection file under the data root
    #[command(visible_alias = "m")]
    Migrate {
        /// Campaign data root (uses configured default if not provided)
        #[arg(long)]
        data_root: Option<PathBuf>,

        /// Git revision to recover narrative notes from (uses configured
        /// default if not provided)
        #[arg(long)]
        revision: Option<String>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip narrative recovery entirely (no git revision needed)
        #[arg(long)]
        skip_recovery: bool,
    },

    /// Inspect a collection file (document and record counts)
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to a collection .json file
        input: PathBuf,
    },
}
