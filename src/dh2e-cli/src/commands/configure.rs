//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up dh2e CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
///
/// # Arguments
/// * `data_root` - Optional campaign data root to set as default
/// * `revision` - Optional git revision to set as the recovery source
/// * `show` - If true, show current configuration
pub fn handle(data_root: Option<PathBuf>, revision: Option<String>, show: bool) -> Result<()> {
    let config = Config::load()?;

    if show {
        show_config(&config)?;
        return Ok(());
    }

    if data_root.is_none() && revision.is_none() {
        show_usage();
        return Ok(());
    }

    set_defaults(config, data_root, revision)?;

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) -> Result<()> {
    if let Some(root) = config.get_data_root() {
        println!("Data root: {}", root.display());
    } else {
        println!("No data root configured");
    }

    if let Some(rev) = config.get_source_revision() {
        println!("Source revision: {}", rev);
    } else {
        println!("No source revision configured");
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }

    Ok(())
}

/// Store the given defaults in configuration
fn set_defaults(
    mut config: Config,
    data_root: Option<PathBuf>,
    revision: Option<String>,
) -> Result<()> {
    if let Some(root) = data_root {
        println!("Data root configured: {}", root.display());
        config.set_data_root(root);
    }

    if let Some(rev) = revision {
        println!("Source revision configured: {}", rev);
        config.set_source_revision(rev);
    }

    config.save()?;
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: dh2e configure --data-root PATH [--revision REV]");
    println!("   or: dh2e configure --show");
    println!();
    println!("Note: narrative recovery reads the original actor notes from");
    println!("      git history. Set --revision to a commit that still has them.");
}
