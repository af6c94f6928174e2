//! Migration command handler
//!
//! Resolves the data root and recovery revision, runs the pass sequence
//! over every collection file under the root, and renders the report.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dh2e::migrate::{self, FileReport, RunReport};
use dh2e::revision::{GitRevisionStore, RevisionStore};

use crate::config::Config;

/// Handle the migrate command
pub fn handle(
    data_root: Option<PathBuf>,
    revision: Option<String>,
    dry_run: bool,
    skip_recovery: bool,
) -> Result<()> {
    let config = Config::load()?;

    let data_root = match data_root.or_else(|| config.get_data_root().map(Path::to_path_buf)) {
        Some(root) => root,
        None => std::env::current_dir().context("Could not determine current directory")?,
    };

    let store = if skip_recovery {
        None
    } else {
        Some(revision_store(&config, revision, &data_root)?)
    };

    let report = migrate::run(
        &data_root,
        store.as_ref().map(|store| store as &dyn RevisionStore),
        dry_run,
    )
    .with_context(|| format!("Migration failed under {}", data_root.display()))?;

    render_report(&report, dry_run);

    Ok(())
}

/// Build the git-backed store recovery reads original notes from
fn revision_store(
    config: &Config,
    revision: Option<String>,
    data_root: &Path,
) -> Result<GitRevisionStore> {
    let revision = match revision.or_else(|| config.get_source_revision().map(str::to_string)) {
        Some(rev) => rev,
        None => bail!(
            "No source revision for narrative recovery. \
             Set one with `dh2e configure --revision REV` or pass --skip-recovery."
        ),
    };

    tracing::info!("Recovering narrative notes from revision {}", revision);
    Ok(GitRevisionStore::new(data_root, revision))
}

/// Print the run report
fn render_report(report: &RunReport, dry_run: bool) {
    for file in &report.files {
        render_file(file, dry_run);
    }

    println!();
    if dry_run {
        println!(
            "Dry run: {} of {} files would change, {} items would be added",
            report.changed_files(),
            report.files.len(),
            report.items_added()
        );
    } else {
        println!(
            "Done: {} of {} files changed, {} items added",
            report.changed_files(),
            report.files.len(),
            report.items_added()
        );
    }
}

/// Print one file's outcome with its per-actor recovery lines
fn render_file(file: &FileReport, dry_run: bool) {
    if !file.found {
        tracing::info!("Skipping {}: not found", file.path);
        println!("Skipping {}: not found", file.path);
        return;
    }

    let status = if !file.changed {
        "unchanged"
    } else if dry_run {
        "would change"
    } else {
        "updated"
    };
    println!("{}: {} documents, {}", file.path, file.documents, status);

    if let Some(reason) = &file.recovery_skipped {
        tracing::warn!("Recovery skipped for {}: {}", file.path, reason);
        println!("    recovery skipped: {}", reason);
    }

    for actor in &file.recovered {
        println!(
            "    {}: +{} items ({}s {}ta {}tr {}p)",
            actor.name,
            actor.total(),
            actor.skills,
            actor.talents,
            actor.traits,
            actor.powers
        );
    }

    for name in &file.skipped {
        println!("    {}: no original data found, skipping", name);
    }
}
