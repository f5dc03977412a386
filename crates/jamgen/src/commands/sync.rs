//! Synchronize download archives with the R2 bucket.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;

use jamgen_sync::{
    collect_archives, delete_local_archives, R2Config, SyncMode, SyncOptions, Syncer,
};

use crate::commands::open_project;
use crate::prompt;

/// Transfer direction as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Upload,
    Download,
    /// Transfer in both directions, treating the bucket as authoritative
    Sync,
}

impl From<ModeArg> for SyncMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Upload => SyncMode::Upload,
            ModeArg::Download => SyncMode::Download,
            ModeArg::Sync => SyncMode::Bidirectional,
        }
    }
}

/// Run the sync command.
pub async fn run(
    root: &Path,
    mode: ModeArg,
    year: Option<u16>,
    dry_run: bool,
    force: bool,
) -> Result<()> {
    let (_site, mut store) = open_project(root)?;

    let years = year.map(|y| vec![y]);
    let archives = collect_archives(&mut store, years.as_deref())?;
    if archives.is_empty() {
        tracing::info!("No archives to synchronize");
        return Ok(());
    }

    let config = R2Config::from_env()?;
    let remote = config.build_store()?;
    tracing::info!("Syncing {} archives with bucket {}", archives.len(), config.bucket);

    let options = SyncOptions {
        mode: mode.into(),
        dry_run,
    };

    let mut report = Syncer::new(remote).sync(&archives, &options).await?;

    // Archives the bucket still lacks after the transfers. List them before
    // asking anything, then delete only on confirmation.
    if !report.extraneous.is_empty() && !dry_run {
        tracing::warn!(
            "{} local archives could not be placed in the bucket:",
            report.extraneous.len()
        );
        for archive in &report.extraneous {
            tracing::warn!("  {}", archive.key);
        }

        if force || prompt::confirm("Delete these local archives?", false)? {
            let deletion = delete_local_archives(&report.extraneous);
            report.deleted += deletion.deleted;
            report.errors.extend(deletion.errors);
        } else {
            tracing::info!("Keeping the local archives");
        }
    }

    let prefix = if dry_run { "Would have " } else { "" };
    tracing::info!(
        "{prefix}uploaded {}, downloaded {}, deleted {}, {} unchanged",
        report.uploaded,
        report.downloaded,
        report.deleted,
        report.skipped
    );

    if !report.errors.is_empty() {
        for error in &report.errors {
            tracing::warn!("{error}");
        }
        anyhow::bail!("{} archives failed to synchronize", report.errors.len());
    }

    Ok(())
}
