//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use jamgen_static::{BuildConfig, SiteBuilder};

/// Run the build command.
pub async fn run(root: &Path, output: Option<PathBuf>, no_optimize: bool) -> Result<()> {
    tracing::info!("Building site...");

    let mut config = BuildConfig::load(root)?;
    config.optimize_images = !no_optimize;
    if let Some(output) = output {
        config.paths.output_dir = output;
    }

    let result = SiteBuilder::new(config).build()?;

    tracing::info!(
        "Built {} pages, copied {} media files and {} downloads in {}ms",
        result.stats.pages,
        result.stats.media_copied,
        result.stats.downloads_copied,
        result.duration_ms
    );

    if result.stats.failures > 0 {
        tracing::warn!("{} files failed to copy, see the log above", result.stats.failures);
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
