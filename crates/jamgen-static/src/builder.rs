//! The site builder: runs the build stages in their declared order.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use jamgen_data::{ContentStore, DataError, ProjectPaths, SiteConfig};

use crate::stages::{
    BuildContext, BuildStage, BuildStats, CleanStage, DownloadsStage, MediaStage, PagesStage,
    PassthroughStage, StageOutcome,
};

/// Errors that abort a build. Per-file copy problems are logged and counted
/// instead; see [`BuildStats::failures`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Failed to render {route:?}: {message}")]
    Template { route: String, message: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

impl BuildError {
    pub(crate) fn read(path: &Path, error: std::io::Error) -> Self {
        BuildError::Read {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, error: std::io::Error) -> Self {
        BuildError::Write {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

/// Everything the builder needs to produce a site.
pub struct BuildConfig {
    pub paths: ProjectPaths,
    pub site: SiteConfig,
    /// Generate responsive image variants before copying media
    pub optimize_images: bool,
    /// Show progress bars on the terminal
    pub show_progress: bool,
}

impl BuildConfig {
    /// Load the configuration for a project root.
    pub fn load(root: &Path) -> Result<Self, DataError> {
        let site = SiteConfig::load(root)?;
        let paths = site.project_paths(root);
        Ok(Self {
            paths,
            site,
            optimize_images: true,
            show_progress: true,
        })
    }
}

/// Summary of one completed build.
#[derive(Debug)]
pub struct BuildResult {
    pub stats: BuildStats,
    pub duration_ms: u128,
    pub output_dir: PathBuf,
}

/// Builds the whole site in one pass.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline. The stage order is fixed: media must land before
    /// pages reference it, and downloads are gated by checksums loaded from
    /// the same store the pages were generated from.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let stages: Vec<Box<dyn BuildStage>> = vec![
            Box::new(CleanStage),
            Box::new(MediaStage),
            Box::new(PagesStage),
            Box::new(DownloadsStage),
            Box::new(PassthroughStage),
        ];

        let mut store = ContentStore::new(self.config.paths.clone());
        let mut ctx = BuildContext {
            store: &mut store,
            site: &self.config.site,
            output_dir: self.config.paths.output_dir.clone(),
            optimize_images: self.config.optimize_images,
            show_progress: self.config.show_progress,
            stats: BuildStats::default(),
        };

        for stage in &stages {
            match stage.run(&mut ctx)? {
                StageOutcome::Done(detail) => info!("{}: {detail}", stage.name()),
                StageOutcome::Skipped(reason) => debug!("{}: skipped, {reason}", stage.name()),
            }
        }

        Ok(BuildResult {
            stats: ctx.stats,
            duration_ms: start.elapsed().as_millis(),
            output_dir: self.config.paths.output_dir.clone(),
        })
    }
}
