//! The build pipeline stages, run sequentially in the order the builder
//! declares them. Each stage reports what it did; per-file problems are
//! logged and counted instead of aborting the build.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use walkdir::WalkDir;

use jamgen_data::{ContentStore, SiteConfig};
use jamgen_media::{collect_optimizable, Magick, Optimizer};

use crate::builder::BuildError;
use crate::copy::{copy_if_stale, CopyOutcome};
use crate::pages::{generate_pages, output_path};
use crate::templates::TemplateEngine;

/// Counters accumulated across the pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildStats {
    pub pages: usize,
    pub media_copied: usize,
    pub images_optimized: usize,
    pub downloads_copied: usize,
    pub downloads_skipped: usize,
    /// Per-file problems that were logged but did not abort the build
    pub failures: usize,
}

/// What one stage did.
#[derive(Debug)]
pub enum StageOutcome {
    Done(String),
    Skipped(String),
}

/// Shared state the stages read and update.
pub struct BuildContext<'a> {
    pub store: &'a mut ContentStore,
    pub site: &'a SiteConfig,
    pub output_dir: PathBuf,
    pub optimize_images: bool,
    pub show_progress: bool,
    pub stats: BuildStats,
}

/// One step of the build pipeline.
pub trait BuildStage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut BuildContext) -> Result<StageOutcome, BuildError>;
}

/// Empties the output directory, keeping the `media` and `games` subtrees
/// so unchanged media and download archives do not have to be copied again.
pub struct CleanStage;

/// Output subtrees the clean stage leaves in place between builds.
const PRESERVED_SUBTREES: [&str; 2] = ["media", "games"];

impl BuildStage for CleanStage {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<StageOutcome, BuildError> {
        if !ctx.output_dir.exists() {
            fs::create_dir_all(&ctx.output_dir)
                .map_err(|e| BuildError::write(&ctx.output_dir, e))?;
            return Ok(StageOutcome::Skipped("output directory created".into()));
        }

        let entries =
            fs::read_dir(&ctx.output_dir).map_err(|e| BuildError::read(&ctx.output_dir, e))?;

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| BuildError::read(&ctx.output_dir, e))?;
            let path = entry.path();

            if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| PRESERVED_SUBTREES.contains(&name))
            {
                continue;
            }

            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|e| BuildError::write(&path, e))?;
            removed += 1;
        }

        Ok(StageOutcome::Done(format!("{removed} entries removed")))
    }
}

/// Optimizes homepage images, then mirrors the media tree into `media/`.
pub struct MediaStage;

impl BuildStage for MediaStage {
    fn name(&self) -> &'static str {
        "media"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<StageOutcome, BuildError> {
        let media_dir = ctx.store.paths().media_dir.clone();

        if !media_dir.exists() {
            return Ok(StageOutcome::Skipped("no media directory".into()));
        }

        if ctx.optimize_images {
            let homepage = ctx.store.homepage()?.clone();
            let images = collect_optimizable(&homepage, &media_dir);

            let magick = Magick::new();
            let report = Optimizer::new(&magick, &media_dir).run(&images);

            ctx.stats.images_optimized += report.optimized.len();
            ctx.stats.failures += report.errors.len();
            for error in &report.errors {
                warn!("Image optimization: {error}");
            }
        }

        let target_root = ctx.output_dir.join("media");
        for entry in WalkDir::new(&media_dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(&media_dir) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let target = target_root.join(relative);

            match copy_if_needed(entry.path(), &target) {
                Ok(true) => ctx.stats.media_copied += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to copy {}: {e}", entry.path().display());
                    ctx.stats.failures += 1;
                }
            }
        }

        Ok(StageOutcome::Done(format!(
            "{} files copied",
            ctx.stats.media_copied
        )))
    }
}

/// Copy a media file unless the target exists with the same size and a
/// modification time at least as new as the source.
fn copy_if_needed(source: &Path, target: &Path) -> std::io::Result<bool> {
    if let (Ok(src_meta), Ok(dst_meta)) = (source.metadata(), target.metadata()) {
        if src_meta.len() == dst_meta.len() {
            if let (Ok(src_mtime), Ok(dst_mtime)) = (src_meta.modified(), dst_meta.modified()) {
                if dst_mtime >= src_mtime {
                    return Ok(false);
                }
            }
        }
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(true)
}

/// Generates and writes every HTML page.
pub struct PagesStage;

impl BuildStage for PagesStage {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<StageOutcome, BuildError> {
        let engine = TemplateEngine::new();
        let pages = generate_pages(ctx.store, ctx.site)?;

        for page in &pages {
            let html = engine
                .render(page.template, &page.context)
                .map_err(|e| BuildError::Template {
                    route: page.route.clone(),
                    message: e.to_string(),
                })?;

            let path = output_path(&ctx.output_dir, &page.route);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::write(parent, e))?;
            }
            fs::write(&path, html).map_err(|e| BuildError::write(&path, e))?;

            debug!("Wrote {}", path.display());
            ctx.stats.pages += 1;
        }

        Ok(StageOutcome::Done(format!("{} pages", ctx.stats.pages)))
    }
}

/// Copies game download archives into `games/`, gated by the checksums
/// recorded in the data files so unchanged archives are not rewritten.
pub struct DownloadsStage;

impl BuildStage for DownloadsStage {
    fn name(&self) -> &'static str {
        "downloads"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<StageOutcome, BuildError> {
        let games_dir = ctx.store.paths().games_dir.clone();

        if !games_dir.exists() {
            return Ok(StageOutcome::Skipped("no downloads directory".into()));
        }

        let checksums = recorded_checksums(ctx.store)?;

        let files: Vec<PathBuf> = WalkDir::new(&games_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                let name = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                name != ".gitignore" && name != ".gitkeep"
            })
            .collect();

        let progress = if ctx.show_progress && !files.is_empty() {
            let bar = ProgressBar::new(files.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg:12} [{bar:30}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message("downloads");
            Some(bar)
        } else {
            None
        };

        let target_root = ctx.output_dir.join("games");
        for file in &files {
            let relative = match file.strip_prefix(&games_dir) {
                Ok(rel) => rel,
                Err(_) => continue,
            };

            let key = relative.to_string_lossy().replace('\\', "/");
            let expected = checksums.get(&key).map(String::as_str);

            match copy_if_stale(file, &target_root.join(relative), expected) {
                Ok(CopyOutcome::Copied) => ctx.stats.downloads_copied += 1,
                Ok(CopyOutcome::Skipped) => ctx.stats.downloads_skipped += 1,
                Err(e) => {
                    warn!("Failed to copy {}: {e}", file.display());
                    ctx.stats.failures += 1;
                }
            }

            if let Some(bar) = &progress {
                bar.inc(1);
            }
        }

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        Ok(StageOutcome::Done(format!(
            "{} copied, {} unchanged",
            ctx.stats.downloads_copied, ctx.stats.downloads_skipped
        )))
    }
}

/// Map of `{year}/{file}` to the checksum recorded in the data files.
fn recorded_checksums(store: &mut ContentStore) -> Result<HashMap<String, String>, BuildError> {
    let mut map = HashMap::new();

    for year in store.discover_years() {
        for record in store.games(year)? {
            for download in &record.download {
                if download.is_url() {
                    continue;
                }
                if let Some(checksum) = &download.checksum {
                    map.insert(format!("{year}/{}", download.file), checksum.clone());
                }
            }
        }
    }

    Ok(map)
}

/// Copies server control files from the project root into the output.
pub struct PassthroughStage;

const PASSTHROUGH_FILES: [&str; 2] = ["robots.txt", ".htaccess"];

impl BuildStage for PassthroughStage {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<StageOutcome, BuildError> {
        let root = ctx.store.paths().root.clone();

        let mut copied = 0usize;
        for name in PASSTHROUGH_FILES {
            let source = root.join(name);
            if !source.exists() {
                continue;
            }

            let target = ctx.output_dir.join(name);
            fs::copy(&source, &target).map_err(|e| BuildError::write(&target, e))?;
            copied += 1;
        }

        if copied == 0 {
            Ok(StageOutcome::Skipped("no passthrough files".into()))
        } else {
            Ok(StageOutcome::Done(format!("{copied} files")))
        }
    }
}
