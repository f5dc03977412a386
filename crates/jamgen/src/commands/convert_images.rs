//! Convert referenced raster images to a target format and update the data
//! files that reference them.

use std::fs;
use std::path::Path;

use anyhow::Result;

use jamgen_data::ContentStore;
use jamgen_media::{is_lossy_format, normalize_format, Magick};

use crate::commands::open_project;

const QUALITY: u32 = 80;

/// Extensions the converter will touch. Vector formats pass through.
const RASTER_FORMATS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Run the convert-images command.
pub fn run(root: &Path, format: &str, year: Option<u16>, dry_run: bool) -> Result<()> {
    let target = normalize_format(format);
    if !RASTER_FORMATS.contains(&target.as_str()) && !is_lossy_format(&target) {
        anyhow::bail!("Unsupported target format {target:?}");
    }

    let magick = Magick::new();
    if !magick.is_available() {
        anyhow::bail!("ImageMagick is required for this command but was not found in PATH");
    }
    if !magick.supports_format(&target) {
        anyhow::bail!("This ImageMagick build cannot write {target:?}");
    }

    let (_site, mut store) = open_project(root)?;

    let years: Vec<u16> = match year {
        Some(year) => vec![year],
        None => store.discover_years(),
    };

    let mut converter = Converter {
        magick,
        target,
        dry_run,
        converted: 0,
        failed: 0,
    };

    for year in years {
        convert_year(&mut store, year, &mut converter)?;
    }

    // Homepage references live outside the year directories
    if year.is_none() {
        convert_homepage(&mut store, &mut converter)?;
    }

    if converter.dry_run {
        tracing::info!("Would convert {} images", converter.converted);
    } else {
        tracing::info!("Converted {} images", converter.converted);
    }
    if converter.failed > 0 {
        tracing::warn!("{} conversions failed", converter.failed);
    }

    Ok(())
}

struct Converter {
    magick: Magick,
    target: String,
    dry_run: bool,
    converted: usize,
    failed: usize,
}

impl Converter {
    /// Convert one referenced file in place, returning the new reference.
    /// `None` means the reference stays as it is.
    fn process(&mut self, media_dir: &Path, reference: &str) -> Option<String> {
        let extension = Path::new(reference)
            .extension()
            .and_then(|e| e.to_str())
            .map(normalize_format)
            .unwrap_or_default();

        if extension == self.target || !RASTER_FORMATS.contains(&extension.as_str()) {
            return None;
        }

        let source = media_dir.join(reference);
        if !source.exists() {
            tracing::warn!("{reference} is referenced but missing on disk");
            return None;
        }

        let new_reference = Path::new(reference)
            .with_extension(&self.target)
            .to_string_lossy()
            .into_owned();

        if self.dry_run {
            tracing::info!("Would convert {reference} -> {new_reference}");
            self.converted += 1;
            return None;
        }

        let output = media_dir.join(&new_reference);
        match self.magick.convert(&source, &output, None, None, QUALITY) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&source) {
                    tracing::warn!("Could not delete {}: {e}", source.display());
                }
                tracing::info!("Converted {reference} -> {new_reference}");
                self.converted += 1;
                Some(new_reference)
            }
            Err(e) => {
                tracing::warn!("{e}");
                self.failed += 1;
                None
            }
        }
    }
}

fn convert_year(store: &mut ContentStore, year: u16, converter: &mut Converter) -> Result<()> {
    let media_dir = store.paths().year_media_dir(year);
    let mut games = store.games(year)?.to_vec();
    let mut changed = false;

    for record in &mut games {
        if let Some(header) = &record.headerimage {
            if let Some(new) = converter.process(&media_dir, header) {
                record.headerimage = Some(new);
                changed = true;
            }
        }

        for screenshot in &mut record.images {
            if let Some(new) = converter.process(&media_dir, &screenshot.file) {
                screenshot.file = new;
                changed = true;
            }
            if let Some(thumb) = &screenshot.thumb {
                if let Some(new) = converter.process(&media_dir, thumb) {
                    screenshot.thumb = Some(new);
                    changed = true;
                }
            }
        }
    }

    if changed {
        store.write_games(year, &games)?;
    }
    Ok(())
}

fn convert_homepage(store: &mut ContentStore, converter: &mut Converter) -> Result<()> {
    let media_dir = store.paths().media_dir.clone();
    let mut homepage = store.homepage()?.clone();
    let mut changed = false;

    for image in &mut homepage.hero.images {
        if let Some(new) = converter.process(&media_dir, image) {
            *image = new;
            changed = true;
        }
    }

    if let Some(image) = &homepage.about.image {
        if let Some(new) = converter.process(&media_dir, image) {
            homepage.about.image = Some(new);
            changed = true;
        }
    }

    for item in &mut homepage.about.gallery {
        if let Some(new) = converter.process(&media_dir, item.image()) {
            *item = jamgen_data::GalleryItem::Plain(new);
            changed = true;
        }
    }

    for sponsor in &mut homepage.sponsors.items {
        if let Some(logo) = &sponsor.logo {
            if let Some(new) = converter.process(&media_dir, logo) {
                sponsor.logo = Some(new);
                changed = true;
            }
        }
    }

    if changed {
        store.write_homepage(&homepage)?;
    }
    Ok(())
}
