//! Build-time image optimization: responsive variants for hero and gallery
//! images. Source files are never modified.

use std::path::Path;

use jamgen_data::Homepage;

use crate::magick::Magick;

/// Widths of the generated srcset variants.
pub const RESPONSIVE_WIDTHS: [u32; 2] = [400, 800];

const QUALITY: u32 = 80;

/// Outcome of an optimization pass.
#[derive(Debug, Default)]
pub struct OptimizeReport {
    /// Variant filenames that were generated
    pub optimized: Vec<String>,
    /// Variants that already existed or whose source was narrow enough
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Collect the media filenames the optimizer should process: homepage hero
/// and gallery images in an optimizable raster format that exist on disk.
pub fn collect_optimizable(homepage: &Homepage, media_dir: &Path) -> Vec<String> {
    let mut images = Vec::new();

    for item in &homepage.about.gallery {
        push_candidate(&mut images, item.image(), media_dir);
    }
    for file in &homepage.hero.images {
        push_candidate(&mut images, file, media_dir);
    }

    images
}

fn push_candidate(images: &mut Vec<String>, file: &str, media_dir: &Path) {
    let file = file.trim_start_matches('/');
    if file.is_empty() || !is_optimizable_format(file) {
        return;
    }
    if !media_dir.join(file).exists() {
        return;
    }
    if !images.iter().any(|existing| existing == file) {
        images.push(file.to_string());
    }
}

fn is_optimizable_format(filename: &str) -> bool {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    matches!(ext.as_str(), "webp" | "jpg" | "jpeg" | "png" | "gif")
}

/// Generates fixed-width WebP variants next to the source images.
pub struct Optimizer<'a> {
    magick: &'a Magick,
    media_dir: &'a Path,
}

impl<'a> Optimizer<'a> {
    pub fn new(magick: &'a Magick, media_dir: &'a Path) -> Self {
        Self { magick, media_dir }
    }

    /// Generate missing variants for the given media filenames.
    /// An unavailable tool means nothing to do, not a failure.
    pub fn run(&self, images: &[String]) -> OptimizeReport {
        let mut report = OptimizeReport::default();

        if images.is_empty() {
            return report;
        }

        if !self.magick.is_available() {
            tracing::debug!("magick not available, skipping image optimization");
            return report;
        }

        for filename in images {
            self.optimize_one(filename, &mut report);
        }

        report
    }

    fn optimize_one(&self, filename: &str, report: &mut OptimizeReport) {
        let path = self.media_dir.join(filename);

        let (width, _height) = match self.magick.identify_size(&path) {
            Ok(size) => size,
            Err(e) => {
                report.errors.push(e.to_string());
                return;
            }
        };

        let base = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);

        for target_width in RESPONSIVE_WIDTHS {
            if width <= target_width {
                report.skipped += 1;
                continue;
            }

            let variant_name = format!("{base}-{target_width}w.webp");
            let variant_path = self.media_dir.join(&variant_name);

            // Same input + width always produces the same file
            if variant_path.exists() {
                report.skipped += 1;
                continue;
            }

            match self
                .magick
                .resize_to_width(&path, &variant_path, target_width, QUALITY)
            {
                Ok(()) => report.optimized.push(variant_name),
                Err(e) => report.errors.push(e.to_string()),
            }
        }
    }
}

/// Variant filenames that exist on disk for a base image, keyed by width.
pub fn existing_variants(base_filename: &str, media_dir: &Path) -> Vec<(u32, String)> {
    let base = Path::new(base_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(base_filename);

    RESPONSIVE_WIDTHS
        .iter()
        .filter_map(|&width| {
            let variant = format!("{base}-{width}w.webp");
            media_dir.join(&variant).exists().then_some((width, variant))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jamgen_data::models::{About, GalleryItem, Hero};
    use std::fs;

    #[test]
    fn collects_existing_raster_images_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hero_1.webp"), b"x").unwrap();
        fs::write(dir.path().join("gallery_1.jpg"), b"x").unwrap();
        fs::write(dir.path().join("logo.svg"), b"x").unwrap();

        let homepage = Homepage {
            hero: Hero {
                images: vec![
                    "hero_1.webp".into(),
                    "hero_1.webp".into(),
                    "missing.webp".into(),
                ],
            },
            about: About {
                text: None,
                image: None,
                gallery: vec![
                    GalleryItem::Plain("gallery_1.jpg".into()),
                    GalleryItem::Plain("logo.svg".into()),
                ],
            },
            ..Default::default()
        };

        let images = collect_optimizable(&homepage, dir.path());

        assert_eq!(images, vec!["gallery_1.jpg".to_string(), "hero_1.webp".to_string()]);
    }

    #[test]
    fn empty_input_reports_nothing() {
        let magick = Magick::new();
        let dir = tempfile::tempdir().unwrap();
        let optimizer = Optimizer::new(&magick, dir.path());

        let report = optimizer.run(&[]);

        assert!(report.optimized.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn existing_variants_are_discovered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hero-400w.webp"), b"x").unwrap();

        let variants = existing_variants("hero.jpg", dir.path());

        assert_eq!(variants, vec![(400, "hero-400w.webp".to_string())]);
    }
}
