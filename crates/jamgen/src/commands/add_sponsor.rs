//! Add a sponsor to the homepage.

use std::fs;
use std::path::Path;

use anyhow::Result;

use jamgen_data::{slugify, Sponsor};
use jamgen_media::Magick;

use crate::commands::open_project;
use crate::prompt;

const SPONSOR_INPUT: &str = "sponsor";
const QUALITY: u32 = 80;

/// Display height sponsor logos are scaled to on the homepage.
const LOGO_HEIGHT: u32 = 64;

/// Run the add-sponsor command.
pub fn run(root: &Path) -> Result<()> {
    let (_site, mut store) = open_project(root)?;
    let paths = store.paths().clone();

    let name = prompt::ask_required("Sponsor name")?;
    let url = prompt::ask("Website URL")?;

    let slug = slugify(&name);
    if slug.is_empty() {
        anyhow::bail!("Sponsor name {name:?} does not produce a usable slug");
    }

    let mut homepage = store.homepage()?.clone();
    if homepage.sponsors.items.iter().any(|s| s.name == name) {
        anyhow::bail!("Sponsor {name:?} already exists");
    }

    let mut sponsor = Sponsor {
        name: name.clone(),
        url: (!url.is_empty()).then_some(url),
        logo: None,
        width: None,
        height: None,
    };

    let staged = fs::read_dir(paths.input_dir.join(SPONSOR_INPUT))
        .ok()
        .and_then(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .find(|p| p.is_file())
        });

    if let Some(source) = staged {
        stage_logo(&source, &paths.media_dir, &slug, &mut sponsor)?;
    } else {
        tracing::info!("No logo staged under _input/{SPONSOR_INPUT}");
    }

    // Display order is maintainer-controlled, so ask where to insert
    let index = if homepage.sponsors.items.is_empty() {
        0
    } else {
        let mut positions: Vec<String> = homepage
            .sponsors
            .items
            .iter()
            .map(|s| format!("before {}", s.name))
            .collect();
        positions.push("at the end".into());
        prompt::choose("Where should the sponsor appear?", &positions)?
    };
    homepage.sponsors.items.insert(index, sponsor);

    store.write_homepage(&homepage)?;

    tracing::info!("Added sponsor {name:?}");
    Ok(())
}

/// Place the staged logo under the media directory. SVG logos pass through
/// unchanged; raster logos are converted to a fixed-height WebP.
fn stage_logo(source: &Path, media_dir: &Path, slug: &str, sponsor: &mut Sponsor) -> Result<()> {
    let is_svg = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        let filename = format!("sponsor_{slug}.svg");
        fs::copy(source, media_dir.join(&filename))?;
        fs::remove_file(source)?;
        sponsor.logo = Some(filename);
        return Ok(());
    }

    let magick = Magick::new();
    if !magick.is_available() {
        tracing::warn!("magick not found, skipping logo conversion");
        return Ok(());
    }

    let filename = format!("sponsor_{slug}.webp");
    magick.convert(
        source,
        &media_dir.join(&filename),
        None,
        Some(&format!("x{LOGO_HEIGHT}")),
        QUALITY,
    )?;

    // Store the display size so the page can reserve space
    let (width, height) = magick.identify_size(source)?;
    if height > 0 {
        sponsor.width = Some(width * LOGO_HEIGHT / height);
        sponsor.height = Some(LOGO_HEIGHT);
    }

    fs::remove_file(source)?;
    sponsor.logo = Some(filename);
    Ok(())
}
