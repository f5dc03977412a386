//! Interactively add a game to a jam year.
//!
//! Media and download files are staged under `_input/` by the maintainer
//! beforehand; the command converts and moves them into place and appends
//! the record to the games data file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use jamgen_data::{
    sha256_file, slugify, Download, GameInfo, GameRecord, Players, Screenshot, TeamInfo,
};
use jamgen_media::{CropGeometry, Magick};

use crate::commands::{open_project, resolve_year};
use crate::prompt;

const HEADER_INPUT: &str = "header";
const SCREENSHOT_INPUT: &str = "screenshots";
const DOWNLOAD_INPUT: &str = "download";

const QUALITY: u32 = 80;

/// Aspect ratio of the game card header images (1920x520).
const HEADER_ASPECT: f64 = 1920.0 / 520.0;

/// Screenshots are cropped to 16:9 and stored full size plus thumbnail.
const SCREENSHOT_ASPECT: f64 = 16.0 / 9.0;
const SCREENSHOT_SIZE: &str = "1920x1080";
const THUMB_SIZE: &str = "400x225";

/// Run the add-game command.
pub fn run(root: &Path, year: Option<u16>) -> Result<()> {
    let (site, mut store) = open_project(root)?;
    let year = resolve_year(year, &site)?;
    let paths = store.paths().clone();

    let name = prompt::ask_required("Game name")?;
    let slug = slugify(&name);
    if slug.is_empty() {
        anyhow::bail!("Game name {name:?} does not produce a usable slug");
    }

    if store.games(year)?.iter().any(|g| g.slug().as_deref() == Some(slug.as_str())) {
        anyhow::bail!("A game with slug {slug:?} already exists in {year}");
    }

    let team_name = prompt::ask_required("Team name")?;
    let members = prompt::ask_list("Team members")?;
    let players = prompt::ask("Players (e.g. 2 or 2-4)")?;
    let controls = prompt::ask("Controls (comma separated)")?;
    let description = prompt::ask("Description (Markdown)")?;
    let winner = ask_winner()?;

    let magick = Magick::new();
    if !magick.is_available() {
        tracing::warn!("magick not found, staged images will be copied without conversion");
    }

    let media_dir = paths.year_media_dir(year);
    fs::create_dir_all(&media_dir)?;

    let headerimage = stage_header(&magick, &paths.input_dir, &media_dir, &slug)?;
    let images = stage_screenshots(&magick, &paths.input_dir, &media_dir, &slug)?;
    let download = stage_downloads(&paths.input_dir, &paths.year_games_dir(year), &slug)?;

    let record = GameRecord {
        game: Some(GameInfo {
            name: name.clone(),
            players: (!players.is_empty()).then_some(Players::Text(players)),
            controls: controls
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            description: (!description.is_empty()).then_some(description),
        }),
        team: Some(TeamInfo {
            name: team_name,
            members,
        }),
        winner: Some(winner),
        headerimage,
        images,
        download,
    };

    let mut games = store.games(year)?.to_vec();
    games.push(record);
    // The year file stays sorted by game name
    games.sort_by_key(|g| g.name().unwrap_or_default().to_lowercase());
    store.write_games(year, &games)?;

    tracing::info!("Added {name:?} to {}", paths.games_file(year).display());
    Ok(())
}

/// Ask whether the game won its jam. Winning games can carry a placement
/// label ("1st", "2nd"); a plain win is recorded as "yes".
fn ask_winner() -> Result<String> {
    if !prompt::confirm("Is this a winning game?", false)? {
        return Ok("no".into());
    }
    prompt::ask_default("Placement (e.g. 1st, empty for plain yes)", "yes")
}

/// Convert the staged header image, if any, to `{slug}_header.webp`,
/// center-cropped to the card aspect ratio and capped at 1920px wide.
fn stage_header(
    magick: &Magick,
    input_dir: &Path,
    media_dir: &Path,
    slug: &str,
) -> Result<Option<String>> {
    let Some(source) = first_staged_file(&input_dir.join(HEADER_INPUT)) else {
        tracing::info!("No header image staged under _input/{HEADER_INPUT}");
        return Ok(None);
    };

    let filename = if magick.is_available() {
        let (width, height) = magick.identify_size(&source)?;
        let crop = CropGeometry::to_aspect(width, height, HEADER_ASPECT);

        let filename = format!("{slug}_header.webp");
        magick.convert(&source, &media_dir.join(&filename), crop, Some("1920x520"), QUALITY)?;
        filename
    } else {
        place_image(magick, &source, media_dir, &format!("{slug}_header"))?
    };

    fs::remove_file(&source)?;
    Ok(Some(filename))
}

/// Convert each staged screenshot to a full image plus thumbnail pair.
fn stage_screenshots(
    magick: &Magick,
    input_dir: &Path,
    media_dir: &Path,
    slug: &str,
) -> Result<Vec<Screenshot>> {
    let mut screenshots = Vec::new();

    for (index, source) in staged_files(&input_dir.join(SCREENSHOT_INPUT)).iter().enumerate() {
        let n = index + 1;

        let (file, thumb) = if magick.is_available() {
            let (width, height) = magick.identify_size(source)?;
            let crop = CropGeometry::to_aspect(width, height, SCREENSHOT_ASPECT);

            let full_name = format!("{slug}_image{n}_full.webp");
            magick.convert(
                source,
                &media_dir.join(&full_name),
                crop,
                Some(SCREENSHOT_SIZE),
                QUALITY,
            )?;

            let thumb_name = format!("{slug}_image{n}_thumb.webp");
            magick.thumbnail(source, &media_dir.join(&thumb_name), THUMB_SIZE, QUALITY)?;

            (full_name, Some(thumb_name))
        } else {
            let file = place_image(magick, source, media_dir, &format!("{slug}_image{n}_full"))?;
            (file, None)
        };

        fs::remove_file(source)?;
        screenshots.push(Screenshot { file, thumb });
    }

    Ok(screenshots)
}

/// Move staged download archives into `games/{year}/`, recording a checksum
/// per file. The platform is asked per archive.
fn stage_downloads(
    input_dir: &Path,
    games_dir: &Path,
    slug: &str,
) -> Result<Vec<Download>> {
    let staged = staged_files(&input_dir.join(DOWNLOAD_INPUT));
    if staged.is_empty() {
        tracing::info!("No downloads staged under _input/{DOWNLOAD_INPUT}");
        return Ok(Vec::new());
    }

    fs::create_dir_all(games_dir)?;

    let mut downloads = Vec::new();
    for source in staged {
        let original = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("archive.zip");
        let platform = prompt::ask_default(&format!("Platform for {original}"), "Windows")?;

        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("zip");
        let filename = format!("{slug}-{platform}.{extension}");
        let target = games_dir.join(&filename);

        fs::rename(&source, &target)
            .or_else(|_| fs::copy(&source, &target).map(|_| ()).and_then(|_| fs::remove_file(&source)))
            .with_context(|| format!("Failed to move {}", source.display()))?;

        let checksum = sha256_file(&target)?;
        downloads.push(Download {
            file: filename,
            platform: Some(platform),
            checksum: Some(checksum),
        });
    }

    Ok(downloads)
}

/// Convert an image to WebP under `media_dir`, or copy it unchanged when the
/// tool is unavailable. Returns the placed filename.
fn place_image(magick: &Magick, source: &Path, media_dir: &Path, base: &str) -> Result<String> {
    if magick.is_available() {
        let filename = format!("{base}.webp");
        magick.convert(source, &media_dir.join(&filename), None, None, QUALITY)?;
        Ok(filename)
    } else {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let filename = format!("{base}.{extension}");
        fs::copy(source, media_dir.join(&filename))?;
        Ok(filename)
    }
}

fn staged_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            !name.starts_with('.')
        })
        .collect();
    files.sort();
    files
}

fn first_staged_file(dir: &Path) -> Option<PathBuf> {
    staged_files(dir).into_iter().next()
}
