//! Scaffold data files and directories for a new jam year.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use jamgen_data::JamMeta;

use crate::commands::open_project;
use crate::prompt;

/// Run the new-jam command.
pub fn run(root: &Path, year: Option<u16>) -> Result<()> {
    let (site, store) = open_project(root)?;
    let paths = store.paths().clone();

    let year = match year {
        Some(year) => year,
        None => {
            let suggested = site
                .latest_jam
                .parse::<u16>()
                .map(|latest| latest + 1)
                .unwrap_or(2026);
            prompt::ask_default("Jam year", &suggested.to_string())?
                .parse()
                .context("Year must be a number")?
        }
    };

    let jam_file = paths.jam_file(year);
    if jam_file.exists() && !prompt::confirm(&format!("{} already exists. Overwrite?", jam_file.display()), false)? {
        tracing::info!("Aborted");
        return Ok(());
    }

    let title = prompt::ask_default("Title", &year.to_string())?;
    let topic = prompt::ask_required("Topic")?;
    let startdate = ask_date(&format!("Start date (e.g. {year}-01-10)"))?;
    let enddate = ask_date(&format!("End date (e.g. {year}-01-12)"))?;
    let hours: u32 = prompt::ask_default("Duration in hours", "36")?
        .parse()
        .context("Hours must be a number")?;
    let logo = prompt::ask_default("Logo filename", &format!("gamejam{year}.svg"))?;

    let meta = JamMeta {
        title,
        topic,
        startdate,
        enddate,
        hours,
        data: Some(format!("games{year}")),
        logo: Some(logo),
    };

    if let Some(parent) = jam_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let frontmatter = serde_yaml::to_string(&meta)?;
    fs::write(&jam_file, format!("---\n{frontmatter}---\n"))
        .with_context(|| format!("Failed to write {}", jam_file.display()))?;
    tracing::info!("Created {}", jam_file.display());

    let games_file = paths.games_file(year);
    if !games_file.exists() {
        if let Some(parent) = games_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(
            &games_file,
            format!("# Games of the {year} Game Jam\n# Add entries with 'jamgen add-game'\n"),
        )?;
        tracing::info!("Created {}", games_file.display());
    }

    for dir in [paths.year_media_dir(year), paths.year_games_dir(year)] {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        tracing::info!("Created {}", dir.display());
    }

    // Older years can be backfilled without moving the navigation forward
    let is_highest = site.latest_jam.parse::<u16>().map(|latest| year > latest).unwrap_or(true);
    if is_highest {
        update_latest_jam(&paths.config_file(), year)?;
    }

    tracing::info!("Jam {year} is ready. Don't forget the logo under _media/");
    Ok(())
}

/// Ask for a date until it looks like YYYY-MM-DD.
fn ask_date(question: &str) -> Result<String> {
    loop {
        let answer = prompt::ask(question)?;
        if is_iso_date(&answer) {
            return Ok(answer);
        }
        println!("Dates must be YYYY-MM-DD.");
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && value
            .chars()
            .enumerate()
            .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
}

/// Point `latest_jam` in jam.toml at the new year, creating the file when
/// the project has none yet.
fn update_latest_jam(config_file: &Path, year: u16) -> Result<()> {
    let line = format!("latest_jam = \"{year}\"");

    if config_file.exists() {
        let content = fs::read_to_string(config_file)?;
        let re = Regex::new(r#"(?m)^latest_jam\s*=\s*"[^"]*""#)?;

        let updated = if re.is_match(&content) {
            re.replace(&content, line.as_str()).into_owned()
        } else {
            format!("{line}\n{content}")
        };
        fs::write(config_file, updated)?;
    } else {
        fs::write(config_file, format!("{line}\n"))?;
    }

    tracing::info!("Set latest_jam to {year}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_existing_latest_jam() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("jam.toml");
        fs::write(&file, "latest_jam = \"2024\"\n\n[site]\ntitle = \"Jam\"\n").unwrap();

        update_latest_jam(&file, 2025).unwrap();

        let content = fs::read_to_string(&file).unwrap();
        assert!(content.contains("latest_jam = \"2025\""));
        assert!(content.contains("[site]"));
    }

    #[test]
    fn creates_config_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("jam.toml");

        update_latest_jam(&file, 2025).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "latest_jam = \"2025\"\n");
    }

    #[test]
    fn validates_iso_dates() {
        assert!(is_iso_date("2025-01-10"));
        assert!(!is_iso_date("10.01.2025"));
        assert!(!is_iso_date("2025-1-10"));
        assert!(!is_iso_date(""));
    }
}
