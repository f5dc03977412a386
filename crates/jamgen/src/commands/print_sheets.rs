//! Render printable A4 game sheets for a jam year.
//!
//! Sheets are rendered as standalone HTML and, when WeasyPrint is installed,
//! converted to PDF. Without the tool the HTML files remain usable in any
//! browser's print dialog.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use serde_json::json;

use jamgen_static::{GameSummary, TemplateEngine};

use crate::commands::{open_project, resolve_year};

/// Run the print-sheets command.
pub fn run(root: &Path, year: Option<u16>, only: &[String], output: Option<&Path>) -> Result<()> {
    let (site, mut store) = open_project(root)?;
    let year = resolve_year(year, &site)?;

    let default_output = root.join("storage/sheets").join(year.to_string());
    let output = output.unwrap_or(default_output.as_path());

    let games = store.games(year)?.to_vec();
    if games.is_empty() {
        tracing::info!("No games recorded for {year}");
        return Ok(());
    }

    let media_dir = store.paths().media_dir.clone();
    let media_dir = media_dir
        .canonicalize()
        .unwrap_or(media_dir)
        .display()
        .to_string();

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let engine = TemplateEngine::new();
    let weasyprint = weasyprint_available();
    if !weasyprint {
        tracing::warn!("weasyprint not found, writing HTML sheets only");
    }

    let mut rendered = 0usize;
    for record in &games {
        let Some(summary) = GameSummary::from_record(record) else {
            continue;
        };
        if summary.slug.is_empty() {
            continue;
        }
        if !only.is_empty() && !only.iter().any(|s| s == &summary.slug) {
            continue;
        }

        let context = json!({
            "year": year,
            "media_dir": media_dir,
            "game": summary,
        });

        let html = engine
            .render("sheet.html", &context)
            .with_context(|| format!("Failed to render sheet for {:?}", summary.name))?;

        let html_path = output.join(format!("{}.html", summary.slug));
        fs::write(&html_path, html)
            .with_context(|| format!("Failed to write {}", html_path.display()))?;

        if weasyprint {
            let pdf_path = output.join(format!("{}.pdf", summary.slug));
            let status = Command::new("weasyprint")
                .arg(&html_path)
                .arg(&pdf_path)
                .status()
                .context("Failed to run weasyprint")?;

            if status.success() {
                fs::remove_file(&html_path)?;
                tracing::info!("Wrote {}", pdf_path.display());
            } else {
                tracing::warn!("weasyprint failed for {:?}, keeping the HTML", summary.name);
            }
        } else {
            tracing::info!("Wrote {}", html_path.display());
        }

        rendered += 1;
    }

    tracing::info!("Rendered {rendered} sheets into {}", output.display());
    Ok(())
}

fn weasyprint_available() -> bool {
    Command::new("weasyprint")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
