//! Remove a sponsor from the homepage.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::commands::open_project;
use crate::prompt;

/// Run the remove-sponsor command.
pub fn run(root: &Path) -> Result<()> {
    let (_site, mut store) = open_project(root)?;
    let media_dir = store.paths().media_dir.clone();

    let mut homepage = store.homepage()?.clone();
    if homepage.sponsors.items.is_empty() {
        tracing::info!("No sponsors to remove");
        return Ok(());
    }

    let names: Vec<String> = homepage
        .sponsors
        .items
        .iter()
        .map(|s| s.name.clone())
        .collect();
    let index = prompt::choose("Which sponsor should be removed?", &names)?;

    let sponsor = homepage.sponsors.items.remove(index);

    if !prompt::confirm(&format!("Remove {:?}?", sponsor.name), false)? {
        tracing::info!("Aborted");
        return Ok(());
    }

    if let Some(logo) = &sponsor.logo {
        let logo_path = media_dir.join(logo);
        if logo_path.exists() {
            fs::remove_file(&logo_path)?;
            tracing::info!("Deleted {}", logo_path.display());
        }
    }

    store.write_homepage(&homepage)?;
    tracing::info!("Removed sponsor {:?}", sponsor.name);
    Ok(())
}
