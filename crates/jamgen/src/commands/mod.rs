pub mod add_game;
pub mod add_sponsor;
pub mod build;
pub mod convert_images;
pub mod new_jam;
pub mod print_sheets;
pub mod remove_sponsor;
pub mod serve;
pub mod sync;
pub mod update_checksums;

use std::path::Path;

use anyhow::{Context, Result};

use jamgen_data::{ContentStore, SiteConfig};

/// Load the site configuration and content store for a project root.
pub fn open_project(root: &Path) -> Result<(SiteConfig, ContentStore)> {
    let site = SiteConfig::load(root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;
    let store = ContentStore::new(site.project_paths(root));
    Ok((site, store))
}

/// Resolve the jam year to operate on: the explicit argument, or the
/// configured latest jam.
pub fn resolve_year(year: Option<u16>, site: &SiteConfig) -> Result<u16> {
    match year {
        Some(year) => Ok(year),
        None => site
            .latest_jam
            .parse()
            .with_context(|| format!("No --year given and latest_jam {:?} is not a year", site.latest_jam)),
    }
}
