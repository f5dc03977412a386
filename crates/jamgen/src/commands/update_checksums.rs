//! Recompute download checksums from the files on disk and update the
//! games data files where they differ.

use std::path::Path;

use anyhow::Result;

use jamgen_data::sha256_file;

use crate::commands::open_project;

/// Run the update-checksums command.
pub fn run(root: &Path, year: Option<u16>) -> Result<()> {
    let (_site, mut store) = open_project(root)?;

    let years: Vec<u16> = match year {
        Some(year) => vec![year],
        None => store.discover_years(),
    };

    let mut updated = 0usize;
    let mut missing = 0usize;

    for year in years {
        let year_dir = store.paths().year_games_dir(year);
        let mut games = store.games(year)?.to_vec();
        let mut changed = false;

        for record in &mut games {
            let name = record.name().unwrap_or("?").to_string();

            for download in &mut record.download {
                if download.is_url() {
                    continue;
                }

                let path = year_dir.join(&download.file);
                if !path.exists() {
                    tracing::warn!("{year}/{}: file missing for {name:?}", download.file);
                    missing += 1;
                    continue;
                }

                let checksum = sha256_file(&path)?;
                if download.checksum.as_deref() != Some(checksum.as_str()) {
                    tracing::info!("{year}/{}: checksum updated", download.file);
                    download.checksum = Some(checksum);
                    changed = true;
                    updated += 1;
                }
            }
        }

        if changed {
            store.write_games(year, &games)?;
        }
    }

    if updated == 0 && missing == 0 {
        tracing::info!("All checksums are up to date");
    } else {
        tracing::info!("Updated {updated} checksums, {missing} files missing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn records_checksums_for_local_archives() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("_data/jams")).unwrap();
        fs::create_dir_all(root.join("_data/games")).unwrap();
        fs::create_dir_all(root.join("games/2024")).unwrap();

        fs::write(root.join("_data/jams/2024.md"), "---\ntitle: \"2024\"\n---\n").unwrap();
        fs::write(
            root.join("_data/games/games2024.yaml"),
            concat!(
                "- game:\n",
                "    name: Beta\n",
                "  download:\n",
                "    - file: beta.zip\n",
                "      checksum: outdated\n",
                "    - file: https://example.itch.io/beta\n",
            ),
        )
        .unwrap();
        fs::write(root.join("games/2024/beta.zip"), b"hello world").unwrap();

        run(root, None).unwrap();

        let content = fs::read_to_string(root.join("_data/games/games2024.yaml")).unwrap();
        assert!(content
            .contains("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"));
        assert!(!content.contains("outdated"));
        // URL entries stay untouched
        assert!(content.contains("https://example.itch.io/beta"));
    }
}
