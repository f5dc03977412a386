//! Content store: year discovery and memoized record loading.
//!
//! Parsed records are cached for the lifetime of the store. A build is a
//! one-shot process, so there is no invalidation; commands that rewrite a
//! data file go through the store so the matching cache entry is refreshed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::ProjectPaths;
use crate::frontmatter::extract_frontmatter;
use crate::models::{GameRecord, Homepage, JamMeta, Rule};

/// Errors from loading or writing content records.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid YAML in {path}: {message}")]
    Yaml { path: String, message: String },

    #[error("Invalid frontmatter in {path}: {message}")]
    Frontmatter { path: String, message: String },

    #[error("Invalid config in {path}: {message}")]
    Config { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Everything known about one jam year.
#[derive(Debug, Clone)]
pub struct LoadedYear {
    pub year: u16,
    /// Missing metadata files are tolerated; the year page renders without
    pub jam: Option<JamMeta>,
    pub games: Vec<GameRecord>,
}

/// Loads and memoizes the structured content tree.
pub struct ContentStore {
    paths: ProjectPaths,
    games: HashMap<u16, Vec<GameRecord>>,
    jams: HashMap<u16, Option<JamMeta>>,
    homepage: Option<Homepage>,
    rules: Option<Vec<Rule>>,
}

impl ContentStore {
    pub fn new(paths: ProjectPaths) -> Self {
        Self {
            paths,
            games: HashMap::new(),
            jams: HashMap::new(),
            homepage: None,
            rules: None,
        }
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Discover jam years by scanning `_data/jams/` for four-digit `.md` stems,
    /// sorted ascending. The data files are the source of truth.
    pub fn discover_years(&self) -> Vec<u16> {
        let jams_dir = self.paths.data_dir.join("jams");

        let Ok(entries) = fs::read_dir(&jams_dir) else {
            return Vec::new();
        };

        let mut years: Vec<u16> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("md") {
                    return None;
                }
                parse_year_stem(&path)
            })
            .collect();

        years.sort_unstable();
        years.dedup();
        years
    }

    /// Games for one year. Missing file means an empty list, never an error.
    pub fn games(&mut self, year: u16) -> Result<&[GameRecord], DataError> {
        if !self.games.contains_key(&year) {
            let loaded = self.load_games(year)?;
            self.games.insert(year, loaded);
        }
        Ok(self.games.get(&year).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Jam metadata for one year, `None` when the file is absent.
    pub fn jam(&mut self, year: u16) -> Result<Option<&JamMeta>, DataError> {
        if !self.jams.contains_key(&year) {
            let loaded = self.load_jam(year)?;
            self.jams.insert(year, loaded);
        }
        Ok(self.jams.get(&year).and_then(|meta| meta.as_ref()))
    }

    /// Load a full year at once (cloned out of the cache).
    pub fn load_year(&mut self, year: u16) -> Result<LoadedYear, DataError> {
        let jam = self.jam(year)?.cloned();
        let games = self.games(year)?.to_vec();
        Ok(LoadedYear { year, jam, games })
    }

    /// Homepage content, defaulted when the file is absent.
    pub fn homepage(&mut self) -> Result<&Homepage, DataError> {
        if self.homepage.is_none() {
            let path = self.paths.homepage_file();
            self.homepage = Some(if path.exists() {
                read_yaml(&path)?
            } else {
                Homepage::default()
            });
        }
        Ok(self.homepage.as_ref().unwrap())
    }

    /// Rule Q&A pairs, empty when the file is absent.
    pub fn rules(&mut self) -> Result<&[Rule], DataError> {
        if self.rules.is_none() {
            let path = self.paths.rules_file();
            self.rules = Some(if path.exists() {
                read_yaml(&path)?
            } else {
                Vec::new()
            });
        }
        Ok(self.rules.as_deref().unwrap())
    }

    /// Rewrite the games file for one year and refresh the cache entry.
    pub fn write_games(&mut self, year: u16, games: &[GameRecord]) -> Result<(), DataError> {
        let path = self.paths.games_file(year);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DataError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        let yaml = serde_yaml::to_string(games).map_err(|e| DataError::Yaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        fs::write(&path, yaml).map_err(|e| DataError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.games.insert(year, games.to_vec());
        Ok(())
    }

    /// Rewrite the homepage file and refresh the cache entry.
    pub fn write_homepage(&mut self, homepage: &Homepage) -> Result<(), DataError> {
        let path = self.paths.homepage_file();

        let yaml = serde_yaml::to_string(homepage).map_err(|e| DataError::Yaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        fs::write(&path, yaml).map_err(|e| DataError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.homepage = Some(homepage.clone());
        Ok(())
    }

    fn load_games(&self, year: u16) -> Result<Vec<GameRecord>, DataError> {
        let path = self.paths.games_file(year);

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| DataError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // Comment-only files parse as null
        if content.lines().all(|l| {
            let trimmed = l.trim();
            trimmed.is_empty() || trimmed.starts_with('#')
        }) {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&content).map_err(|e| DataError::Yaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn load_jam(&self, year: u16) -> Result<Option<JamMeta>, DataError> {
        let path = self.paths.jam_file(year);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| DataError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let (meta, _) =
            extract_frontmatter::<JamMeta>(&content).map_err(|e| DataError::Frontmatter {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(meta)
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = fs::read_to_string(path).map_err(|e| DataError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| DataError::Yaml {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Extract a four-digit year from a file stem like `2024.md`.
fn parse_year_stem(path: &Path) -> Option<u16> {
    let stem = path.file_stem()?.to_str()?;
    if stem.len() == 4 && stem.chars().all(|c| c.is_ascii_digit()) {
        stem.parse().ok()
    } else {
        None
    }
}
