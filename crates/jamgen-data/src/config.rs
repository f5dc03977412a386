//! Project configuration: `jam.toml` plus environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::DataError;

/// Resolved content-tree locations for one project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project root directory
    pub root: PathBuf,
    /// Structured content records (`_data`)
    pub data_dir: PathBuf,
    /// Images, styles, scripts (`_media`)
    pub media_dir: PathBuf,
    /// Download archives (`games`)
    pub games_dir: PathBuf,
    /// Staging area for the add-game/add-sponsor workflows (`_input`)
    pub input_dir: PathBuf,
    /// Build output (`_site`)
    pub output_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_section(root, &PathsSection::default())
    }

    fn with_section(root: impl Into<PathBuf>, paths: &PathsSection) -> Self {
        let root = root.into();
        Self {
            data_dir: root.join(&paths.data),
            media_dir: root.join(&paths.media),
            games_dir: root.join(&paths.games),
            input_dir: root.join(&paths.input),
            output_dir: root.join(&paths.output),
            root,
        }
    }

    /// Games YAML file for one year.
    pub fn games_file(&self, year: u16) -> PathBuf {
        self.data_dir.join("games").join(format!("games{year}.yaml"))
    }

    /// Jam metadata file for one year.
    pub fn jam_file(&self, year: u16) -> PathBuf {
        self.data_dir.join("jams").join(format!("{year}.md"))
    }

    pub fn homepage_file(&self) -> PathBuf {
        self.data_dir.join("homepage.yaml")
    }

    pub fn rules_file(&self) -> PathBuf {
        self.data_dir.join("rules.yaml")
    }

    /// Per-year media directory (`_media/{year}`).
    pub fn year_media_dir(&self, year: u16) -> PathBuf {
        self.media_dir.join(year.to_string())
    }

    /// Per-year downloads directory (`games/{year}`).
    pub fn year_games_dir(&self, year: u16) -> PathBuf {
        self.games_dir.join(year.to_string())
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("jam.toml")
    }
}

/// `[paths]` section of `jam.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsSection {
    pub data: String,
    pub media: String,
    pub games: String,
    pub input: String,
    pub output: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            data: "_data".into(),
            media: "_media".into(),
            games: "games".into(),
            input: "_input".into(),
            output: "_site".into(),
        }
    }
}

/// Site-wide settings from `jam.toml`, with `GAMEJAM_*` environment overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Latest jam year shown in navigation, as a four-digit string
    pub latest_jam: String,

    pub paths: PathsSection,
    pub site: SiteIdentity,
    pub branding: Branding,
    pub social: Social,
    pub voting: Voting,
    pub registration: Registration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latest_jam: String::new(),
            paths: PathsSection::default(),
            site: SiteIdentity::default(),
            branding: Branding::default(),
            social: Social::default(),
            voting: Voting::default(),
            registration: Registration::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteIdentity {
    pub title: String,
    pub url: String,
    pub email: String,
    pub company_name: String,
    pub company_url: String,
    pub company_address: String,
}

impl Default for SiteIdentity {
    fn default() -> Self {
        Self {
            title: "Game Jam".into(),
            url: "https://example.org/".into(),
            email: String::new(),
            company_name: String::new(),
            company_url: String::new(),
            company_address: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Branding {
    pub logo_dark: String,
    pub logo_light: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Social {
    pub instagram: String,
    pub github: String,
    pub discord: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Voting {
    pub active: bool,
    pub url: String,
    pub deadline: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Registration {
    pub next_jam: String,
    pub active: bool,
    pub url: String,
    pub deadline: String,
}

impl SiteConfig {
    /// Load `jam.toml` from the project root, falling back to defaults when
    /// absent, then apply environment overrides.
    pub fn load(root: &Path) -> Result<Self, DataError> {
        let path = root.join("jam.toml");

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| DataError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| DataError::Config {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Resolve the content-tree paths for this configuration.
    pub fn project_paths(&self, root: impl Into<PathBuf>) -> ProjectPaths {
        ProjectPaths::with_section(root, &self.paths)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("GAMEJAM_LATEST_JAM") {
            self.latest_jam = value;
        }
        if let Ok(value) = env::var("GAMEJAM_VOTING_ACTIVE") {
            self.voting.active = parse_bool(&value);
        }
        if let Ok(value) = env::var("GAMEJAM_VOTING_URL") {
            self.voting.url = value;
        }
        if let Ok(value) = env::var("GAMEJAM_REGISTRATION_ACTIVE") {
            self.registration.active = parse_bool(&value);
        }
        if let Ok(value) = env::var("GAMEJAM_REGISTRATION_URL") {
            self.registration.url = value;
        }
        if let Ok(value) = env::var("GAMEJAM_WEBSITE") {
            self.site.url = value;
        }
        if let Ok(value) = env::var("GAMEJAM_EMAIL") {
            self.site.email = value;
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config_file() {
        let dir = tempfile::tempdir().unwrap();

        let config = SiteConfig::load(dir.path()).unwrap();

        assert_eq!(config.site.title, "Game Jam");
        let paths = config.project_paths(dir.path());
        assert_eq!(paths.data_dir, dir.path().join("_data"));
        assert_eq!(paths.output_dir, dir.path().join("_site"));
    }

    #[test]
    fn reads_jam_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("jam.toml"),
            r#"
latest_jam = "2024"

[site]
title = "Hagenberg Game Jam"

[voting]
active = true
url = "https://example.org/vote"
"#,
        )
        .unwrap();

        let config = SiteConfig::load(dir.path()).unwrap();

        assert_eq!(config.latest_jam, "2024");
        assert_eq!(config.site.title, "Hagenberg Game Jam");
        assert!(config.voting.active);
    }

    #[test]
    fn year_file_paths_are_derived() {
        let paths = ProjectPaths::new("/project");

        assert_eq!(
            paths.games_file(2024),
            PathBuf::from("/project/_data/games/games2024.yaml")
        );
        assert_eq!(paths.jam_file(2024), PathBuf::from("/project/_data/jams/2024.md"));
        assert_eq!(paths.year_games_dir(2024), PathBuf::from("/project/games/2024"));
    }

    #[test]
    fn parses_truthy_strings() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
