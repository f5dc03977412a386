//! Serde types for the YAML content records.

use serde::{Deserialize, Serialize};

/// Jam metadata parsed from the frontmatter of `_data/jams/{year}.md`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct JamMeta {
    /// Display title, usually the year
    #[serde(default)]
    pub title: String,

    /// Topic/theme of the jam
    #[serde(default)]
    pub topic: String,

    /// Start date (YYYY-MM-DD)
    #[serde(default)]
    pub startdate: String,

    /// End date (YYYY-MM-DD)
    #[serde(default)]
    pub enddate: String,

    /// Jam duration in hours
    #[serde(default)]
    pub hours: u32,

    /// Name of the games data file, without extension (e.g. `games2024`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Logo filename under the media directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// One entry of `_data/games/games{year}.yaml`.
///
/// Entries without a `game` block are tolerated on load and ignored during
/// page generation, mirroring how hand-edited files have historically looked.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamInfo>,

    /// Category tag for winning games, or "no"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,

    /// Header image filename under `_media/{year}/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headerimage: Option<String>,

    /// Screenshot full/thumbnail pairs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Screenshot>,

    /// Downloadable builds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub download: Vec<Download>,
}

impl GameRecord {
    /// The game name, if the entry has a valid `game` block.
    pub fn name(&self) -> Option<&str> {
        self.game
            .as_ref()
            .map(|g| g.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Slug derived from the game name. `None` for nameless entries,
    /// `Some("")` when the name slugifies to nothing.
    pub fn slug(&self) -> Option<String> {
        self.name().map(crate::slug::slugify)
    }
}

/// The `game` block of a record.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GameInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Players>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<String>,

    /// Markdown-rich description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Player count, either a plain number or free text such as `2-4`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Players {
    Count(u32),
    Text(String),
}

impl std::fmt::Display for Players {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Players::Count(n) => write!(f, "{}", n),
            Players::Text(s) => f.write_str(s),
        }
    }
}

/// The `team` block of a record.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TeamInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

/// A full screenshot plus its thumbnail.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Screenshot {
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// A downloadable build archive.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Download {
    /// Filename under `games/{year}/`, or an absolute URL
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// SHA-256 of the archive, lowercase hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Download {
    /// Download entries may point at external URLs instead of local files.
    pub fn is_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }
}

/// Homepage content (`_data/homepage.yaml`).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Homepage {
    #[serde(default)]
    pub hero: Hero,

    #[serde(default)]
    pub about: About,

    #[serde(default)]
    pub sponsors: Sponsors,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoEmbed>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Hero {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct About {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryItem>,
}

/// Gallery entries are either a bare filename or a map with a caption.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum GalleryItem {
    Plain(String),
    Detailed {
        image: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl GalleryItem {
    pub fn image(&self) -> &str {
        match self {
            GalleryItem::Plain(file) => file,
            GalleryItem::Detailed { image, .. } => image,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Sponsors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Display order is significant and maintainer-controlled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Sponsor>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Sponsor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct VideoEmbed {
    pub url: String,
}

/// One Q&A pair from `_data/rules.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Rule {
    pub question: String,
    /// Markdown-rich answer
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_game_entry() {
        let yaml = r#"
- game:
    name: "Space Lizards"
    players: 2
    controls:
      - keyboard
      - gamepad
    description: |
      Climb the *tower*.
  team:
    name: Team Rocket
    members:
      - Ada Lovelace
      - Grace Hopper
  winner: "1st"
  headerimage: space-lizards_header.webp
  images:
    - file: space-lizards_image1_full.webp
      thumb: space-lizards_image1_thumb.webp
  download:
    - file: space-lizards-Windows.zip
      platform: Windows
      checksum: abc123
"#;
        let records: Vec<GameRecord> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.name(), Some("Space Lizards"));
        assert_eq!(record.slug().as_deref(), Some("space-lizards"));
        assert_eq!(record.game.as_ref().unwrap().players, Some(Players::Count(2)));
        assert_eq!(record.team.as_ref().unwrap().members.len(), 2);
        assert_eq!(record.download[0].checksum.as_deref(), Some("abc123"));
        assert!(!record.download[0].is_url());
    }

    #[test]
    fn tolerates_player_ranges_and_missing_blocks() {
        let yaml = r#"
- game:
    name: Couch Party
    players: "2-4"
- team:
    name: Orphaned Team
"#;
        let records: Vec<GameRecord> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].game.as_ref().unwrap().players,
            Some(Players::Text("2-4".into()))
        );
        assert!(records[1].game.is_none());
        assert_eq!(records[1].name(), None);
    }

    #[test]
    fn round_trips_without_null_noise() {
        let record = GameRecord {
            game: Some(GameInfo {
                name: "Tiny Game".into(),
                players: Some(Players::Count(1)),
                controls: vec!["keyboard".into()],
                description: None,
            }),
            team: None,
            winner: Some("no".into()),
            headerimage: None,
            images: vec![],
            download: vec![],
        };

        let yaml = serde_yaml::to_string(&vec![record]).unwrap();
        assert!(!yaml.contains("description"));
        assert!(!yaml.contains("null"));
    }

    #[test]
    fn gallery_items_allow_both_shapes() {
        let yaml = r#"
about:
  gallery:
    - jam_photo_1.webp
    - image: jam_photo_2.webp
      caption: The winners
"#;
        let homepage: Homepage = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(homepage.about.gallery[0].image(), "jam_photo_1.webp");
        assert_eq!(homepage.about.gallery[1].image(), "jam_photo_2.webp");
    }
}
