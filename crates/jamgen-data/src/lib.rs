//! Content loading and data model for the game jam archive.
//!
//! Reads the structured content tree (`_data/jams/*.md`, `_data/games/games*.yaml`,
//! `_data/homepage.yaml`, `_data/rules.yaml`) into typed records and provides the
//! derived views (slugs, person aggregation, checksums) the site builder and the
//! maintenance commands share.

pub mod checksum;
pub mod config;
pub mod frontmatter;
pub mod models;
pub mod people;
pub mod slug;
pub mod store;

pub use checksum::sha256_file;
pub use config::{ProjectPaths, SiteConfig};
pub use frontmatter::{extract_frontmatter, FrontmatterError};
pub use models::{
    Download, GalleryItem, GameInfo, GameRecord, Homepage, JamMeta, Players, Rule, Screenshot,
    Sponsor, Sponsors, TeamInfo,
};
pub use people::{collect_people, normalize_name, Person, PersonCredit};
pub use slug::slugify;
pub use store::{ContentStore, DataError, LoadedYear};
