//! Static site builder for the game jam archive.
//!
//! Turns the structured content tree into a static HTML site: pages are
//! generated in memory from data records, rendered through embedded
//! templates, and media plus download assets are copied into the output tree
//! by an explicitly ordered stage pipeline.

pub mod builder;
pub mod copy;
pub mod pages;
pub mod stages;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder};
pub use copy::{copy_if_stale, CopyOutcome};
pub use pages::{generate_pages, output_path, GameSummary, MemberRef, Page};
pub use stages::{BuildContext, BuildStage, BuildStats, StageOutcome};
pub use templates::{render_markdown, TemplateEngine};
