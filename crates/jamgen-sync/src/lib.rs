//! Synchronization of game download archives with a Cloudflare R2 bucket.
//!
//! The bucket is treated as a mirror of `games/{year}/{file}`. Staleness is
//! decided by content checksums, not timestamps, so a fresh clone and a
//! long-lived checkout reach the same conclusions.

pub mod config;
pub mod sync;

pub use config::R2Config;
pub use sync::{
    collect_archives, delete_local_archives, LocalArchive, SyncMode, SyncOptions, SyncReport,
    Syncer,
};

/// Errors from configuration or transfer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Missing environment variable {name}")]
    MissingEnv { name: &'static str },

    #[error(transparent)]
    Store(#[from] object_store::Error),

    #[error(transparent)]
    Data(#[from] jamgen_data::DataError),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}
