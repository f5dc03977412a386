//! Archive synchronization between the local `games/` tree and the bucket.
//!
//! Staleness is decided by content: uploads attach the archive's SHA-256 as
//! object metadata, and later runs compare that attribute against the local
//! checksum. Objects written by other tools lack the attribute; those fall
//! back to a size comparison.
//!
//! Bidirectional runs reconcile both ways: archives the bucket has and the
//! working copy lacks (or holds a differing version of) come down, archives
//! the bucket lacks go up. Whatever is still local-only afterwards is
//! reported as extraneous; deleting those files is a separate,
//! caller-confirmed step.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectMeta, ObjectStore, PutOptions,
    PutPayload,
};
use tracing::{debug, info, warn};

use jamgen_data::{sha256_file, ContentStore};

use crate::SyncError;

/// Attribute key carrying the archive checksum on remote objects.
const CHECKSUM_ATTRIBUTE: &str = "sha256";

/// Remote key prefix for all archives.
const REMOTE_PREFIX: &str = "games";

/// Transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Upload,
    Download,
    Bidirectional,
}

impl SyncMode {
    fn uploads(self) -> bool {
        matches!(self, SyncMode::Upload | SyncMode::Bidirectional)
    }

    fn downloads(self) -> bool {
        matches!(self, SyncMode::Download | SyncMode::Bidirectional)
    }
}

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: SyncMode,
    /// Log planned transfers without performing them
    pub dry_run: bool,
}

/// Counters for one sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub uploaded: usize,
    pub downloaded: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    /// Local archives the bucket still lacks after the transfer phases.
    /// The caller lists these and decides about deletion; sync itself
    /// never removes files.
    pub extraneous: Vec<LocalArchive>,
}

/// One archive known locally, either on disk or recorded in the data files.
#[derive(Debug, Clone)]
pub struct LocalArchive {
    /// Remote key relative to the prefix, e.g. `2024/space-lizards.zip`
    pub key: String,
    pub path: PathBuf,
    /// Checksum recorded in the games data file, if any
    pub recorded_checksum: Option<String>,
    pub exists: bool,
}

/// Collect every archive the project knows about: files under `games/{year}/`
/// plus download entries recorded in the data files whose file is missing
/// locally (those are download candidates).
pub fn collect_archives(
    store: &mut ContentStore,
    years: Option<&[u16]>,
) -> Result<Vec<LocalArchive>, SyncError> {
    let mut archives: BTreeMap<String, LocalArchive> = BTreeMap::new();

    let discovered = store.discover_years();
    let selected: Vec<u16> = match years {
        Some(filter) => discovered
            .into_iter()
            .filter(|y| filter.contains(y))
            .collect(),
        None => discovered,
    };

    for year in selected {
        let year_dir = store.paths().year_games_dir(year);

        let mut recorded: BTreeMap<String, Option<String>> = BTreeMap::new();
        for record in store.games(year)? {
            for download in &record.download {
                if !download.is_url() {
                    recorded.insert(download.file.clone(), download.checksum.clone());
                }
            }
        }

        if let Ok(entries) = fs::read_dir(&year_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if name == ".gitignore" || name == ".gitkeep" {
                    continue;
                }

                let key = format!("{year}/{name}");
                archives.insert(
                    key.clone(),
                    LocalArchive {
                        key,
                        recorded_checksum: recorded.get(name).cloned().flatten(),
                        path,
                        exists: true,
                    },
                );
            }
        }

        // Recorded but missing on disk
        for (name, checksum) in recorded {
            let key = format!("{year}/{name}");
            archives.entry(key.clone()).or_insert(LocalArchive {
                key,
                path: year_dir.join(&name),
                recorded_checksum: checksum,
                exists: false,
            });
        }
    }

    Ok(archives.into_values().collect())
}

/// Synchronizes archives with the remote bucket.
pub struct Syncer {
    remote: Arc<dyn ObjectStore>,
}

impl Syncer {
    pub fn new(remote: Arc<dyn ObjectStore>) -> Self {
        Self { remote }
    }

    /// Run one sync pass over the given archives.
    pub async fn sync(
        &self,
        archives: &[LocalArchive],
        options: &SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        let remote_objects = self.list_remote().await?;

        for archive in archives {
            let remote_missing = !remote_objects.contains_key(&archive.key);
            let result = match remote_objects.get(&archive.key) {
                None => self.sync_missing_remote(archive, options, &mut report).await,
                Some(meta) => self.sync_present(archive, meta, options, &mut report).await,
            };

            if let Err(e) = result {
                warn!("{}: {e}", archive.key);
                report.errors.push(format!("{}: {e}", archive.key));
                // A failed upload leaves the archive local-only; surface it
                // so the caller can decide what to do with the leftover.
                if remote_missing && archive.exists && options.mode == SyncMode::Bidirectional {
                    report.extraneous.push(archive.clone());
                }
            }
        }

        Ok(report)
    }

    async fn sync_missing_remote(
        &self,
        archive: &LocalArchive,
        options: &SyncOptions,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if !archive.exists {
            warn!("{} is neither local nor remote", archive.key);
            report
                .errors
                .push(format!("{}: missing on both sides", archive.key));
            return Ok(());
        }

        if !options.mode.uploads() {
            debug!("{} only exists locally, not uploading in this mode", archive.key);
            report.skipped += 1;
            return Ok(());
        }

        self.upload(archive, options, report).await
    }

    async fn sync_present(
        &self,
        archive: &LocalArchive,
        meta: &ObjectMeta,
        options: &SyncOptions,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if !archive.exists {
            if !options.mode.downloads() {
                report.skipped += 1;
                return Ok(());
            }
            return self.download(archive, options, report).await;
        }

        let local_checksum = match &archive.recorded_checksum {
            Some(checksum) => checksum.clone(),
            None => sha256_file(&archive.path).map_err(|e| SyncError::Io {
                path: archive.path.display().to_string(),
                message: e.to_string(),
            })?,
        };

        let unchanged = match self.remote_checksum(&archive.key).await? {
            Some(remote_checksum) => remote_checksum == local_checksum,
            None => {
                // Object predates checksum attributes
                let local_size = fs::metadata(&archive.path)
                    .map(|m| m.len())
                    .unwrap_or_default();
                meta.size == local_size
            }
        };

        if unchanged {
            debug!("{} is up to date", archive.key);
            report.skipped += 1;
            return Ok(());
        }

        // When both sides have the archive but disagree, the bucket wins
        // wherever this mode may download. Only upload-only mode pushes the
        // local version over a differing remote one.
        if options.mode.downloads() {
            return self.download(archive, options, report).await;
        }

        self.upload(archive, options, report).await
    }

    async fn upload(
        &self,
        archive: &LocalArchive,
        options: &SyncOptions,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if options.dry_run {
            info!("Would upload {}", archive.key);
            report.uploaded += 1;
            return Ok(());
        }

        let data = fs::read(&archive.path).map_err(|e| SyncError::Io {
            path: archive.path.display().to_string(),
            message: e.to_string(),
        })?;

        let checksum = match &archive.recorded_checksum {
            Some(checksum) => checksum.clone(),
            None => sha256_file(&archive.path).map_err(|e| SyncError::Io {
                path: archive.path.display().to_string(),
                message: e.to_string(),
            })?,
        };

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::Metadata(CHECKSUM_ATTRIBUTE.into()),
            AttributeValue::from(checksum),
        );

        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.remote
            .put_opts(&self.remote_path(&archive.key), PutPayload::from(data), opts)
            .await?;

        info!("Uploaded {}", archive.key);
        report.uploaded += 1;
        Ok(())
    }

    async fn download(
        &self,
        archive: &LocalArchive,
        options: &SyncOptions,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if options.dry_run {
            info!("Would download {}", archive.key);
            report.downloaded += 1;
            return Ok(());
        }

        let bytes = self
            .remote
            .get(&self.remote_path(&archive.key))
            .await?
            .bytes()
            .await?;

        if let Some(parent) = archive.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::Io {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        fs::write(&archive.path, &bytes).map_err(|e| SyncError::Io {
            path: archive.path.display().to_string(),
            message: e.to_string(),
        })?;

        info!("Downloaded {}", archive.key);
        report.downloaded += 1;
        Ok(())
    }

    /// Remote objects under the archive prefix, keyed by prefix-relative path.
    async fn list_remote(&self) -> Result<BTreeMap<String, ObjectMeta>, SyncError> {
        let prefix = ObjectPath::from(REMOTE_PREFIX);
        let objects: Vec<ObjectMeta> = self.remote.list(Some(&prefix)).try_collect().await?;

        Ok(objects
            .into_iter()
            .filter_map(|meta| {
                let key = meta
                    .location
                    .as_ref()
                    .strip_prefix(REMOTE_PREFIX)?
                    .trim_start_matches('/')
                    .to_string();
                Some((key, meta))
            })
            .collect())
    }

    async fn remote_checksum(&self, key: &str) -> Result<Option<String>, SyncError> {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = self.remote.get_opts(&self.remote_path(key), options).await?;

        Ok(result
            .attributes
            .get(&Attribute::Metadata(CHECKSUM_ATTRIBUTE.into()))
            .map(|value| value.as_ref().to_string()))
    }

    fn remote_path(&self, key: &str) -> ObjectPath {
        ObjectPath::from(format!("{REMOTE_PREFIX}/{key}"))
    }
}

/// Remove local archives that could not be reconciled with the bucket.
/// Called only after the user confirmed the listed candidates.
pub fn delete_local_archives(archives: &[LocalArchive]) -> SyncReport {
    let mut report = SyncReport::default();

    for archive in archives {
        match fs::remove_file(&archive.path) {
            Ok(()) => {
                info!("Deleted local {}", archive.key);
                report.deleted += 1;
            }
            Err(e) => {
                warn!("{}: {e}", archive.key);
                report.errors.push(format!("{}: {e}", archive.key));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use pretty_assertions::assert_eq;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn options(mode: SyncMode) -> SyncOptions {
        SyncOptions {
            mode,
            dry_run: false,
        }
    }

    fn archive(dir: &std::path::Path, key: &str, content: &[u8]) -> LocalArchive {
        let path = dir.join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        LocalArchive {
            key: key.to_string(),
            path,
            recorded_checksum: None,
            exists: true,
        }
    }

    #[tokio::test]
    async fn uploads_new_archive_with_checksum_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        let archives = vec![archive(dir.path(), "2024/beta.zip", b"hello world")];

        let report = syncer.sync(&archives, &options(SyncMode::Upload)).await.unwrap();

        assert_eq!(report.uploaded, 1);
        assert!(report.errors.is_empty());
        assert_eq!(
            syncer.remote_checksum("2024/beta.zip").await.unwrap().as_deref(),
            Some(HELLO_SHA256)
        );
    }

    #[tokio::test]
    async fn unchanged_archive_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        let archives = vec![archive(dir.path(), "2024/beta.zip", b"hello world")];

        syncer.sync(&archives, &options(SyncMode::Upload)).await.unwrap();
        let second = syncer.sync(&archives, &options(SyncMode::Upload)).await.unwrap();

        assert_eq!(second.uploaded, 0);
        assert_eq!(second.skipped, 1);
    }

    #[tokio::test]
    async fn changed_archive_is_reuploaded() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        let mut archives = vec![archive(dir.path(), "2024/beta.zip", b"hello world")];
        syncer.sync(&archives, &options(SyncMode::Upload)).await.unwrap();

        fs::write(&archives[0].path, b"patched build").unwrap();
        archives[0].recorded_checksum = None;

        let report = syncer.sync(&archives, &options(SyncMode::Upload)).await.unwrap();

        assert_eq!(report.uploaded, 1);
    }

    #[tokio::test]
    async fn downloads_missing_local_archive() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        // Seed the bucket through a separate upload
        let seed = archive(dir.path(), "2024/beta.zip", b"hello world");
        syncer.sync(&[seed.clone()], &options(SyncMode::Upload)).await.unwrap();
        fs::remove_file(&seed.path).unwrap();

        let missing = LocalArchive {
            exists: false,
            ..seed
        };
        let report = syncer
            .sync(&[missing.clone()], &options(SyncMode::Download))
            .await
            .unwrap();

        assert_eq!(report.downloaded, 1);
        assert_eq!(fs::read(&missing.path).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn bidirectional_uploads_local_only_archives() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        // A freshly added game the bucket has never seen
        let fresh = archive(dir.path(), "2025/new-game.zip", b"hello world");

        let report = syncer
            .sync(&[fresh.clone()], &options(SyncMode::Bidirectional))
            .await
            .unwrap();

        assert_eq!(report.uploaded, 1);
        assert_eq!(report.deleted, 0);
        assert!(report.extraneous.is_empty());
        assert!(fresh.path.exists());
        assert_eq!(
            syncer.remote_checksum("2025/new-game.zip").await.unwrap().as_deref(),
            Some(HELLO_SHA256)
        );
    }

    #[tokio::test]
    async fn bidirectional_conflict_takes_the_bucket_version() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        let entry = archive(dir.path(), "2024/beta.zip", b"published build");
        syncer.sync(&[entry.clone()], &options(SyncMode::Upload)).await.unwrap();

        // Local edit after publication; the bucket stays authoritative
        fs::write(&entry.path, b"local tinkering").unwrap();

        let report = syncer
            .sync(&[entry.clone()], &options(SyncMode::Bidirectional))
            .await
            .unwrap();

        assert_eq!(report.downloaded, 1);
        assert_eq!(report.uploaded, 0);
        assert_eq!(fs::read(&entry.path).unwrap(), b"published build");
    }

    #[tokio::test]
    async fn failed_upload_is_listed_as_extraneous() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        // Claims to exist on disk but the file is gone, so the upload fails
        let broken = LocalArchive {
            key: "2024/gone.zip".into(),
            path: dir.path().join("2024/gone.zip"),
            recorded_checksum: None,
            exists: true,
        };

        let report = syncer
            .sync(&[broken], &options(SyncMode::Bidirectional))
            .await
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.extraneous.len(), 1);
        assert_eq!(report.extraneous[0].key, "2024/gone.zip");
    }

    #[test]
    fn delete_local_archives_removes_the_files() {
        let dir = tempfile::tempdir().unwrap();
        let stray = archive(dir.path(), "2024/stray.zip", b"leftover");

        let report = delete_local_archives(&[stray.clone()]);

        assert_eq!(report.deleted, 1);
        assert!(report.errors.is_empty());
        assert!(!stray.path.exists());
    }

    #[tokio::test]
    async fn dry_run_transfers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let syncer = Syncer::new(Arc::clone(&remote));

        let archives = vec![archive(dir.path(), "2024/beta.zip", b"hello world")];

        let mut opts = options(SyncMode::Upload);
        opts.dry_run = true;
        let report = syncer.sync(&archives, &opts).await.unwrap();

        assert_eq!(report.uploaded, 1);
        assert!(syncer.list_remote().await.unwrap().is_empty());
    }

    #[test]
    fn collects_disk_files_and_recorded_entries() {
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
                "      checksum: abc\n",
                "    - file: lost.zip\n",
                "    - file: https://example.itch.io/beta\n",
            ),
        )
        .unwrap();
        fs::write(root.join("games/2024/beta.zip"), b"x").unwrap();
        fs::write(root.join("games/2024/extra.zip"), b"y").unwrap();
        fs::write(root.join("games/2024/.gitkeep"), b"").unwrap();

        let mut store = ContentStore::new(jamgen_data::ProjectPaths::new(root));
        let archives = collect_archives(&mut store, None).unwrap();

        let keys: Vec<&str> = archives.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["2024/beta.zip", "2024/extra.zip", "2024/lost.zip"]);

        let beta = &archives[0];
        assert!(beta.exists);
        assert_eq!(beta.recorded_checksum.as_deref(), Some("abc"));

        // Recorded but absent on disk becomes a download candidate
        let lost = &archives[2];
        assert!(!lost.exists);
    }
}
