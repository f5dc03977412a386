//! Checksum-gated file copying for download assets.

use std::fs;
use std::io;
use std::path::Path;

use jamgen_data::sha256_file;

/// What a gated copy actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Skipped,
}

/// Copy `source` to `target` unless the target already exists and its
/// SHA-256 matches `expected`. A mismatch, or a missing expected checksum,
/// always triggers a fresh copy; a stale file is never silently served.
pub fn copy_if_stale(
    source: &Path,
    target: &Path,
    expected: Option<&str>,
) -> io::Result<CopyOutcome> {
    if let Some(expected) = expected {
        if target.exists() && sha256_file(target)? == expected {
            return Ok(CopyOutcome::Skipped);
        }
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::copy(source, target)?;
    Ok(CopyOutcome::Copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn copies_when_target_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.zip");
        let target = dir.path().join("out/games/src.zip");
        fs::write(&source, b"hello world").unwrap();

        let outcome = copy_if_stale(&source, &target, Some(HELLO_SHA256)).unwrap();

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(fs::read(&target).unwrap(), b"hello world");
    }

    #[test]
    fn second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.zip");
        let target = dir.path().join("src-copy.zip");
        fs::write(&source, b"hello world").unwrap();

        assert_eq!(
            copy_if_stale(&source, &target, Some(HELLO_SHA256)).unwrap(),
            CopyOutcome::Copied
        );
        assert_eq!(
            copy_if_stale(&source, &target, Some(HELLO_SHA256)).unwrap(),
            CopyOutcome::Skipped
        );
    }

    #[test]
    fn checksum_mismatch_recopies() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.zip");
        let target = dir.path().join("target.zip");
        fs::write(&source, b"hello world").unwrap();
        fs::write(&target, b"hello-world").unwrap(); // one byte off

        let outcome = copy_if_stale(&source, &target, Some(HELLO_SHA256)).unwrap();

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(fs::read(&target).unwrap(), b"hello world");
    }

    #[test]
    fn missing_expected_checksum_always_copies() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.zip");
        let target = dir.path().join("target.zip");
        fs::write(&source, b"payload").unwrap();
        fs::write(&target, b"payload").unwrap();

        let outcome = copy_if_stale(&source, &target, None).unwrap();

        assert_eq!(outcome, CopyOutcome::Copied);
    }
}
