//! SHA-256 file hashing for download assets.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute the SHA-256 of a file as lowercase hex, streaming the contents.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.zip");
        fs::write(&path, b"hello world").unwrap();

        let hash = sha256_file(&path).unwrap();

        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn changing_one_byte_changes_the_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.zip");

        fs::write(&path, b"build-v1").unwrap();
        let first = sha256_file(&path).unwrap();

        fs::write(&path, b"build-v2").unwrap();
        let second = sha256_file(&path).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sha256_file(&dir.path().join("absent.zip")).is_err());
    }
}
