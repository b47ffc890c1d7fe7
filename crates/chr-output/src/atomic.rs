//! Atomic file replacement.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{OutputError, Result};

/// Hex SHA-256 of a byte buffer.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Writes `bytes` to `path` through a temp file in the same directory.
///
/// Either the whole new content lands at `path` or the previous file is left
/// untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| OutputError::Io {
        operation: "create directory",
        path: dir.clone(),
        source: e,
    })?;

    let mut file = NamedTempFile::new_in(&dir).map_err(|e| OutputError::Io {
        operation: "create temp file in",
        path: dir.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| OutputError::Io {
        operation: "write",
        path: file.path().to_path_buf(),
        source: e,
    })?;
    file.as_file().sync_all().map_err(|e| OutputError::Io {
        operation: "sync",
        path: file.path().to_path_buf(),
        source: e,
    })?;

    file.persist(path)
        .map_err(|e| OutputError::AtomicWriteFailed {
            target_path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("out.csv")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("data/out.csv")), PathBuf::from("data"));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
