//! File checksum helpers

use bookferry_types::{Error, Result};
use std::path::Path;
use tokio::fs;

/// Compute the BLAKE3 checksum of a file, as a lowercase hex string
pub async fn hash_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let data = fs::read(path).await.map_err(|e| Error::Io {
        message: format!("Failed to read '{}' for checksum: {}", path.display(), e),
    })?;
    Ok(blake3::hash(&data).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_hash_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.pdf");
        fs::write(&file, b"content").await.unwrap();

        let first = hash_file(&file).await.unwrap();
        let second = hash_file(&file).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn test_hash_changes_with_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.pdf");
        fs::write(&file, b"one").await.unwrap();
        let before = hash_file(&file).await.unwrap();

        fs::write(&file, b"two").await.unwrap();
        let after = hash_file(&file).await.unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = hash_file(temp_dir.path().join("missing.pdf")).await;
        assert!(result.is_err());
    }
}
