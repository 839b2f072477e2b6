//! Copy operations that preserve source modification times
//!
//! Destinations must reflect when the publisher last touched a file, not when
//! the transfer happened to run, so every copy restores the source mtime on
//! the destination after the byte copy completes.

use bookferry_types::{Error, Result};
use filetime::FileTime;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::trace;

/// Copy one file to an explicit destination path, preserving its mtime
///
/// Parent directories of the destination are created as needed. An existing
/// destination file is overwritten.
pub async fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await.map_err(|e| Error::Io {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }

    let bytes = fs::copy(source, dest).await.map_err(|e| Error::Io {
        message: format!(
            "Failed to copy '{}' to '{}': {}",
            source.display(),
            dest.display(),
            e
        ),
    })?;
    trace!("Copied {} bytes: {} -> {}", bytes, source.display(), dest.display());

    preserve_mtime(source, dest).await
}

/// Copy one file into a destination directory, keeping its file name
///
/// Returns the path of the created destination file.
pub async fn copy_file_into(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        Error::other(format!(
            "Cannot copy a path without a file name: {}",
            source.display()
        ))
    })?;
    let dest = dest_dir.join(file_name);
    copy_file(source, &dest).await?;
    Ok(dest)
}

/// Recursively copy a directory tree, preserving file mtimes
pub async fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).await.map_err(|e| Error::Io {
        message: format!("Failed to create directory '{}': {}", dest.display(), e),
    })?;

    let mut entries = fs::read_dir(source).await.map_err(|e| Error::Io {
        message: format!("Failed to read directory '{}': {}", source.display(), e),
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::Io {
        message: format!("Failed to iterate directory '{}': {}", source.display(), e),
    })? {
        let entry_source = entry.path();
        let entry_dest = dest.join(entry.file_name());
        let file_type = entry.file_type().await.map_err(|e| Error::Io {
            message: format!("Failed to stat '{}': {}", entry_source.display(), e),
        })?;

        if file_type.is_dir() {
            Box::pin(copy_dir_recursive(&entry_source, &entry_dest)).await?;
        } else if file_type.is_file() {
            copy_file(&entry_source, &entry_dest).await?;
        }
        // Symlinks are not part of publisher deliveries and are skipped.
    }
    Ok(())
}

async fn preserve_mtime(source: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::metadata(source).await.map_err(|e| Error::Io {
        message: format!("Failed to read metadata for '{}': {}", source.display(), e),
    })?;

    if let Ok(modified) = metadata.modified() {
        filetime::set_file_mtime(dest, FileTime::from_system_time(modified)).map_err(|e| {
            Error::Io {
                message: format!(
                    "Failed to set modification time for '{}': {}",
                    dest.display(),
                    e
                ),
            }
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_file_preserves_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("b1.pdf");
        fs::write(&source, b"pdf bytes").await.unwrap();

        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&source, old).unwrap();

        let dest = temp_dir.path().join("out").join("b1.pdf");
        copy_file(&source, &dest).await.unwrap();

        let copied = fs::metadata(&dest).await.unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&copied).unix_seconds(),
            old.unix_seconds()
        );
        assert_eq!(fs::read(&dest).await.unwrap(), b"pdf bytes");
    }

    #[tokio::test]
    async fn test_copy_file_into_keeps_name() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("b1.epub");
        fs::write(&source, b"epub").await.unwrap();

        let dest_dir = temp_dir.path().join("dest");
        let dest = copy_file_into(&source, &dest_dir).await.unwrap();
        assert!(dest.ends_with("b1.epub"));
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_copy_dir_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("b1");
        fs::create_dir_all(source.join("extras")).await.unwrap();
        fs::write(source.join("b1.pdf"), b"pdf").await.unwrap();
        fs::write(source.join("extras").join("cover.jpg"), b"jpg")
            .await
            .unwrap();

        let dest = temp_dir.path().join("out").join("b1");
        copy_dir_recursive(&source, &dest).await.unwrap();

        assert!(dest.join("b1.pdf").exists());
        assert!(dest.join("extras").join("cover.jpg").exists());
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = copy_file(
            &temp_dir.path().join("missing.pdf"),
            &temp_dir.path().join("out.pdf"),
        )
        .await;
        assert!(result.is_err());
    }
}
