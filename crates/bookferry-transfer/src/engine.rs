//! The pre-ingest transfer engine
//!
//! Drives the per-item decision: an item that has never been ingested is
//! checked against the readiness policy and, if ready, copied wholesale to
//! the permanent ingest destination; an item that has been ingested is
//! checked for new or changed files, which are routed by suffix to the
//! content or metadata update destination.
//!
//! All decisions are recorded in the item's transfer registry so that a
//! rerun over an unchanged source tree is a no-op.

use crate::{copy, metadata, scan};
use bookferry_config::Config;
use bookferry_registry::TransferRegistry;
use bookferry_types::suffix::{has_suffix, matches_any_format, matches_any_suffix};
use bookferry_types::{BookType, Error, Result, TransferOutcome, TransferSummary};
use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info, trace, warn};

/// Transfer engine for pre-ingest decisions
///
/// The engine is cheap to clone and safe to share; all mutable state lives
/// in the per-item registries on disk.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    config: Arc<Config>,
    // ebook and audio formats merged; a file of either kind counts as
    // content no matter which root it sits under
    content_formats: Arc<Vec<String>>,
}

impl TransferEngine {
    /// Create a new engine from a validated configuration
    pub fn new(config: Config) -> Self {
        let mut content_formats = config.ebook_formats.clone();
        for format in &config.audio_formats {
            if !content_formats.contains(format) {
                content_formats.push(format.clone());
            }
        }
        Self {
            config: Arc::new(config),
            content_formats: Arc::new(content_formats),
        }
    }

    /// Access the engine's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every item under both source roots
    ///
    /// When the ebook and audio roots point at the same directory, the root
    /// is processed once, as ebooks.
    pub async fn transfer_ready_books(&self) -> Result<TransferSummary> {
        let mut summary = self
            .transfer_directory(&self.config.ebook_source_dir, BookType::Ebook)
            .await?;

        if self.config.audio_source_dir == self.config.ebook_source_dir {
            info!(
                "Audio source equals ebook source ({}), processing it once",
                self.config.ebook_source_dir.display()
            );
        } else {
            let audio = self
                .transfer_directory(&self.config.audio_source_dir, BookType::Audio)
                .await?;
            summary.merge(&audio);
        }

        info!(
            "Transfer run finished: {} processed, {} ingested, {} updated, {} skipped, {} failed",
            summary.processed, summary.ingested, summary.updated, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Process every item directory under one source root
    ///
    /// Items are processed with bounded concurrency. A failing item is
    /// logged and counted; it never aborts the batch.
    pub async fn transfer_directory(
        &self,
        base_dir: &Path,
        book_type: BookType,
    ) -> Result<TransferSummary> {
        let mut entries = match fs::read_dir(base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Cannot read {} source root '{}': {}",
                    book_type,
                    base_dir.display(),
                    e
                );
                return Ok(TransferSummary::new());
            }
        };

        let mut item_dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::Io {
            message: format!(
                "Failed to iterate directory '{}': {}",
                base_dir.display(),
                e
            ),
        })? {
            item_dirs.push(entry.path());
        }
        item_dirs.sort();

        debug!(
            "Processing {} entries under {} as {}",
            item_dirs.len(),
            base_dir.display(),
            book_type
        );

        let summary = stream::iter(item_dirs)
            .map(|item_dir| async move {
                let result = self.transfer_book(&item_dir, book_type).await;
                (item_dir, result)
            })
            .buffer_unordered(self.config.workers.max(1))
            .fold(
                TransferSummary::new(),
                |mut summary, (item_dir, result)| async move {
                    match result {
                        Ok(outcome) => summary.record(outcome),
                        Err(e) => {
                            error!("Transfer of '{}' failed: {}", item_dir.display(), e);
                            summary.record_failure();
                        }
                    }
                    summary
                },
            )
            .await;

        Ok(summary)
    }

    /// Process one item directory: ingest if never ingested, update otherwise
    pub async fn transfer_book(
        &self,
        item_dir: &Path,
        book_type: BookType,
    ) -> Result<TransferOutcome> {
        if !item_dir.is_dir() {
            trace!("Ignoring non-directory entry {}", item_dir.display());
            return Ok(TransferOutcome::Skipped);
        }

        let mut registry = TransferRegistry::load(item_dir).await?;

        if registry.ingest_date().is_none() {
            if self.ingest_book(item_dir, &mut registry, book_type).await? {
                Ok(TransferOutcome::Ingested)
            } else {
                Ok(TransferOutcome::Skipped)
            }
        } else {
            let copied = self.update_book(item_dir, &mut registry, book_type).await?;
            if copied > 0 {
                Ok(TransferOutcome::Updated(copied))
            } else {
                Ok(TransferOutcome::UpToDate)
            }
        }
    }

    /// Evaluate the readiness policy for an item
    ///
    /// The checks run in order and short-circuit on the first failure:
    /// required formats first, then the creation/modification retention
    /// windows over the item's content files, then the publication window
    /// against the metadata document. A check whose threshold is negative is
    /// disabled and always passes.
    pub async fn ready_for_ingest(&self, item_dir: &Path) -> Result<bool> {
        let policy = &self.config.transfer;
        let files = scan::list_files(item_dir).await?;

        for format in &policy.required_formats {
            let dotted = format!(".{format}");
            if !files.iter().any(|f| has_suffix(f, &dotted)) {
                debug!(
                    "{} is missing a required '{}' file",
                    item_dir.display(),
                    format
                );
                return Ok(false);
            }
        }

        if policy.retain_create_ms >= 0 || policy.retain_modify_ms >= 0 {
            for file in files
                .iter()
                .filter(|f| matches_any_format(f, &self.content_formats))
            {
                if !self.has_content_file_date(file).await? {
                    debug!(
                        "{} is still inside a retention window",
                        file.display()
                    );
                    return Ok(false);
                }
            }
        }

        if policy.retain_publication_ms >= 0 {
            let Some(document) = files
                .iter()
                .find(|f| matches_any_suffix(f, &policy.metadata_suffixes))
            else {
                debug!(
                    "{} has no metadata document for the publication check",
                    item_dir.display()
                );
                return Ok(false);
            };

            let Some(publication) = metadata::find_publication_date(document).await? else {
                debug!("{} carries no publication date", document.display());
                return Ok(false);
            };

            let threshold = Utc::now() - Duration::milliseconds(policy.retain_publication_ms);
            if publication > threshold {
                debug!(
                    "{} was published too recently ({})",
                    item_dir.display(),
                    publication
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Check one content file against the creation and modification windows
    ///
    /// On file systems without birth-time support, the modification time
    /// stands in for the creation time.
    pub async fn has_content_file_date(&self, file: &Path) -> Result<bool> {
        let policy = &self.config.transfer;
        let file_metadata = fs::metadata(file).await.map_err(|e| Error::Io {
            message: format!("Failed to read metadata for '{}': {}", file.display(), e),
        })?;
        let now = Utc::now();

        if policy.retain_create_ms >= 0 {
            let created = file_metadata
                .created()
                .or_else(|_| file_metadata.modified())
                .map_err(|e| Error::Io {
                    message: format!(
                        "Failed to read creation time for '{}': {}",
                        file.display(),
                        e
                    ),
                })?;
            if chrono::DateTime::<Utc>::from(created)
                > now - Duration::milliseconds(policy.retain_create_ms)
            {
                return Ok(false);
            }
        }

        if policy.retain_modify_ms >= 0 {
            let modified = scan::modified_time(file).await?;
            if modified > now - Duration::milliseconds(policy.retain_modify_ms) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// One-time ingest: copy the whole item tree to the permanent destination
    ///
    /// Returns `false` without copying anything when the item is not ready.
    /// On success the registry is stamped with the ingest date and the
    /// content files are fingerprinted.
    pub async fn ingest_book(
        &self,
        item_dir: &Path,
        registry: &mut TransferRegistry,
        book_type: BookType,
    ) -> Result<bool> {
        if !self.ready_for_ingest(item_dir).await? {
            debug!("{} is not ready for ingest", item_dir.display());
            return Ok(false);
        }

        let item_id = item_id(item_dir)?;
        let dest = self.ingest_dir(book_type).join(&item_id);
        info!(
            "Ingesting {} '{}' into {}",
            book_type,
            item_id,
            dest.display()
        );

        copy::copy_dir_recursive(item_dir, &dest).await?;

        let files = scan::list_files(item_dir).await?;
        let content: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| matches_any_format(f, &self.content_formats))
            .collect();

        registry.set_ingest_date(Utc::now());
        registry.update_file_entries(&content).await?;
        registry.save().await?;
        Ok(true)
    }

    /// Propagate new and changed files for an already-ingested item
    ///
    /// Content files count as changed when they were modified after the
    /// item's latest transfer date and their checksum no longer matches the
    /// registry. Characterization files go to the content destination and
    /// metadata files to the metadata destination, on modification time
    /// alone. Returns the number of files copied.
    ///
    /// If a copy fails partway, fingerprints and the update date for the
    /// files that did make it across are still persisted before the error is
    /// returned, so a rerun does not recopy them.
    pub async fn update_book(
        &self,
        item_dir: &Path,
        registry: &mut TransferRegistry,
        book_type: BookType,
    ) -> Result<u64> {
        let Some(since) = registry.latest_update_date() else {
            warn!(
                "Cannot update '{}' before it has been ingested",
                item_dir.display()
            );
            return Ok(0);
        };

        let policy = &self.config.transfer;
        let files = scan::list_files(item_dir).await?;

        let mut content_updates = Vec::new();
        for file in files
            .iter()
            .filter(|f| matches_any_format(f, &self.content_formats))
        {
            if scan::modified_after(file, since).await? && !registry.verify_file(file).await? {
                content_updates.push(file.clone());
            }
        }

        let mut characterization_updates = Vec::new();
        for file in files
            .iter()
            .filter(|f| matches_any_suffix(f, &policy.characterization_suffixes))
        {
            if scan::modified_after(file, since).await? {
                characterization_updates.push(file.clone());
            }
        }

        let mut metadata_updates = Vec::new();
        for file in files
            .iter()
            .filter(|f| matches_any_suffix(f, &policy.metadata_suffixes))
        {
            if scan::modified_after(file, since).await? {
                metadata_updates.push(file.clone());
            }
        }

        if content_updates.is_empty()
            && characterization_updates.is_empty()
            && metadata_updates.is_empty()
        {
            debug!("Nothing to update for {}", item_dir.display());
            return Ok(0);
        }

        let item_id = item_id(item_dir)?;
        let content_dest = self.update_content_dir(book_type).join(&item_id);
        let metadata_dest = self.update_metadata_dir(book_type).join(&item_id);

        let mut copied = 0u64;
        let mut copied_content = Vec::new();
        let mut failure = None;

        for file in &content_updates {
            match copy::copy_file_into(file, &content_dest).await {
                Ok(_) => {
                    copied_content.push(file.clone());
                    copied += 1;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if failure.is_none() {
            for file in &characterization_updates {
                match copy::copy_file_into(file, &content_dest).await {
                    Ok(_) => copied += 1,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }
        if failure.is_none() {
            for file in &metadata_updates {
                match copy::copy_file_into(file, &metadata_dest).await {
                    Ok(_) => copied += 1,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        if copied > 0 {
            registry.update_file_entries(&copied_content).await?;
            registry.set_update_date(Utc::now());
            registry.save().await?;
        }

        match failure {
            Some(e) => Err(e),
            None => {
                info!(
                    "Updated {} '{}': {} files propagated",
                    book_type,
                    item_id,
                    copied
                );
                Ok(copied)
            }
        }
    }

    fn ingest_dir(&self, book_type: BookType) -> &Path {
        match book_type {
            BookType::Ebook => &self.config.transfer.ebook_ingest_dir,
            BookType::Audio => &self.config.transfer.audio_ingest_dir,
        }
    }

    fn update_content_dir(&self, book_type: BookType) -> &Path {
        match book_type {
            BookType::Ebook => &self.config.transfer.update_ebook_content_dir,
            BookType::Audio => &self.config.transfer.update_audio_content_dir,
        }
    }

    fn update_metadata_dir(&self, book_type: BookType) -> &Path {
        match book_type {
            BookType::Ebook => &self.config.transfer.update_ebook_metadata_dir,
            BookType::Audio => &self.config.transfer.update_audio_metadata_dir,
        }
    }
}

fn item_id(item_dir: &Path) -> Result<String> {
    item_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::other(format!(
                "Item directory has no name: {}",
                item_dir.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.ebook_source_dir = root.join("source/ebook");
        config.audio_source_dir = root.join("source/audio");
        config.transfer.ebook_ingest_dir = root.join("ingest/ebook");
        config.transfer.audio_ingest_dir = root.join("ingest/audio");
        config.transfer.update_ebook_content_dir = root.join("update/ebook/content");
        config.transfer.update_audio_content_dir = root.join("update/audio/content");
        config.transfer.update_ebook_metadata_dir = root.join("update/ebook/metadata");
        config.transfer.update_audio_metadata_dir = root.join("update/audio/metadata");
        config
    }

    async fn make_item(config: &Config, id: &str) -> PathBuf {
        let item_dir = config.ebook_source_dir.join(id);
        fs::create_dir_all(&item_dir).await.unwrap();
        fs::write(item_dir.join(format!("{id}.pdf")), b"pdf content")
            .await
            .unwrap();
        item_dir
    }

    fn bump_mtime(path: &Path, seconds_from_now: i64) {
        let target = FileTime::from_unix_time(
            Utc::now().timestamp() + seconds_from_now,
            0,
        );
        filetime::set_file_mtime(path, target).unwrap();
    }

    #[tokio::test]
    async fn test_not_ready_without_required_format() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());

        let item_dir = config.ebook_source_dir.join("b1");
        fs::create_dir_all(&item_dir).await.unwrap();
        fs::write(item_dir.join("b1.epub"), b"epub only").await.unwrap();

        assert!(!engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ready_with_windows_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        assert!(engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_modify_window_blocks_fresh_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.transfer.retain_modify_ms = 3_600_000; // one hour
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        assert!(!engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());

        // age the file past the window
        bump_mtime(&item_dir.join("b1.pdf"), -7200);
        assert!(engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_create_window_blocks_fresh_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.transfer.retain_create_ms = 3_600_000;
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        // the file was just created, so it sits inside the window
        assert!(!engine.ready_for_ingest(&item_dir).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_create_window_short_circuits_publication_check() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.transfer.retain_create_ms = 3_600_000;
        config.transfer.retain_publication_ms = 0;
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        // the metadata document would blow up the publication check, but a
        // content file inside the create window is evaluated first
        fs::write(item_dir.join("b1.meta.json"), b"<not json>")
            .await
            .unwrap();

        assert!(!engine.ready_for_ingest(&item_dir).await.unwrap());

        // without the create window in the way, the publication check runs
        // and surfaces the malformed document
        let mut open_config = test_config(temp_dir.path());
        open_config.transfer.retain_publication_ms = 0;
        let open_engine = TransferEngine::new(open_config);
        assert!(open_engine.ready_for_ingest(&item_dir).await.is_err());
    }

    #[tokio::test]
    async fn test_publication_window() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.transfer.retain_publication_ms = 0;
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        // no metadata document: not ready
        assert!(!engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());

        // document without a publication date: not ready
        let doc = item_dir.join("b1.meta.json");
        fs::write(&doc, r#"{"title": "Some Book"}"#).await.unwrap();
        assert!(!engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());

        // past publication date: ready
        fs::write(&doc, r#"{"publication_date": "2019-03-15"}"#)
            .await
            .unwrap();
        assert!(engine
            .ready_for_ingest(&item_dir)
            .await
            .unwrap());

        // malformed document: fatal
        fs::write(&doc, b"<xml/>").await.unwrap();
        assert!(engine
            .ready_for_ingest(&item_dir)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_ingest_copies_tree_and_stamps_registry() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;
        fs::write(item_dir.join("b1.meta.json"), b"{}").await.unwrap();

        let outcome = engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Ingested);

        let dest = config.transfer.ebook_ingest_dir.join("b1");
        assert!(dest.join("b1.pdf").exists());
        assert!(dest.join("b1.meta.json").exists());

        let registry = TransferRegistry::load(&item_dir).await.unwrap();
        assert!(registry.ingest_date().is_some());
        assert_eq!(registry.file_entry_count(), 1); // only the content file
    }

    #[tokio::test]
    async fn test_second_run_is_up_to_date() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        let outcome = engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::UpToDate);
    }

    #[tokio::test]
    async fn test_changed_content_is_propagated() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;
        let pdf = item_dir.join("b1.pdf");

        engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();

        fs::write(&pdf, b"revised pdf content").await.unwrap();
        bump_mtime(&pdf, 60);

        let outcome = engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Updated(1));
        assert!(config
            .transfer
            .update_ebook_content_dir
            .join("b1")
            .join("b1.pdf")
            .exists());

        let registry = TransferRegistry::load(&item_dir).await.unwrap();
        assert!(registry.update_date().is_some());
        assert!(registry.verify_file(&pdf).await.unwrap());
    }

    #[tokio::test]
    async fn test_touched_but_identical_content_is_not_recopied() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();

        // newer mtime, same bytes: the checksum rules it out
        bump_mtime(&item_dir.join("b1.pdf"), 60);
        let outcome = engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::UpToDate);
    }

    #[tokio::test]
    async fn test_metadata_routed_to_metadata_destination() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();

        let doc = item_dir.join("b1.meta.json");
        fs::write(&doc, r#"{"title": "Revised"}"#).await.unwrap();
        bump_mtime(&doc, 60);
        let characterization = item_dir.join("b1.characterization.json");
        fs::write(&characterization, b"{}").await.unwrap();
        bump_mtime(&characterization, 60);

        let outcome = engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Updated(2));

        assert!(config
            .transfer
            .update_ebook_metadata_dir
            .join("b1")
            .join("b1.meta.json")
            .exists());
        assert!(config
            .transfer
            .update_ebook_content_dir
            .join("b1")
            .join("b1.characterization.json")
            .exists());
        // metadata is copied, never fingerprinted
        let registry = TransferRegistry::load(&item_dir).await.unwrap();
        assert!(!registry.has_file_entry(&doc));
    }

    #[tokio::test]
    async fn test_partial_copy_failure_keeps_entries_for_copied_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;
        let pdf = item_dir.join("b1.pdf");

        engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();

        // a delivery touching both the content file and the metadata doc
        fs::write(&pdf, b"revised pdf content").await.unwrap();
        bump_mtime(&pdf, 60);
        let doc = item_dir.join("b1.meta.json");
        fs::write(&doc, r#"{"title": "Revised"}"#).await.unwrap();
        bump_mtime(&doc, 60);

        // block the metadata destination: a plain file where the update
        // pass needs to create a directory
        let metadata_root = &config.transfer.update_ebook_metadata_dir;
        fs::create_dir_all(metadata_root.parent().unwrap())
            .await
            .unwrap();
        fs::write(metadata_root, b"in the way").await.unwrap();

        // content copies first, then the metadata copy fails
        let result = engine.transfer_book(&item_dir, BookType::Ebook).await;
        assert!(result.is_err());

        let copied_pdf = config
            .transfer
            .update_ebook_content_dir
            .join("b1")
            .join("b1.pdf");
        assert!(copied_pdf.exists());

        // the copied file's fingerprint and the update date survived the
        // failure
        let registry = TransferRegistry::load(&item_dir).await.unwrap();
        assert!(registry.update_date().is_some());
        assert!(registry.verify_file(&pdf).await.unwrap());

        // retry after clearing the blocker: only the metadata doc moves,
        // the content file is not copied again
        fs::remove_file(metadata_root).await.unwrap();
        fs::remove_file(&copied_pdf).await.unwrap();

        let outcome = engine
            .transfer_book(&item_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Updated(1));
        assert!(!copied_pdf.exists());
        assert!(config
            .transfer
            .update_ebook_metadata_dir
            .join("b1")
            .join("b1.meta.json")
            .exists());
    }

    #[tokio::test]
    async fn test_update_without_ingest_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());
        let item_dir = make_item(&config, "b1").await;

        let mut registry = TransferRegistry::load(&item_dir).await.unwrap();
        let copied = engine
            .update_book(&item_dir, &mut registry, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(copied, 0);
    }

    #[tokio::test]
    async fn test_directory_batch_counts_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());

        make_item(&config, "b1").await;
        make_item(&config, "b2").await;
        // missing the required pdf, so it stays skipped
        let not_ready = config.ebook_source_dir.join("b3");
        fs::create_dir_all(&not_ready).await.unwrap();
        fs::write(not_ready.join("b3.epub"), b"epub").await.unwrap();

        let summary = engine
            .transfer_directory(&config.ebook_source_dir, BookType::Ebook)
            .await
            .unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.ingested, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_missing_source_root_is_empty_summary() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let engine = TransferEngine::new(config.clone());

        let summary = engine
            .transfer_directory(&config.audio_source_dir, BookType::Audio)
            .await
            .unwrap();
        assert_eq!(summary, TransferSummary::new());
    }

    #[tokio::test]
    async fn test_shared_source_root_processed_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.audio_source_dir = config.ebook_source_dir.clone();
        let engine = TransferEngine::new(config.clone());
        make_item(&config, "b1").await;

        let summary = engine.transfer_ready_books().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.ingested, 1);
    }
}
