//! The image, video and audio tables and their detail editor.

use futures::future::join_all;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::common::errors::{WorkflowError, WorkflowResult};
use crate::config::AppConfig;
use crate::database::schema::asset::{AssetKind, AssetRecord, AssetRef, RecordId};
use crate::database::slot::SlotStorage;
use crate::database::store::{RecordStore, SaveOutcome};
use crate::models::dto::{AssetRow, Page, TableQuery};
use crate::workflow::asset::read_asset;
use crate::workflow::ident::generate_id;

/// Changes submitted from the detail modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetEdit {
    pub name: String,
    /// Comma separated, as typed
    pub tags: String,
    pub category: String,
    pub description: String,
}

impl AssetEdit {
    /// Prefill the modal from a record.
    pub fn from_record(record: &AssetRecord) -> Self {
        Self {
            name: record.name.clone(),
            tags: record.tags.join(", "),
            category: record.category.clone(),
            description: record.description.clone(),
        }
    }
}

/// Split a comma separated tag field, dropping blanks.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: Vec<RecordId>,
    /// Files whose media type does not belong in this table
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, WorkflowError)>,
}

/// One asset table (images, videos or audio files) over its collection slot.
pub struct AssetLibrary {
    kind: AssetKind,
    store: RecordStore<AssetRecord>,
    uploader: String,
    inline_limit: u64,
    page_size: usize,
}

impl AssetLibrary {
    pub fn open(kind: AssetKind, slots: Arc<dyn SlotStorage>, config: &AppConfig) -> Self {
        let store = RecordStore::open(slots, kind.collection(), config.slot_quota_bytes);
        info!("Opened {} table with {} records", kind, store.len());
        Self {
            kind,
            store,
            uploader: config.uploader.clone(),
            inline_limit: config.inline_asset_limit,
            page_size: config.page_size,
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn records(&self) -> &[AssetRecord] {
        self.store.records()
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    pub fn get(&self, id: &str) -> Option<&AssetRecord> {
        self.store.get(id)
    }

    /// Add an already read asset as a new record at the top of the table.
    pub fn add(&mut self, asset: AssetRef, name: impl Into<String>) -> WorkflowResult<RecordId> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(WorkflowError::Validation("Missing name".to_string()));
        }
        if !self.kind.accepts_media_type(&asset.media_type) {
            return Err(WorkflowError::Validation(format!(
                "{} is not a {} file",
                asset.media_type, self.kind
            )));
        }
        let record = AssetRecord::new(generate_id(), self.kind, name, asset, self.uploader.clone());
        let id = record.id;
        self.store.upsert(record);
        self.store.save();
        info!(record_id = id.as_str(); "Added {} asset", self.kind);
        Ok(id)
    }

    /// Read every file and add the ones that belong in this table.
    ///
    /// Files are read concurrently; records are added in the given order.
    pub async fn import_files(&mut self, paths: Vec<PathBuf>) -> ImportReport {
        let inline_limit = self.inline_limit;
        let results = join_all(paths.iter().map(|path| read_asset(path, inline_limit))).await;

        let mut report = ImportReport::default();
        let mut records = Vec::new();
        for (path, result) in paths.into_iter().zip(results) {
            match result {
                Ok(asset) if self.kind.accepts_media_type(&asset.media_type) => {
                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| asset.uri.clone());
                    records.push(AssetRecord::new(
                        generate_id(),
                        self.kind,
                        name,
                        asset,
                        self.uploader.clone(),
                    ));
                }
                Ok(asset) => {
                    warn!("Skipping {:?}: {} is not a {} file", path, asset.media_type, self.kind);
                    report.skipped.push(path);
                }
                Err(e) => {
                    warn!("{e}");
                    report.failed.push((path, e));
                }
            }
        }

        // Newest first: the last file ends up on top, as if added one by one.
        for record in records {
            report.added.push(record.id);
            self.store.upsert(record);
        }
        if !report.added.is_empty() {
            self.store.save();
        }
        info!(
            "Imported {} {} files ({} skipped, {} failed)",
            report.added.len(),
            self.kind,
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    /// Import every file under `dir` whose extension belongs to this table.
    pub async fn import_dir(&mut self, dir: impl AsRef<Path>) -> WorkflowResult<ImportReport> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(WorkflowError::Validation(format!("Not a directory: {:?}", dir)));
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let valid = entry
                        .path()
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| AssetKind::from_extension(ext) == Some(self.kind));
                    if valid {
                        paths.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to walk {:?}: {}", dir, e),
            }
        }
        Ok(self.import_files(paths).await)
    }

    /// Apply the detail modal to a record. Returns `false` for an unknown id.
    pub fn edit(&mut self, id: &str, edit: AssetEdit) -> WorkflowResult<bool> {
        let name = edit.name.trim();
        if name.is_empty() {
            return Err(WorkflowError::Validation("Missing name".to_string()));
        }
        let category = edit.category.trim();
        if !category.is_empty() && !self.kind.categories().contains(&category) {
            return Err(WorkflowError::Validation(format!(
                "Unknown {} category: {category}",
                self.kind
            )));
        }

        let Some(record) = self.store.get_mut(id) else {
            warn!(record_id = id; "Edit for unknown {} asset ignored", self.kind);
            return Ok(false);
        };
        record.name = name.to_string();
        record.tags = parse_tags(&edit.tags);
        record.category = category.to_string();
        record.description = edit.description.trim().to_string();
        self.store.save();
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        if self.store.remove(id).is_none() {
            warn!(record_id = id; "Delete for unknown {} asset ignored", self.kind);
            return false;
        }
        self.store.save();
        info!(record_id = id; "Deleted {} asset", self.kind);
        true
    }

    /// Hand-off point for records approved on a workflow board.
    pub fn receive_archived(&mut self, record: AssetRecord) -> SaveOutcome {
        info!(record_id = record.id.as_str(); "Archived approved request into {}", self.store.key());
        self.store.upsert(record);
        self.store.save()
    }

    pub fn query(&self, query: &TableQuery) -> Page<&AssetRecord> {
        let mut query = query.clone();
        if query.page_size == 0 {
            query.page_size = self.page_size;
        }
        query.apply(self.store.records())
    }

    pub fn rows(&self, query: &TableQuery) -> Page<AssetRow> {
        self.query(query).map(AssetRow::from)
    }
}
