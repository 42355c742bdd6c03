//! Index Store
//!
//! Lightweight listings that avoid opening every record file:
//! - [`DraftIndexEntry`]: one row per local draft
//! - [`RecordIndexEntry`]: one row per finalized, exported record
//!
//! Both live in an [`IndexDocument`] persisted through an [`IndexRepository`].
//! [`JsonIndexFile`] is the on-disk implementation; [`MemoryIndex`] backs tests
//! and embedders that manage persistence themselves.

use crate::error::StoreResult;
use crate::layout::{read_json, write_json_atomic};
use chrono::{DateTime, NaiveDate, Utc};
use onboard_record::{Record, RecordId};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Schema version written into every index document
pub const INDEX_SCHEMA_VERSION: &str = "1.0";

/// A row keyed by record identifier
pub trait IndexEntry: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key of this row
    fn record_id(&self) -> RecordId;
}

/// Listing row for a local draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftIndexEntry {
    /// Draft identifier
    pub record_id: RecordId,
    /// "Last, First"
    pub employee_name: String,
    /// When the draft was created
    pub created_at: DateTime<Utc>,
    /// Last persisted write
    pub last_modified: DateTime<Utc>,
    /// Resolved draft file
    pub draft_file_path: PathBuf,
    /// Zero-based page the user last viewed
    #[serde(default)]
    pub last_page_index: usize,
}

impl DraftIndexEntry {
    /// Row describing `record` stored at `path`
    #[must_use]
    pub fn from_record(record: &Record, path: PathBuf, last_page_index: usize) -> Self {
        Self {
            record_id: record.id(),
            employee_name: record.display_name(),
            created_at: record.created_at,
            last_modified: record.last_modified(),
            draft_file_path: path,
            last_page_index,
        }
    }
}

impl IndexEntry for DraftIndexEntry {
    fn record_id(&self) -> RecordId {
        self.record_id
    }
}

/// Listing row for a finalized record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIndexEntry {
    /// Record identifier
    pub record_id: RecordId,
    /// "Last, First"
    pub employee_name: String,
    /// Department at the time of finalization
    #[serde(default)]
    pub department: String,
    /// Finalization time
    pub finalized_at: DateTime<Utc>,
    /// Employee start date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Exported JSON
    pub json_path: PathBuf,
    /// Exported PDF
    #[serde(default)]
    pub pdf_path: Option<PathBuf>,
    /// Exported files were present at the last check
    #[serde(default)]
    pub last_verified: bool,
    /// When the last check ran
    #[serde(default)]
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl IndexEntry for RecordIndexEntry {
    fn record_id(&self) -> RecordId {
        self.record_id
    }
}

/// Versioned list of entries, at most one per identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument<E> {
    /// Schema version tag
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default = "Vec::new")]
    entries: Vec<E>,
}

fn default_schema_version() -> String {
    INDEX_SCHEMA_VERSION.to_string()
}

impl<E> Default for IndexDocument<E> {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            entries: Vec::new(),
        }
    }
}

impl<E: IndexEntry> IndexDocument<E> {
    /// Empty document at the current schema version
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Take ownership of the entries
    #[inline]
    #[must_use]
    pub fn into_entries(self) -> Vec<E> {
        self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `id`
    #[must_use]
    pub fn find(&self, id: RecordId) -> Option<&E> {
        self.entries.iter().find(|e| e.record_id() == id)
    }

    /// Mutable entry for `id`
    pub fn find_mut(&mut self, id: RecordId) -> Option<&mut E> {
        self.entries.iter_mut().find(|e| e.record_id() == id)
    }

    /// True when an entry for `id` exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.find(id).is_some()
    }

    /// Replace the entry with the same id in place, or append
    ///
    /// Returns `true` when the entry was new.
    pub fn upsert(&mut self, entry: E) -> bool {
        match self.find_mut(entry.record_id()) {
            Some(existing) => {
                *existing = entry;
                false
            }
            None => {
                self.entries.push(entry);
                true
            }
        }
    }

    /// Remove the entry for `id`
    pub fn remove(&mut self, id: RecordId) -> Option<E> {
        let pos = self.entries.iter().position(|e| e.record_id() == id)?;
        Some(self.entries.remove(pos))
    }

    /// Keep entries matching `keep`, returning the ones dropped
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) -> Vec<E> {
        let (kept, dropped) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| keep(e));
        self.entries = kept;
        dropped
    }
}

/// Persistence seam for an index document
pub trait IndexRepository<E: IndexEntry>: Send + Sync {
    /// Current document; a missing document loads as empty
    fn load(&self) -> StoreResult<IndexDocument<E>>;

    /// Replace the persisted document
    fn save(&self, document: &IndexDocument<E>) -> StoreResult<()>;

    /// Load, apply `edit`, and save when it reports a change
    ///
    /// Returns whether a save happened.
    fn update(&self, edit: &mut dyn FnMut(&mut IndexDocument<E>) -> bool) -> StoreResult<bool> {
        let mut document = self.load()?;
        if edit(&mut document) {
            self.save(&document)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Index document stored as a JSON file
pub struct JsonIndexFile<E> {
    path: PathBuf,
    _entry: PhantomData<fn() -> E>,
}

impl<E> JsonIndexFile<E> {
    /// Index persisted at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _entry: PhantomData,
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<E> std::fmt::Debug for JsonIndexFile<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonIndexFile")
            .field("path", &self.path)
            .finish()
    }
}

impl<E: IndexEntry> IndexRepository<E> for JsonIndexFile<E> {
    fn load(&self) -> StoreResult<IndexDocument<E>> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, document: &IndexDocument<E>) -> StoreResult<()> {
        write_json_atomic(&self.path, document)?;
        tracing::trace!(path = %self.path.display(), entries = document.len(), "index saved");
        Ok(())
    }
}

/// Index document held in memory
#[derive(Debug)]
pub struct MemoryIndex<E> {
    document: Mutex<IndexDocument<E>>,
}

impl<E: IndexEntry> MemoryIndex<E> {
    /// Empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index pre-populated with `entries`
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = E>) -> Self {
        let mut document = IndexDocument::new();
        for entry in entries {
            document.upsert(entry);
        }
        Self {
            document: Mutex::new(document),
        }
    }

    /// Copy of the current document
    #[must_use]
    pub fn snapshot(&self) -> IndexDocument<E> {
        self.document.lock().clone()
    }
}

impl<E> Default for MemoryIndex<E> {
    fn default() -> Self {
        Self {
            document: Mutex::new(IndexDocument::default()),
        }
    }
}

impl<E: IndexEntry> IndexRepository<E> for MemoryIndex<E> {
    fn load(&self) -> StoreResult<IndexDocument<E>> {
        Ok(self.document.lock().clone())
    }

    fn save(&self, document: &IndexDocument<E>) -> StoreResult<()> {
        *self.document.lock() = document.clone();
        Ok(())
    }
}
