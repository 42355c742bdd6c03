//! Draft Store
//!
//! Reads and writes single drafts and keeps the draft index truthful.
//!
//! The draft files are the source of truth. The index is a cache that heals
//! itself: every listing drops rows whose file is missing or unreadable, and
//! [`DraftStore::rebuild_index`] adopts files the index never heard of.

use crate::error::{StoreError, StoreResult};
use crate::index::{DraftIndexEntry, IndexDocument, IndexRepository, JsonIndexFile};
use crate::layout::{is_draft_file, read_json, remove_if_exists, write_json_atomic, DataLayout};
use onboard_record::{NamingConvention, Record, RecordId, RecordStatus};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why an index row was dropped during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanReason {
    /// The draft file no longer exists
    Missing,
    /// The draft file exists but cannot be read or parsed
    Unreadable,
    /// The file parses but belongs to a different record
    Mismatched,
}

/// Outcome of [`DraftStore::reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Rows that survived
    pub kept: usize,
    /// Rows dropped, with the reason
    pub pruned: Vec<(RecordId, OrphanReason)>,
}

impl ReconcileReport {
    /// True when nothing was pruned
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.pruned.is_empty()
    }
}

/// Reads, writes and deletes drafts under one data directory
pub struct DraftStore {
    layout: DataLayout,
    index: Arc<dyn IndexRepository<DraftIndexEntry>>,
    naming: Arc<dyn NamingConvention>,
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl DraftStore {
    /// Store over an explicit index repository
    #[must_use]
    pub fn new(
        layout: DataLayout,
        index: Arc<dyn IndexRepository<DraftIndexEntry>>,
        naming: Arc<dyn NamingConvention>,
    ) -> Self {
        Self {
            layout,
            index,
            naming,
        }
    }

    /// Store backed by `draft-index.json` under the layout root
    ///
    /// Creates the data and drafts directories when missing.
    pub fn open(layout: DataLayout, naming: Arc<dyn NamingConvention>) -> StoreResult<Self> {
        layout.ensure_dirs()?;
        let index = Arc::new(JsonIndexFile::<DraftIndexEntry>::new(layout.draft_index_path()));
        Ok(Self::new(layout, index, naming))
    }

    /// Data directory layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Naming convention used for suggestions
    #[inline]
    #[must_use]
    pub fn naming(&self) -> &Arc<dyn NamingConvention> {
        &self.naming
    }

    /// Resolved draft file for `id`
    #[inline]
    #[must_use]
    pub fn draft_path(&self, id: RecordId) -> PathBuf {
        self.layout.draft_path(id)
    }

    /// Create and persist a new draft
    ///
    /// The suggested username and email are derived from the names.
    pub fn create(
        &self,
        first_name: &str,
        last_name: &str,
        starting_page: usize,
    ) -> StoreResult<Record> {
        let (first, last) = (first_name.trim(), last_name.trim());
        let mut record = Record::new(first, last);
        record.status = RecordStatus::Draft;
        record.account.domain_username = self.naming.suggest_username(first, last);
        record.user_info.email_address = self.naming.suggest_email(first, last);

        self.save_new(&mut record, starting_page)?;
        tracing::info!(record_id = %record.id(), name = %record.display_name(), "draft created");
        Ok(record)
    }

    /// Persist `record` and upsert its index row
    ///
    /// Bumps `last_modified`. The page index is only changed when given.
    pub fn save(&self, record: &mut Record, current_page: Option<usize>) -> StoreResult<()> {
        record.touch();
        let path = self.draft_path(record.id());
        write_json_atomic(&path, record)?;
        self.upsert_entry(record, path, current_page)?;
        tracing::debug!(record_id = %record.id(), page = ?current_page, "draft saved");
        Ok(())
    }

    /// Persist a record that has never been stored before
    ///
    /// Removes the written file again when the index cannot be updated.
    pub(crate) fn save_new(&self, record: &mut Record, starting_page: usize) -> StoreResult<()> {
        record.touch();
        let path = self.draft_path(record.id());
        write_json_atomic(&path, record)?;
        if let Err(e) = self.upsert_entry(record, path.clone(), Some(starting_page)) {
            if let Err(cleanup) = remove_if_exists(&path) {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove draft after index error");
            }
            return Err(e);
        }
        Ok(())
    }

    fn upsert_entry(
        &self,
        record: &Record,
        path: PathBuf,
        current_page: Option<usize>,
    ) -> StoreResult<()> {
        let id = record.id();
        let mut path = Some(path);
        self.update_index(|doc| {
            let path = path.take().unwrap_or_else(|| self.draft_path(id));
            match doc.find_mut(id) {
                Some(entry) => {
                    entry.employee_name = record.display_name();
                    entry.last_modified = record.last_modified();
                    entry.draft_file_path = path;
                    if let Some(page) = current_page {
                        entry.last_page_index = page;
                    }
                }
                None => {
                    doc.upsert(DraftIndexEntry::from_record(
                        record,
                        path,
                        current_page.unwrap_or(0),
                    ));
                }
            }
            true
        })?;
        Ok(())
    }

    /// Load a draft; `Ok(None)` when no file exists
    pub fn load(&self, id: RecordId) -> StoreResult<Option<Record>> {
        self.load_from_path(&self.draft_path(id))
    }

    /// Load a draft from an explicit file
    pub fn load_from_path(&self, path: &Path) -> StoreResult<Option<Record>> {
        read_json(path)
    }

    /// Index row for `id`, if indexed
    pub fn entry(&self, id: RecordId) -> StoreResult<Option<DraftIndexEntry>> {
        Ok(self.load_index()?.find(id).cloned())
    }

    /// Delete the draft file and its index row
    ///
    /// An already-absent file is not an error.
    pub fn delete(&self, id: RecordId) -> StoreResult<()> {
        let path = self.draft_path(id);
        let removed = remove_if_exists(&path)?;
        self.update_index(|doc| doc.remove(id).is_some())?;
        tracing::info!(record_id = %id, file_removed = removed, "draft deleted");
        Ok(())
    }

    /// All drafts, most recently modified first
    ///
    /// Reconciles first, so this may rewrite the index.
    pub fn list_all(&self) -> StoreResult<Vec<DraftIndexEntry>> {
        let (document, _) = self.reconcile_document()?;
        let mut entries = document.into_entries();
        entries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(entries)
    }

    /// True when at least one live draft exists
    pub fn has_any(&self) -> StoreResult<bool> {
        Ok(!self.list_all()?.is_empty())
    }

    /// Drop index rows whose draft file is missing or unreadable
    pub fn reconcile(&self) -> StoreResult<ReconcileReport> {
        self.reconcile_document().map(|(_, report)| report)
    }

    fn reconcile_document(&self) -> StoreResult<(IndexDocument<DraftIndexEntry>, ReconcileReport)> {
        let mut document = self.load_index()?;
        let mut pruned = Vec::new();

        document.retain(|entry| match self.probe(entry) {
            None => true,
            Some(reason) => {
                pruned.push((entry.record_id, reason));
                false
            }
        });

        if !pruned.is_empty() {
            self.index.save(&document)?;
            for (id, reason) in &pruned {
                tracing::warn!(record_id = %id, reason = ?reason, "pruned orphaned draft index entry");
            }
        }

        let report = ReconcileReport {
            kept: document.len(),
            pruned,
        };
        Ok((document, report))
    }

    /// `None` when the row's file holds the row's record
    fn probe(&self, entry: &DraftIndexEntry) -> Option<OrphanReason> {
        match self.load_from_path(&entry.draft_file_path) {
            Ok(Some(record)) if record.id() == entry.record_id => None,
            Ok(Some(_)) => Some(OrphanReason::Mismatched),
            Ok(None) => Some(OrphanReason::Missing),
            Err(e) => {
                tracing::debug!(record_id = %entry.record_id, error = %e, "draft file unreadable");
                Some(OrphanReason::Unreadable)
            }
        }
    }

    /// Load the index, rebuilding it from disk when the document is corrupt
    fn load_index(&self) -> StoreResult<IndexDocument<DraftIndexEntry>> {
        match self.index.load() {
            Err(StoreError::Format { path, message }) => {
                tracing::warn!(path = %path.display(), %message, "draft index corrupt, rebuilding from draft files");
                let mut document = IndexDocument::new();
                self.adopt_unindexed(&mut document)?;
                self.index.save(&document)?;
                Ok(document)
            }
            other => other,
        }
    }

    /// Read-modify-write the index through [`DraftStore::load_index`]
    ///
    /// The document is only written back when `edit` returns `true`.
    fn update_index(
        &self,
        mut edit: impl FnMut(&mut IndexDocument<DraftIndexEntry>) -> bool,
    ) -> StoreResult<bool> {
        let mut document = self.load_index()?;
        if edit(&mut document) {
            self.index.save(&document)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Index draft files that have no row yet
    ///
    /// Returns the number of files adopted.
    pub fn rebuild_index(&self) -> StoreResult<usize> {
        let mut document = self.load_index()?;
        let adopted = self.adopt_unindexed(&mut document)?;
        if adopted > 0 {
            self.index.save(&document)?;
            tracing::info!(adopted, "adopted unindexed drafts");
        }
        Ok(adopted)
    }

    fn adopt_unindexed(&self, document: &mut IndexDocument<DraftIndexEntry>) -> StoreResult<usize> {
        let dir = self.layout.drafts_dir();
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_draft_file(p))
            .collect();
        paths.sort();

        let mut adopted = 0;
        for path in paths {
            match self.load_from_path(&path) {
                Ok(Some(record)) if !document.contains(record.id()) => {
                    document.upsert(DraftIndexEntry::from_record(&record, path, 0));
                    adopted += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable draft file");
                }
            }
        }
        Ok(adopted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use onboard_record::CustomerProfile;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, DraftStore) {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::open(
            DataLayout::new(dir.path()),
            Arc::new(CustomerProfile::default()),
        )
        .unwrap();
        (dir, store)
    }

    #[test]
    fn create_derives_identifiers_and_indexes() {
        let (_dir, store) = store();
        let record = store.create(" Jane ", "Smith", 0).unwrap();

        assert_eq!(record.employee.first_name, "Jane");
        assert_eq!(record.account.domain_username, "jsmith");
        assert_eq!(record.user_info.email_address, "jsmith@arnotrealty.com");
        assert!(store.draft_path(record.id()).exists());

        let entry = store.entry(record.id()).unwrap().unwrap();
        assert_eq!(entry.employee_name, "Smith, Jane");
        assert_eq!(entry.last_page_index, 0);
        assert_eq!(entry.draft_file_path, store.draft_path(record.id()));
    }

    #[test]
    fn save_updates_page_only_when_given() {
        let (_dir, store) = store();
        let mut record = store.create("Jane", "Smith", 0).unwrap();

        store.save(&mut record, Some(5)).unwrap();
        record.employee.last_name = "Jones".to_string();
        store.save(&mut record, None).unwrap();

        let entry = store.entry(record.id()).unwrap().unwrap();
        assert_eq!(entry.last_page_index, 5);
        assert_eq!(entry.employee_name, "Jones, Jane");
        assert_eq!(entry.last_modified, record.last_modified());
    }

    #[test]
    fn load_missing_is_none_and_corrupt_is_format() {
        let (_dir, store) = store();
        assert!(store.load(RecordId::new()).unwrap().is_none());

        let record = store.create("Jane", "Smith", 0).unwrap();
        fs::write(store.draft_path(record.id()), "{ truncated").unwrap();
        assert!(store.load(record.id()).unwrap_err().is_format());
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, store) = store();
        let record = store.create("Jane", "Smith", 0).unwrap();

        store.delete(record.id()).unwrap();
        store.delete(record.id()).unwrap();

        assert!(!store.draft_path(record.id()).exists());
        assert!(store.entry(record.id()).unwrap().is_none());
    }

    #[test]
    fn reconcile_reports_each_kind_of_orphan() {
        let (_dir, store) = store();
        let gone = store.create("Gone", "Missing", 0).unwrap();
        let broken = store.create("Broken", "File", 0).unwrap();
        let swapped = store.create("Swapped", "Content", 0).unwrap();
        let fine = store.create("Fine", "Draft", 0).unwrap();

        fs::remove_file(store.draft_path(gone.id())).unwrap();
        fs::write(store.draft_path(broken.id()), "not json").unwrap();
        fs::copy(store.draft_path(fine.id()), store.draft_path(swapped.id())).unwrap();

        let report = store.reconcile().unwrap();
        assert_eq!(report.kept, 1);
        assert_eq!(
            report.pruned,
            vec![
                (gone.id(), OrphanReason::Missing),
                (broken.id(), OrphanReason::Unreadable),
                (swapped.id(), OrphanReason::Mismatched),
            ]
        );
        assert!(store.reconcile().unwrap().is_clean());
    }

    #[test]
    fn list_all_is_newest_first() {
        let (_dir, store) = store();
        let mut older = store.create("Old", "One", 0).unwrap();
        let newer = store.create("New", "One", 0).unwrap();

        older.touch_at(newer.last_modified() + chrono::Duration::seconds(30));
        store.save(&mut older, None).unwrap();

        let ids: Vec<_> = store.list_all().unwrap().iter().map(|e| e.record_id).collect();
        assert_eq!(ids, vec![older.id(), newer.id()]);
    }

    #[test]
    fn rebuild_adopts_unindexed_files() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        let naming: Arc<dyn NamingConvention> = Arc::new(CustomerProfile::default());
        let first = DraftStore::open(layout.clone(), naming.clone()).unwrap();
        let record = first.create("Jane", "Smith", 3).unwrap();

        let detached = DraftStore::new(layout, Arc::new(MemoryIndex::new()), naming);
        assert!(detached.list_all().unwrap().is_empty());
        assert_eq!(detached.rebuild_index().unwrap(), 1);
        assert_eq!(detached.rebuild_index().unwrap(), 0);

        let listed = detached.list_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record_id, record.id());
        assert_eq!(listed[0].last_page_index, 0);
    }

    #[test]
    fn corrupt_index_heals_from_draft_files() {
        let (_dir, store) = store();
        let record = store.create("Jane", "Smith", 0).unwrap();
        fs::write(store.layout().draft_index_path(), "{{{{").unwrap();

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record_id, record.id());
        assert!(store.has_any().unwrap());
    }

    #[test]
    fn writes_heal_a_corrupt_index_before_mutating_it() {
        let (_dir, store) = store();
        let mut jane = store.create("Jane", "Smith", 0).unwrap();
        let gone = store.create("Old", "Draft", 0).unwrap();
        fs::write(store.layout().draft_index_path(), "{{{{").unwrap();

        store.save(&mut jane, Some(1)).unwrap();
        assert_eq!(store.entry(jane.id()).unwrap().unwrap().last_page_index, 1);

        fs::write(store.layout().draft_index_path(), "{{{{").unwrap();
        let bob = store.create("Bob", "Beta", 2).unwrap();
        assert_eq!(store.entry(bob.id()).unwrap().unwrap().last_page_index, 2);

        fs::write(store.layout().draft_index_path(), "{{{{").unwrap();
        store.delete(gone.id()).unwrap();
        assert!(store.entry(gone.id()).unwrap().is_none());

        let mut ids: Vec<RecordId> = store.list_all().unwrap().iter().map(|e| e.record_id).collect();
        ids.sort_by_key(ToString::to_string);
        let mut expected = vec![jane.id(), bob.id()];
        expected.sort_by_key(ToString::to_string);
        assert_eq!(ids, expected);
    }
}
