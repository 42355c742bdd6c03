//! Record Library
//!
//! Read side of the finalized-record index. Finalized records live on a
//! network share that may be offline, so a missing file only clears the
//! `last_verified` flag; rows are never dropped here.

use crate::error::StoreResult;
use crate::index::{IndexRepository, JsonIndexFile, RecordIndexEntry};
use crate::layout::DataLayout;
use chrono::Utc;
use onboard_record::RecordId;
use std::sync::Arc;

/// Result of [`RecordLibrary::verify`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Rows whose exported JSON was found
    pub present: usize,
    /// Rows whose exported JSON was not found
    pub missing: Vec<RecordId>,
}

/// Finalized records, newest first
pub struct RecordLibrary {
    index: Arc<dyn IndexRepository<RecordIndexEntry>>,
}

impl std::fmt::Debug for RecordLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLibrary").finish_non_exhaustive()
    }
}

impl RecordLibrary {
    /// Library over an explicit index repository
    #[must_use]
    pub fn new(index: Arc<dyn IndexRepository<RecordIndexEntry>>) -> Self {
        Self { index }
    }

    /// Library backed by `record-index.json`
    #[must_use]
    pub fn open(layout: &DataLayout) -> Self {
        Self::new(Arc::new(JsonIndexFile::<RecordIndexEntry>::new(
            layout.record_index_path(),
        )))
    }

    /// All finalized records, most recently finalized first
    pub fn list(&self) -> StoreResult<Vec<RecordIndexEntry>> {
        let mut entries = self.index.load()?.into_entries();
        entries.sort_by(|a, b| b.finalized_at.cmp(&a.finalized_at));
        Ok(entries)
    }

    /// Row for `id`
    pub fn find(&self, id: RecordId) -> StoreResult<Option<RecordIndexEntry>> {
        Ok(self.index.load()?.find(id).cloned())
    }

    /// Check every row's exported JSON and persist the verification flags
    pub fn verify(&self) -> StoreResult<VerifyReport> {
        let now = Utc::now();
        let mut report = VerifyReport::default();
        self.index.update(&mut |doc| {
            let ids: Vec<RecordId> = doc.entries().iter().map(|e| e.record_id).collect();
            for id in ids {
                let Some(entry) = doc.find_mut(id) else {
                    continue;
                };
                entry.last_verified = entry.json_path.is_file();
                entry.last_verified_at = Some(now);
                if entry.last_verified {
                    report.present += 1;
                } else {
                    report.missing.push(id);
                }
            }
            !doc.is_empty()
        })?;

        if !report.missing.is_empty() {
            tracing::warn!(missing = report.missing.len(), "finalized records missing from share");
        }
        Ok(report)
    }
}
