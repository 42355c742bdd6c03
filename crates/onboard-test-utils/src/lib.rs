//! Testing utilities for the onboarding workspace
//!
//! Shared fixtures: a throwaway data directory, filled-in records, an index
//! whose writes can be made to fail, and a scripted wizard page.

#![allow(missing_docs)]

use chrono::{NaiveDate, NaiveTime};
use onboard_record::{CustomerProfile, NamingConvention, Record};
use onboard_store::{
    DataLayout, DraftStore, IndexDocument, IndexEntry, IndexRepository, MemoryIndex, StoreError,
    StoreResult,
};
use onboard_wizard::WizardPage;
use parking_lot::Mutex;
use std::any::Any;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use zip::{write::FileOptions, ZipWriter};

/// A data directory that is removed on drop
pub struct TestData {
    dir: TempDir,
    layout: DataLayout,
}

impl TestData {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        Self { dir, layout }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Store backed by the JSON index file
    pub fn store(&self) -> Arc<DraftStore> {
        Arc::new(DraftStore::open(self.layout.clone(), naming()).unwrap())
    }

    /// Store over a caller-supplied index
    pub fn store_with_index(
        &self,
        index: Arc<dyn IndexRepository<onboard_store::DraftIndexEntry>>,
    ) -> Arc<DraftStore> {
        self.layout.ensure_dirs().unwrap();
        Arc::new(DraftStore::new(self.layout.clone(), index, naming()))
    }
}

impl Default for TestData {
    fn default() -> Self {
        Self::new()
    }
}

pub fn naming() -> Arc<dyn NamingConvention> {
    Arc::new(CustomerProfile::default())
}

/// A record with something on every page
pub fn sample_record(first: &str, last: &str) -> Record {
    let profile = CustomerProfile::default();
    let mut record = Record::new(first, last);
    record.scheduling.start_date = NaiveDate::from_ymd_opt(2025, 3, 3);
    record.scheduling.appointment_time = NaiveTime::from_hms_opt(9, 30, 0);
    record.user_info.title = "Leasing Agent".to_string();
    record.user_info.department = "Residential".to_string();
    record.user_info.email_address = profile.suggest_email(first, last);
    record.requestor.requestor_name = "Pat Manager".to_string();
    record.account.new_account = true;
    record.account.domain_username = profile.suggest_username(first, last);
    record.applications.selected_applications = vec!["Office".to_string(), "Yardi".to_string()];
    record.computer.monitor_count = 2;
    record.remote.vpn_required = true;
    record.remote.vpn_username = record.account.domain_username.clone();
    record.software.access_rights = vec!["Shared Drive".to_string()];
    record.phone.desk_phone_required = true;
    record.phone.extension = "214".to_string();
    record.notes.misc_notes = "Corner desk".to_string();
    record
}

/// In-memory index whose saves fail on demand
pub struct FlakyIndex<E> {
    inner: MemoryIndex<E>,
    fail_saves: AtomicBool,
}

impl<E: IndexEntry> FlakyIndex<E> {
    pub fn new() -> Self {
        Self {
            inner: MemoryIndex::new(),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl<E: IndexEntry> Default for FlakyIndex<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: IndexEntry> IndexRepository<E> for FlakyIndex<E> {
    fn load(&self) -> StoreResult<IndexDocument<E>> {
        self.inner.load()
    }

    fn save(&self, document: &IndexDocument<E>) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::io(
                "flaky-index.json",
                std::io::Error::other("injected index failure"),
            ));
        }
        self.inner.save(document)
    }
}

/// Write a zip with the given `(name, bytes)` entries
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Counters and knobs shared between a test and its [`ScriptedPage`]
#[derive(Debug, Default)]
pub struct PageProbe {
    pub loads: usize,
    pub saves: usize,
    pub validation_error: Option<String>,
}

/// Page that records calls and fails validation on request
///
/// On save it appends its title to the record's misc notes, so tests can see
/// which pages were flushed.
pub struct ScriptedPage {
    title: String,
    probe: Arc<Mutex<PageProbe>>,
}

impl ScriptedPage {
    pub fn new(title: &str) -> (Self, Arc<Mutex<PageProbe>>) {
        let probe = Arc::new(Mutex::new(PageProbe::default()));
        let page = Self {
            title: title.to_string(),
            probe: Arc::clone(&probe),
        };
        (page, probe)
    }
}

impl WizardPage for ScriptedPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn load(&mut self, _record: &Record) {
        self.probe.lock().loads += 1;
    }

    fn save(&self, record: &mut Record) {
        self.probe.lock().saves += 1;
        record.notes.misc_notes.push_str(&self.title);
        record.notes.misc_notes.push(';');
    }

    fn validate(&self) -> Option<String> {
        self.probe.lock().validation_error.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// `count` scripted pages titled `P0`, `P1`, ...
pub fn scripted_pages(count: usize) -> (Vec<Box<dyn WizardPage>>, Vec<Arc<Mutex<PageProbe>>>) {
    (0..count)
        .map(|i| {
            let (page, probe) = ScriptedPage::new(&format!("P{i}"));
            (Box::new(page) as Box<dyn WizardPage>, probe)
        })
        .unzip()
}
