//! Wizard Controller
//!
//! A linear state machine over an ordered list of pages. The controller owns
//! the in-memory record and one [`DebouncedSave`] trigger:
//! - Field edits bump the trigger; the trigger flushes the current page and
//!   persists the record after an idle period
//! - Explicit navigation cancels the trigger and flushes synchronously, so
//!   store failures surface as [`WizardError::Store`]
//! - Only forward navigation is gated by page validation
//!
//! Controller calls and the auto-save callback share the session behind one
//! mutex, so persistence for a record never overlaps.

use crate::autosave::{DebouncedSave, SaveStatus, DEFAULT_IDLE_INTERVAL};
use crate::derive::{prefill_requestor, propagate_derived_fields};
use crate::error::{WizardError, WizardResult};
use crate::page::{Section, SectionPage, WizardPage};
use crate::pages::standard_pages;
use onboard_record::{Record, RecordId, RequestorProfile};
use onboard_store::{AppSettings, DraftIndexEntry, DraftStore, StoreResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    /// Idle time before an automatic save
    pub auto_save_interval: Duration,
    /// Offered as the requestor while a draft names none
    pub requestor: Option<RequestorProfile>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            auto_save_interval: DEFAULT_IDLE_INTERVAL,
            requestor: None,
        }
    }
}

impl WizardConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration taken from persisted settings
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            auto_save_interval: settings.auto_save_interval(),
            requestor: None,
        }
    }

    /// Set the auto-save idle interval
    #[inline]
    #[must_use]
    pub fn with_auto_save_interval(mut self, interval: Duration) -> Self {
        self.auto_save_interval = interval;
        self
    }

    /// Pre-fill empty requestor sections from `profile`
    #[must_use]
    pub fn with_requestor(mut self, profile: RequestorProfile) -> Self {
        self.requestor = Some(profile);
        self
    }
}

/// Snapshot of where the wizard is and what it allows
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    /// Zero-based page index
    pub index: usize,
    /// Number of pages
    pub count: usize,
    /// Current page title
    pub title: String,
    /// Back is allowed
    pub can_go_back: bool,
    /// Next is allowed (subject to validation)
    pub can_go_next: bool,
    /// Finalize is offered
    pub can_finalize: bool,
    /// `(index + 1) / count`
    pub progress: f32,
}

struct Session {
    record: Record,
    pages: Vec<Box<dyn WizardPage>>,
    index: usize,
    requestor: Option<RequestorProfile>,
}

impl Session {
    fn current(&self) -> &dyn WizardPage {
        self.pages[self.index].as_ref()
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.pages.len()
    }

    /// Write the current page into the record and persist it
    fn flush(&mut self, store: &DraftStore) -> StoreResult<()> {
        self.pages[self.index].save(&mut self.record);
        store.save(&mut self.record, Some(self.index))
    }

    /// Make `index` current, refreshing derived fields first
    fn enter(&mut self, index: usize, store: &DraftStore) {
        self.index = index;
        propagate_derived_fields(&mut self.record, store.naming().as_ref());
        if let Some(profile) = &self.requestor {
            prefill_requestor(&mut self.record, profile);
        }
        self.pages[index].load(&self.record);
    }

    fn navigation(&self) -> Navigation {
        let count = self.pages.len();
        #[allow(clippy::cast_precision_loss)]
        let progress = (self.index + 1) as f32 / count as f32;
        Navigation {
            index: self.index,
            count,
            title: self.current().title().to_string(),
            can_go_back: self.index > 0,
            can_go_next: !self.is_last(),
            can_finalize: self.is_last(),
            progress,
        }
    }
}

/// Drives one draft through the wizard pages
pub struct WizardController {
    session: Arc<Mutex<Session>>,
    store: Arc<DraftStore>,
    autosave: DebouncedSave,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("WizardController");
        if let Some(session) = self.session.try_lock() {
            out.field("record_id", &session.record.id())
                .field("index", &session.index)
                .field("pages", &session.pages.len());
        }
        out.finish_non_exhaustive()
    }
}

impl WizardController {
    /// Create a new draft and open the first standard page
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_new(
        store: Arc<DraftStore>,
        first_name: &str,
        last_name: &str,
        config: &WizardConfig,
    ) -> WizardResult<Self> {
        Self::start_new_with_pages(store, first_name, last_name, standard_pages(), config)
    }

    /// Create a new draft over a custom page list
    pub fn start_new_with_pages(
        store: Arc<DraftStore>,
        first_name: &str,
        last_name: &str,
        pages: Vec<Box<dyn WizardPage>>,
        config: &WizardConfig,
    ) -> WizardResult<Self> {
        if pages.is_empty() {
            return Err(WizardError::NoPages);
        }
        let record = store.create(first_name, last_name, 0)?;
        Ok(Self::open(store, record, pages, 0, config))
    }

    /// Reopen an existing draft with the standard pages
    ///
    /// Without `last_page` the page stored in the draft index is used. The
    /// page is clamped into range.
    pub fn resume(
        store: Arc<DraftStore>,
        id: RecordId,
        last_page: Option<usize>,
        config: &WizardConfig,
    ) -> WizardResult<Self> {
        Self::resume_with_pages(store, id, last_page, standard_pages(), config)
    }

    /// Reopen an existing draft over a custom page list
    pub fn resume_with_pages(
        store: Arc<DraftStore>,
        id: RecordId,
        last_page: Option<usize>,
        pages: Vec<Box<dyn WizardPage>>,
        config: &WizardConfig,
    ) -> WizardResult<Self> {
        if pages.is_empty() {
            return Err(WizardError::NoPages);
        }
        let record = store.load(id)?.ok_or(WizardError::NotFound(id))?;
        let requested = match last_page {
            Some(page) => page,
            None => store.entry(id)?.map_or(0, |e| e.last_page_index),
        };
        let index = requested.min(pages.len() - 1);
        tracing::info!(record_id = %id, page = index, "resuming draft");
        Ok(Self::open(store, record, pages, index, config))
    }

    fn open(
        store: Arc<DraftStore>,
        record: Record,
        pages: Vec<Box<dyn WizardPage>>,
        index: usize,
        config: &WizardConfig,
    ) -> Self {
        let mut session = Session {
            record,
            pages,
            index,
            requestor: config.requestor.clone(),
        };
        session.enter(index, &store);
        let session = Arc::new(Mutex::new(session));

        let autosave = {
            let session = Arc::clone(&session);
            let store = Arc::clone(&store);
            DebouncedSave::new(config.auto_save_interval, move || {
                let mut session = session.lock();
                session.flush(&store)
            })
        };

        Self {
            session,
            store,
            autosave,
        }
    }

    /// Identifier of the draft being edited
    #[must_use]
    pub fn record_id(&self) -> RecordId {
        self.session.lock().record.id()
    }

    /// Copy of the in-memory record
    ///
    /// Edits still sitting in the current page are not included until the
    /// next flush.
    #[must_use]
    pub fn record(&self) -> Record {
        self.session.lock().record.clone()
    }

    /// Zero-based index of the current page
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.session.lock().index
    }

    /// Where the wizard is and what it allows
    #[must_use]
    pub fn navigation(&self) -> Navigation {
        self.session.lock().navigation()
    }

    /// Validation message of the current page, if any
    #[must_use]
    pub fn validate_current(&self) -> Option<String> {
        self.session.lock().current().validate()
    }

    /// Watch auto-save progress
    #[must_use]
    pub fn save_status(&self) -> watch::Receiver<SaveStatus> {
        self.autosave.subscribe()
    }

    /// A field on the current page changed
    pub fn notify_changed(&self) {
        self.autosave.bump();
    }

    /// Edit the current page as a `P`, then notify
    ///
    /// Returns `None` (and does nothing) when the current page is not a `P`.
    pub fn edit_page<P, R>(&self, edit: impl FnOnce(&mut P) -> R) -> Option<R>
    where
        P: WizardPage,
    {
        let result = {
            let mut session = self.session.lock();
            let index = session.index;
            let page = session.pages[index].as_any_mut().downcast_mut::<P>()?;
            edit(page)
        };
        self.notify_changed();
        Some(result)
    }

    /// Edit the section of the current [`SectionPage`], then notify
    pub fn edit_section<S, R>(&self, edit: impl FnOnce(&mut S) -> R) -> Option<R>
    where
        S: Section,
    {
        self.edit_page::<SectionPage<S>, R>(|page| edit(page.fields_mut()))
    }

    fn flush_explicit(&self, session: &mut Session) -> WizardResult<()> {
        self.autosave.cancel();
        session.flush(&self.store)?;
        self.autosave.mark_saved();
        Ok(())
    }

    /// Validate, flush and advance one page
    pub fn next(&self) -> WizardResult<Navigation> {
        let mut session = self.session.lock();
        if let Some(message) = session.current().validate() {
            return Err(WizardError::Validation(message));
        }
        if session.is_last() {
            return Err(WizardError::AtLastPage);
        }

        self.flush_explicit(&mut session)?;
        let next = session.index + 1;
        session.enter(next, &self.store);
        tracing::debug!(record_id = %session.record.id(), page = next, "next page");
        Ok(session.navigation())
    }

    /// Flush and step back one page; never validated
    pub fn back(&self) -> WizardResult<Navigation> {
        let mut session = self.session.lock();
        if session.index == 0 {
            return Err(WizardError::AtFirstPage);
        }

        self.flush_explicit(&mut session)?;
        let previous = session.index - 1;
        session.enter(previous, &self.store);
        tracing::debug!(record_id = %session.record.id(), page = previous, "previous page");
        Ok(session.navigation())
    }

    /// Flush without moving; returns the resulting index row
    pub fn save_and_close(&self) -> WizardResult<DraftIndexEntry> {
        let mut session = self.session.lock();
        self.flush_explicit(&mut session)?;
        let id = session.record.id();
        Ok(DraftIndexEntry::from_record(
            &session.record,
            self.store.draft_path(id),
            session.index,
        ))
    }

    /// Flush and attempt to finalize
    ///
    /// Only offered on the last page. The draft is always saved first; the
    /// export step itself is not available and reports
    /// [`WizardError::FinalizeUnavailable`].
    pub fn finalize(&self) -> WizardResult<()> {
        let mut session = self.session.lock();
        if !session.is_last() {
            return Err(WizardError::NotOnLastPage);
        }

        self.flush_explicit(&mut session)?;
        tracing::info!(record_id = %session.record.id(), "finalize requested, export unavailable");
        Err(WizardError::FinalizeUnavailable)
    }

    /// Flush pending work and stop auto-save
    pub fn close(mut self) -> WizardResult<()> {
        self.autosave.cancel();
        let result = self.session.lock().flush(&self.store);
        self.autosave.shutdown();
        result.map_err(WizardError::from)
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        // no-ops once `close` has run
        self.autosave.flush_now();
        self.autosave.shutdown();
    }
}
