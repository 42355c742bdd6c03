//! Onboarding Store - local draft persistence
//!
//! Owns everything that touches the data directory:
//! - [`DraftStore`]: one JSON file per draft, kept in sync with the draft index
//! - [`IndexRepository`]: versioned index documents (file-backed or in-memory)
//! - Portable packages: zip export/import of a single draft
//! - [`RecordLibrary`]: read side of the finalized-record index
//! - [`SettingsStore`]: app settings and the customer naming profile
//!
//! # Example
//!
//! ```rust,no_run
//! use onboard_store::{DataLayout, DraftStore};
//! use onboard_record::CustomerProfile;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), onboard_store::StoreError> {
//! let store = DraftStore::open(DataLayout::new("data"), Arc::new(CustomerProfile::default()))?;
//! let draft = store.create("Jane", "Smith", 0)?;
//!
//! for entry in store.list_all()? {
//!     println!("{} (page {})", entry.employee_name, entry.last_page_index + 1);
//! }
//! store.delete(draft.id())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod draft;
pub mod error;
pub mod index;
pub mod layout;
pub mod library;
pub mod package;
pub mod settings;

// Re-exports for convenience
pub use draft::{DraftStore, OrphanReason, ReconcileReport};
pub use error::{StoreError, StoreResult};
pub use index::{
    DraftIndexEntry, IndexDocument, IndexEntry, IndexRepository, JsonIndexFile, MemoryIndex,
    RecordIndexEntry, INDEX_SCHEMA_VERSION,
};
pub use layout::{make_safe, DataLayout, DRAFT_FILE_SUFFIX};
pub use library::{RecordLibrary, VerifyReport};
pub use package::package_file_name;
pub use settings::{
    load_customer_profile, load_or_create, load_requestor_profile, save_requestor_profile,
    AppSettings, SettingsStore, DEFAULT_AUTO_SAVE_DEBOUNCE_MS,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with drafts
    pub use crate::{
        DataLayout, DraftIndexEntry, DraftStore, IndexRepository, RecordLibrary, SettingsStore,
        StoreError, StoreResult,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
