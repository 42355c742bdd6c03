//! Onboarding Wizard - headless paging and auto-save
//!
//! Drives a draft through an ordered list of pages:
//! - [`WizardController`]: next/back/save/finalize with validation gating
//! - [`DebouncedSave`]: coalesces edit bursts into one save on the tokio timer
//! - [`WizardPage`] / [`Section`]: the page contract and its generic form
//! - [`standard_pages`]: the thirteen onboarding pages
//!
//! # Example
//!
//! ```rust,no_run
//! use onboard_record::{CustomerProfile, EmployeeName};
//! use onboard_store::{DataLayout, DraftStore};
//! use onboard_wizard::{WizardConfig, WizardController};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(DraftStore::open(
//!     DataLayout::new("data"),
//!     Arc::new(CustomerProfile::default()),
//! )?);
//! let wizard = WizardController::start_new(store, "Jane", "Smith", &WizardConfig::new())?;
//!
//! wizard.edit_section::<EmployeeName, _>(|name| name.first_name = "Janet".into());
//! let nav = wizard.next()?;
//! println!("page {} of {}: {}", nav.index + 1, nav.count, nav.title);
//! wizard.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod autosave;
pub mod controller;
pub mod derive;
pub mod error;
pub mod page;
pub mod pages;

// Re-exports for convenience
pub use autosave::{DebouncedSave, SaveStatus, DEFAULT_IDLE_INTERVAL};
pub use controller::{Navigation, WizardConfig, WizardController};
pub use derive::{prefill_requestor, propagate_derived_fields};
pub use error::{WizardError, WizardResult};
pub use page::{Section, SectionPage, WizardPage};
pub use pages::{
    standard_pages, AccountSetupPage, AdditionalAccessPage, ApplicationsPage, ComputerSetupPage,
    EmailDetails, EmailSetupPage, EmployeeNamePage, MiscNotesPage, PhoneMobilePage,
    RemoteAccessPage, RequestorPage, SchedulingPage, SoftwareAccessPage, UserDetails,
    UserInformationPage, STANDARD_PAGE_COUNT,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the wizard
    pub use crate::{
        DebouncedSave, Navigation, SaveStatus, Section, WizardConfig, WizardController,
        WizardError, WizardPage,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
