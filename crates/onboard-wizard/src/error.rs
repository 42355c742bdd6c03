//! Error types for the wizard
//!
//! Navigation refusals (validation, first/last page) leave the session
//! untouched. Store failures carry the underlying [`StoreError`].

use onboard_record::RecordId;
use onboard_store::StoreError;

/// Wizard error type
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// The current page refused forward navigation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Back requested on the first page
    #[error("already on the first page")]
    AtFirstPage,

    /// Next requested on the last page
    #[error("already on the last page")]
    AtLastPage,

    /// Finalize requested before the last page
    #[error("finalize is only available on the last page")]
    NotOnLastPage,

    /// Finalize reached the unimplemented export step; the draft was saved
    #[error("finalize is not available yet, the draft has been saved")]
    FinalizeUnavailable,

    /// Resume requested for a draft that does not exist
    #[error("draft not found: {0}")]
    NotFound(RecordId),

    /// Controller built with an empty page list
    #[error("wizard has no pages")]
    NoPages,

    /// Persistence failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WizardError {
    /// True for refusals that leave the session unchanged
    #[inline]
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_)
                | WizardError::AtFirstPage
                | WizardError::AtLastPage
                | WizardError::NotOnLastPage
        )
    }
}

/// Result alias for wizard operations
pub type WizardResult<T> = Result<T, WizardError>;
