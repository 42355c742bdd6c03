//! Wizard page contract
//!
//! The controller only sees [`WizardPage`]. Most pages are a
//! [`SectionPage`] over a [`Section`]: a plain struct that knows how to read
//! itself from a [`Record`], write itself back and check required fields.

use onboard_record::Record;
use std::any::Any;

/// One step of the wizard
pub trait WizardPage: Send + 'static {
    /// Heading shown for this page
    fn title(&self) -> &str;

    /// Populate the page from the record
    fn load(&mut self, record: &Record);

    /// Write the page's fields into the record
    fn save(&self, record: &mut Record);

    /// `Some(message)` when forward navigation must be refused
    fn validate(&self) -> Option<String>;

    /// Downcast support for typed edits
    fn as_any(&self) -> &dyn Any;

    /// Downcast support for typed edits
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Field set edited on one page
pub trait Section: Clone + Default + Send + 'static {
    /// Page heading
    const TITLE: &'static str;

    /// Copy the fields out of the record
    fn read(record: &Record) -> Self;

    /// Copy the fields back into the record
    fn write(&self, record: &mut Record);

    /// `Some(message)` when a required field is missing
    fn validate(&self) -> Option<String> {
        None
    }
}

/// Headless page editing a single [`Section`]
#[derive(Debug, Clone, Default)]
pub struct SectionPage<S> {
    fields: S,
}

impl<S: Section> SectionPage<S> {
    /// Empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current field values
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &S {
        &self.fields
    }

    /// Mutable field values
    #[inline]
    pub fn fields_mut(&mut self) -> &mut S {
        &mut self.fields
    }
}

impl<S: Section> WizardPage for SectionPage<S> {
    fn title(&self) -> &str {
        S::TITLE
    }

    fn load(&mut self, record: &Record) {
        self.fields = S::read(record);
    }

    fn save(&self, record: &mut Record) {
        self.fields.write(record);
    }

    fn validate(&self) -> Option<String> {
        self.fields.validate()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
