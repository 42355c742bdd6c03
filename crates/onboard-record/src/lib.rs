//! Onboarding Record
//!
//! The data entity the wizard builds up page by page:
//! - [`Record`]: identity, status, timestamps and one section per wizard page
//! - [`RecordId`] / [`RecordStatus`]: identity and lifecycle tags
//! - [`NamingConvention`]: pluggable username / email suggestions
//!
//! # Example
//!
//! ```rust
//! use onboard_record::{CustomerProfile, NamingConvention, Record};
//!
//! let profile = CustomerProfile::default();
//! let mut record = Record::new("Jane", "Smith");
//! record.user_info.email_address = profile.suggest_email("Jane", "Smith");
//!
//! assert_eq!(record.display_name(), "Smith, Jane");
//! assert_eq!(record.user_info.email_address, "jsmith@arnotrealty.com");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod naming;
pub mod record;
pub mod types;

// Re-exports for convenience
pub use naming::{CustomerProfile, EmailFormat, NamingConvention};
pub use record::{
    AccountSetup, AdditionalAccess, Applications, ComputerSetup, EmailSetup, EmployeeName,
    MiscNotes, PhoneMobile, Record, RemoteAccess, Requestor, RequestorProfile, Scheduling,
    SoftwareAccess, UserInformation, RECORD_SCHEMA_VERSION,
};
pub use types::{RecordId, RecordStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
