//! The onboarding record
//!
//! One [`Record`] holds everything collected by the wizard:
//! - Meta: identity, status, timestamps, export paths
//! - One section struct per wizard page
//!
//! Sections are flattened on the wire, so the serialized form is a single
//! JSON object with stable camelCase keys.

use crate::types::{RecordId, RecordStatus};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into every record
pub const RECORD_SCHEMA_VERSION: &str = "1.0";

/// Default customer profile tag
pub const DEFAULT_CUSTOMER_PROFILE: &str = "ArnotRealty";

/// A complete new-employee onboarding request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    record_id: RecordId,
    /// Schema version tag
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Draft or finalized
    #[serde(default)]
    pub status: RecordStatus,
    /// Customer profile this record was captured under
    #[serde(default = "default_customer_profile")]
    pub customer_profile: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Set when the record is finalized
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
    last_modified: DateTime<Utc>,
    /// Exported PDF on the network share
    #[serde(default)]
    pub exported_pdf_path: Option<String>,
    /// Exported JSON on the network share
    #[serde(default)]
    pub exported_json_path: Option<String>,

    /// Page 1
    #[serde(flatten)]
    pub employee: EmployeeName,
    /// Page 2
    #[serde(flatten)]
    pub scheduling: Scheduling,
    /// Page 3
    #[serde(flatten)]
    pub user_info: UserInformation,
    /// Page 4
    #[serde(flatten)]
    pub requestor: Requestor,
    /// Page 5
    #[serde(flatten)]
    pub account: AccountSetup,
    /// Page 6
    #[serde(flatten)]
    pub email: EmailSetup,
    /// Page 7
    #[serde(flatten)]
    pub applications: Applications,
    /// Page 8
    #[serde(flatten)]
    pub computer: ComputerSetup,
    /// Page 9
    #[serde(flatten)]
    pub remote: RemoteAccess,
    /// Page 10
    #[serde(flatten)]
    pub software: SoftwareAccess,
    /// Page 11
    #[serde(flatten)]
    pub additional: AdditionalAccess,
    /// Page 12
    #[serde(flatten)]
    pub phone: PhoneMobile,
    /// Page 13
    #[serde(flatten)]
    pub notes: MiscNotes,
}

fn default_schema_version() -> String {
    RECORD_SCHEMA_VERSION.to_string()
}

fn default_customer_profile() -> String {
    DEFAULT_CUSTOMER_PROFILE.to_string()
}

impl Record {
    /// Create a blank draft for the named employee
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            record_id: RecordId::new(),
            schema_version: default_schema_version(),
            status: RecordStatus::Draft,
            customer_profile: default_customer_profile(),
            created_at: now,
            finalized_at: None,
            last_modified: now,
            exported_pdf_path: None,
            exported_json_path: None,
            employee: EmployeeName {
                first_name: first_name.into(),
                last_name: last_name.into(),
            },
            scheduling: Scheduling::default(),
            user_info: UserInformation::default(),
            requestor: Requestor::default(),
            account: AccountSetup::default(),
            email: EmailSetup::default(),
            applications: Applications::default(),
            computer: ComputerSetup::default(),
            remote: RemoteAccess::default(),
            software: SoftwareAccess::default(),
            additional: AdditionalAccess::default(),
            phone: PhoneMobile::default(),
            notes: MiscNotes::default(),
        }
    }

    /// Record identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.record_id
    }

    /// Last persisted modification time
    #[inline]
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Advance `last_modified` to now
    ///
    /// Never moves the timestamp backwards, even if the wall clock does.
    pub fn touch(&mut self) -> DateTime<Utc> {
        self.touch_at(Utc::now())
    }

    /// Advance `last_modified` to `now`, keeping it monotonic
    pub fn touch_at(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        if now > self.last_modified {
            self.last_modified = now;
        }
        self.last_modified
    }

    /// Rebirth this record as a brand-new local draft
    ///
    /// Assigns a fresh identifier, resets the status to draft and clears
    /// everything tied to a previous export. All captured fields are kept.
    #[must_use]
    pub fn into_fresh_draft(mut self) -> Self {
        self.record_id = RecordId::new();
        self.status = RecordStatus::Draft;
        self.exported_pdf_path = None;
        self.exported_json_path = None;
        self.finalized_at = None;
        self.touch();
        self
    }

    /// "Last, First" for list views, or just the first name when the last is blank
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.employee.first_name.trim();
        let last = self.employee.last_name.trim();
        if last.is_empty() {
            first.to_string()
        } else {
            format!("{last}, {first}")
        }
    }

    /// "First Last"
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.employee.first_name.trim(),
            self.employee.last_name.trim()
        )
        .trim()
        .to_string()
    }

    /// True once the record has been exported to the network share
    #[inline]
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.exported_pdf_path
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }
}

/// Page 1: employee name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeName {
    /// Given name
    #[serde(rename = "employeeFirstName")]
    pub first_name: String,
    /// Family name
    #[serde(rename = "employeeLastName")]
    pub last_name: String,
}

/// Page 2: scheduling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scheduling {
    /// First working day
    pub start_date: Option<NaiveDate>,
    /// Setup appointment day
    pub appointment_date: Option<NaiveDate>,
    /// Setup appointment time
    pub appointment_time: Option<NaiveTime>,
    /// Free text
    pub scheduling_notes: String,
}

/// Page 3: user information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInformation {
    /// Job title
    pub title: String,
    /// Department
    pub department: String,
    /// Manager
    pub direct_reports_to: String,
    /// Office
    pub office_location: String,
    /// Desk number
    pub work_phone: String,
    /// Mobile number
    pub cell_phone: String,
    /// Primary email, derived from the name unless overridden
    pub email_address: String,
    /// Sticky flag: the user took manual control of the email address
    pub email_overridden: bool,
}

/// Page 4: who requested the onboarding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Requestor {
    /// Requestor name
    pub requestor_name: String,
    /// Requestor title
    pub requestor_title: String,
    /// Requestor phone
    pub requestor_phone: String,
    /// Requestor email
    pub requestor_email: String,
    /// When the request was made
    pub request_date: Option<NaiveDate>,
}

/// The person who usually files requests from this machine
///
/// Stored in `requestor.json` and offered on page 4 while a draft has no
/// requestor yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestorProfile {
    /// Schema version tag
    pub schema_version: String,
    /// Full name
    pub name: String,
    /// Job title
    pub title: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Department
    pub department: String,
}

impl Default for RequestorProfile {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            name: String::new(),
            title: String::new(),
            phone: String::new(),
            email: String::new(),
            department: String::new(),
        }
    }
}

impl RequestorProfile {
    /// True when no name has been saved
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Fill an empty requestor section from this profile
    ///
    /// Returns `false`, leaving `requestor` untouched, when it already names
    /// someone or the profile is blank. The request date is never changed.
    pub fn prefill(&self, requestor: &mut Requestor) -> bool {
        if !requestor.requestor_name.trim().is_empty() || self.is_blank() {
            return false;
        }
        requestor.requestor_name.clone_from(&self.name);
        requestor.requestor_title.clone_from(&self.title);
        requestor.requestor_phone.clone_from(&self.phone);
        requestor.requestor_email.clone_from(&self.email);
        true
    }
}

/// Page 5: domain account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSetup {
    /// Create a new account
    pub new_account: bool,
    /// Modify an existing account
    pub modify_existing_account: bool,
    /// Copy permissions from another user
    pub copy_permissions: bool,
    /// User to copy from
    pub copy_from_user: String,
    /// Suggested from the name when empty
    pub domain_username: String,
    /// Initial password
    pub initial_password: String,
    /// Prompt for a new password at first login
    pub force_password_change: bool,
}

impl Default for AccountSetup {
    fn default() -> Self {
        Self {
            new_account: false,
            modify_existing_account: false,
            copy_permissions: false,
            copy_from_user: String::new(),
            domain_username: String::new(),
            initial_password: String::new(),
            force_password_change: true,
        }
    }
}

/// Page 6: mailbox (the address itself lives in [`UserInformation`])
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailSetup {
    /// Mailbox password
    pub email_password: String,
    /// License SKU
    pub email_license_type: String,
    /// New mailbox (true) or existing (false)
    pub new_mailbox: bool,
    /// One address per line
    pub distribution_lists: String,
    /// One mailbox per line
    pub shared_mailboxes: String,
    /// One delegate per line
    pub calendar_delegates: String,
}

impl Default for EmailSetup {
    fn default() -> Self {
        Self {
            email_password: String::new(),
            email_license_type: String::new(),
            new_mailbox: true,
            distribution_lists: String::new(),
            shared_mailboxes: String::new(),
            calendar_delegates: String::new(),
        }
    }
}

/// Page 7: applications to install
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Applications {
    /// Selected application names
    pub selected_applications: Vec<String>,
}

/// Page 8: workstation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputerSetup {
    /// New computer (true) or existing (false)
    pub new_computer: bool,
    /// Name of the existing machine
    pub existing_computer_name: String,
    /// Printers to map
    pub printers: String,
    /// 1 or 2
    pub monitor_count: u8,
    /// First monitor type
    pub monitor1_type: String,
    /// Second monitor type
    pub monitor2_type: String,
}

impl Default for ComputerSetup {
    fn default() -> Self {
        Self {
            new_computer: true,
            existing_computer_name: String::new(),
            printers: String::new(),
            monitor_count: 1,
            monitor1_type: String::new(),
            monitor2_type: String::new(),
        }
    }
}

/// Page 9: remote access
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteAccess {
    /// VPN needed
    pub vpn_required: bool,
    /// VPN login
    pub vpn_username: String,
    /// VPN client
    pub vpn_type: String,
    /// Remote monitor 1 layout
    pub monitor1_config: String,
    /// Remote monitor 2 layout
    pub monitor2_config: String,
    /// Selected remote desktop tools
    pub remote_desktop_options: Vec<String>,
}

/// Page 10: software and access rights
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoftwareAccess {
    /// Line-of-business software
    pub software_access: Vec<String>,
    /// Access rights
    pub access_rights: Vec<String>,
}

/// Page 11: additional access and security
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalAccess {
    /// Extra access grants
    pub additional_access: Vec<String>,
    /// Security options
    pub security_options: Vec<String>,
}

/// Page 12: desk phone and mobile device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneMobile {
    /// Desk phone needed
    pub desk_phone_required: bool,
    /// Extension number
    pub extension: String,
    /// Handset model
    pub phone_model: String,
    /// Voicemail setup tasks
    pub voicemail_setup_options: Vec<String>,
    /// Mobile device type
    pub mobile_device_type: String,
    /// Mobile number
    pub mobile_number: String,
    /// Carrier
    pub mobile_carrier: String,
    /// Enroll in MDM
    pub mdm_enrollment: bool,
    /// MDM notes
    pub mdm_notes: String,
}

/// Page 13: free-form notes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiscNotes {
    /// Anything else
    pub misc_notes: String,
}
