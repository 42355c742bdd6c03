//! The standard thirteen pages
//!
//! Most pages edit one record section as-is. Two pages need a composite view:
//! [`UserDetails`] (names, contact details and the email override) and
//! [`EmailDetails`] (mailbox options plus the address, read-only unless
//! overridden).

use crate::page::{Section, SectionPage, WizardPage};
use onboard_record::{
    AccountSetup, AdditionalAccess, Applications, ComputerSetup, EmailSetup, EmployeeName,
    MiscNotes, NamingConvention, PhoneMobile, Record, RemoteAccess, Requestor, Scheduling,
    SoftwareAccess, UserInformation,
};

/// Number of pages in [`standard_pages`]
pub const STANDARD_PAGE_COUNT: usize = 13;

macro_rules! record_section {
    ($ty:ty, $field:ident, $title:literal) => {
        record_section!($ty, $field, $title, |_s: &$ty| None);
    };
    ($ty:ty, $field:ident, $title:literal, $validate:expr) => {
        impl Section for $ty {
            const TITLE: &'static str = $title;

            fn read(record: &Record) -> Self {
                record.$field.clone()
            }

            fn write(&self, record: &mut Record) {
                record.$field = self.clone();
            }

            fn validate(&self) -> Option<String> {
                let check: fn(&$ty) -> Option<String> = $validate;
                check(self)
            }
        }
    };
}

fn required(value: &str, message: &str) -> Option<String> {
    value.trim().is_empty().then(|| message.to_string())
}

fn require_names(name: &EmployeeName) -> Option<String> {
    required(&name.first_name, "Please enter the employee's first name.")
        .or_else(|| required(&name.last_name, "Please enter the employee's last name."))
}

impl Section for EmployeeName {
    const TITLE: &'static str = "Employee Name";

    fn read(record: &Record) -> Self {
        record.employee.clone()
    }

    fn write(&self, record: &mut Record) {
        record.employee.first_name = self.first_name.trim().to_string();
        record.employee.last_name = self.last_name.trim().to_string();
    }

    fn validate(&self) -> Option<String> {
        require_names(self)
    }
}

record_section!(Scheduling, scheduling, "Due Dates & Scheduling");
record_section!(Requestor, requestor, "Requestor Information");
record_section!(AccountSetup, account, "Account Setup", |s: &AccountSetup| {
    if s.new_account {
        required(&s.domain_username, "Please enter a domain username for the new account.")
    } else {
        None
    }
});
record_section!(Applications, applications, "Applications");
record_section!(ComputerSetup, computer, "Computer Setup", |s: &ComputerSetup| {
    if s.new_computer {
        None
    } else {
        required(&s.existing_computer_name, "Please enter the existing computer name.")
    }
});
record_section!(RemoteAccess, remote, "Remote Access", |s: &RemoteAccess| {
    if s.vpn_required {
        required(&s.vpn_username, "Please enter the VPN username.")
    } else {
        None
    }
});
record_section!(SoftwareAccess, software, "Software & Access Rights");
record_section!(AdditionalAccess, additional, "Additional Access & Security");
record_section!(PhoneMobile, phone, "Phone & Mobile Device", |s: &PhoneMobile| {
    if s.desk_phone_required {
        required(&s.extension, "Please enter the desk phone extension.")
    } else {
        None
    }
});
record_section!(MiscNotes, notes, "Notes & Finalize");

/// Page 3 fields: names, contact details and the email override
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetails {
    /// Employee name, editable here as well as on page 1
    pub employee: EmployeeName,
    /// Contact details and email address
    pub info: UserInformation,
}

impl UserDetails {
    /// Change the name, regenerating the email unless it is overridden
    pub fn rename(
        &mut self,
        first_name: &str,
        last_name: &str,
        naming: &dyn NamingConvention,
    ) {
        self.employee.first_name = first_name.to_string();
        self.employee.last_name = last_name.to_string();
        if !self.info.email_overridden {
            let generated = naming.suggest_email(first_name, last_name);
            if !generated.is_empty() {
                self.info.email_address = generated;
            }
        }
    }

    /// Take manual control of the email address
    pub fn override_email(&mut self, address: &str) {
        self.info.email_overridden = true;
        self.info.email_address = address.trim().to_string();
    }

    /// Hand the email address back to the naming convention
    pub fn clear_email_override(&mut self) {
        self.info.email_overridden = false;
    }
}

impl Section for UserDetails {
    const TITLE: &'static str = "User Information";

    fn read(record: &Record) -> Self {
        Self {
            employee: record.employee.clone(),
            info: record.user_info.clone(),
        }
    }

    fn write(&self, record: &mut Record) {
        self.employee.write(record);
        record.user_info = UserInformation {
            email_address: self.info.email_address.trim().to_string(),
            ..self.info.clone()
        };
    }

    fn validate(&self) -> Option<String> {
        require_names(&self.employee)
    }
}

/// Page 6 fields: mailbox options and a view of the email address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDetails {
    email_address: String,
    email_overridden: bool,
    /// Mailbox options
    pub setup: EmailSetup,
}

impl EmailDetails {
    /// Address as currently known
    #[inline]
    #[must_use]
    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    /// True when the address may not be edited on this page
    #[inline]
    #[must_use]
    pub fn is_address_read_only(&self) -> bool {
        !self.email_overridden
    }

    /// Edit the address; refused (returns `false`) unless overridden
    pub fn set_email_address(&mut self, address: &str) -> bool {
        if self.is_address_read_only() {
            return false;
        }
        self.email_address = address.trim().to_string();
        true
    }
}

impl Section for EmailDetails {
    const TITLE: &'static str = "Email Setup";

    fn read(record: &Record) -> Self {
        Self {
            email_address: record.user_info.email_address.clone(),
            email_overridden: record.user_info.email_overridden,
            setup: record.email.clone(),
        }
    }

    fn write(&self, record: &mut Record) {
        record.email = self.setup.clone();
        if self.email_overridden {
            record.user_info.email_address.clone_from(&self.email_address);
        }
    }
}

/// Page 1
pub type EmployeeNamePage = SectionPage<EmployeeName>;
/// Page 2
pub type SchedulingPage = SectionPage<Scheduling>;
/// Page 3
pub type UserInformationPage = SectionPage<UserDetails>;
/// Page 4
pub type RequestorPage = SectionPage<Requestor>;
/// Page 5
pub type AccountSetupPage = SectionPage<AccountSetup>;
/// Page 6
pub type EmailSetupPage = SectionPage<EmailDetails>;
/// Page 7
pub type ApplicationsPage = SectionPage<Applications>;
/// Page 8
pub type ComputerSetupPage = SectionPage<ComputerSetup>;
/// Page 9
pub type RemoteAccessPage = SectionPage<RemoteAccess>;
/// Page 10
pub type SoftwareAccessPage = SectionPage<SoftwareAccess>;
/// Page 11
pub type AdditionalAccessPage = SectionPage<AdditionalAccess>;
/// Page 12
pub type PhoneMobilePage = SectionPage<PhoneMobile>;
/// Page 13
pub type MiscNotesPage = SectionPage<MiscNotes>;

/// The thirteen pages in wizard order
#[must_use]
pub fn standard_pages() -> Vec<Box<dyn WizardPage>> {
    vec![
        Box::new(EmployeeNamePage::new()),
        Box::new(SchedulingPage::new()),
        Box::new(UserInformationPage::new()),
        Box::new(RequestorPage::new()),
        Box::new(AccountSetupPage::new()),
        Box::new(EmailSetupPage::new()),
        Box::new(ApplicationsPage::new()),
        Box::new(ComputerSetupPage::new()),
        Box::new(RemoteAccessPage::new()),
        Box::new(SoftwareAccessPage::new()),
        Box::new(AdditionalAccessPage::new()),
        Box::new(PhoneMobilePage::new()),
        Box::new(MiscNotesPage::new()),
    ]
}
