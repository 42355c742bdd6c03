//! Derived-field propagation
//!
//! Runs on the record before a page is loaded, so every page sees suggestions
//! that match the current name:
//! - `domain_username` is filled only while it is empty
//! - `email_address` follows the name until the user overrides it
//! - an empty requestor section is filled from the saved requestor profile

use onboard_record::{NamingConvention, Record, RequestorProfile};

/// Apply name-derived suggestions; returns `true` if anything changed
pub fn propagate_derived_fields(record: &mut Record, naming: &dyn NamingConvention) -> bool {
    let first = record.employee.first_name.clone();
    let last = record.employee.last_name.clone();
    let mut changed = false;

    if record.account.domain_username.trim().is_empty() {
        let username = naming.suggest_username(&first, &last);
        if !username.is_empty() {
            record.account.domain_username = username;
            changed = true;
        }
    }

    if !record.user_info.email_overridden {
        let email = naming.suggest_email(&first, &last);
        if !email.is_empty() && email != record.user_info.email_address {
            record.user_info.email_address = email;
            changed = true;
        }
    }

    changed
}

/// Offer the saved requestor on a draft that names none yet
pub fn prefill_requestor(record: &mut Record, profile: &RequestorProfile) -> bool {
    let filled = profile.prefill(&mut record.requestor);
    if filled {
        tracing::debug!(record_id = %record.id(), "requestor pre-filled from profile");
    }
    filled
}
