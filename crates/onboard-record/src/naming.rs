//! Naming conventions
//!
//! Maps an employee's first and last name to a suggested domain username and
//! email address. The wizard and the draft store only see the
//! [`NamingConvention`] trait; [`CustomerProfile`] is the stock implementation.

use serde::{Deserialize, Serialize};

/// Suggests account identifiers from a person's name
pub trait NamingConvention: Send + Sync {
    /// Suggested domain username, or empty if either name part is blank
    fn suggest_username(&self, first_name: &str, last_name: &str) -> String;

    /// Suggested email address, or empty if either name part is blank
    fn suggest_email(&self, first_name: &str, last_name: &str) -> String;
}

/// Local-part format for generated addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmailFormat {
    /// `jsmith`
    #[default]
    FirstInitialLastName,
    /// `john.smith`
    FirstDotLast,
    /// `johnsmith`
    FirstLast,
}

impl EmailFormat {
    /// Build the local part from already-normalized name parts
    fn local_part(self, first: &str, last: &str) -> String {
        match self {
            EmailFormat::FirstDotLast => format!("{first}.{last}"),
            EmailFormat::FirstLast => format!("{first}{last}"),
            EmailFormat::FirstInitialLastName => {
                let initial: String = first.chars().take(1).collect();
                format!("{initial}{last}")
            }
        }
    }
}

/// Customer-specific naming configuration
///
/// Persisted as `customer-profile.json` next to the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerProfile {
    /// Schema version tag
    pub schema_version: String,
    /// Display name of the customer
    pub customer_name: String,
    /// Mail domain, without the `@`
    pub email_domain: String,
    /// Local-part rule
    pub email_format: EmailFormat,
}

impl CustomerProfile {
    /// Profile for the given domain and format
    #[inline]
    #[must_use]
    pub fn new(email_domain: impl Into<String>, email_format: EmailFormat) -> Self {
        Self {
            email_domain: email_domain.into(),
            email_format,
            ..Self::default()
        }
    }
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            customer_name: "Arnot Realty".to_string(),
            email_domain: "arnotrealty.com".to_string(),
            email_format: EmailFormat::FirstInitialLastName,
        }
    }
}

fn normalize(part: &str) -> Option<String> {
    let trimmed = part.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

impl NamingConvention for CustomerProfile {
    fn suggest_username(&self, first_name: &str, last_name: &str) -> String {
        match (normalize(first_name), normalize(last_name)) {
            (Some(first), Some(last)) => self.email_format.local_part(&first, &last),
            _ => String::new(),
        }
    }

    fn suggest_email(&self, first_name: &str, last_name: &str) -> String {
        let local = self.suggest_username(first_name, last_name);
        if local.is_empty() {
            return local;
        }
        format!("{local}@{}", self.email_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_initial_last_name() {
        let profile = CustomerProfile::new("example.com", EmailFormat::FirstInitialLastName);
        assert_eq!(profile.suggest_username("John", "Smith"), "jsmith");
        assert_eq!(profile.suggest_email(" John ", "Smith"), "jsmith@example.com");
    }

    #[test]
    fn first_dot_last_and_first_last() {
        let dotted = CustomerProfile::new("example.com", EmailFormat::FirstDotLast);
        assert_eq!(dotted.suggest_email("John", "Smith"), "john.smith@example.com");

        let joined = CustomerProfile::new("example.com", EmailFormat::FirstLast);
        assert_eq!(joined.suggest_username("John", "Smith"), "johnsmith");
    }

    #[test]
    fn blank_parts_yield_empty_suggestions() {
        let profile = CustomerProfile::default();
        assert_eq!(profile.suggest_email("", "Smith"), "");
        assert_eq!(profile.suggest_username("John", "   "), "");
    }

    #[test]
    fn non_ascii_initial_is_a_whole_character() {
        let profile = CustomerProfile::default();
        assert_eq!(profile.suggest_username("Émile", "Zola"), "ézola");
    }

    #[test]
    fn profile_deserializes_with_missing_fields() {
        let profile: CustomerProfile =
            serde_json::from_str(r#"{ "emailDomain": "corp.test" }"#).unwrap();
        assert_eq!(profile.email_domain, "corp.test");
        assert_eq!(profile.email_format, EmailFormat::FirstInitialLastName);
    }

    proptest! {
        #[test]
        fn email_is_username_at_domain(first in "[A-Za-z]{1,12}", last in "[A-Za-z]{1,12}") {
            let profile = CustomerProfile::default();
            let username = profile.suggest_username(&first, &last);
            let email = profile.suggest_email(&first, &last);
            prop_assert_eq!(email, format!("{}@{}", username, profile.email_domain));
            prop_assert_eq!(username.clone(), username.to_lowercase());
        }
    }
}
