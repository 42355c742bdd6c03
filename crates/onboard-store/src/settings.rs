//! Application settings, customer profile and requestor profile
//!
//! Each file is loaded or created with defaults. A corrupt file is not
//! fatal: it is logged, replaced with defaults, and rewritten.

use crate::error::{StoreError, StoreResult};
use crate::layout::{read_json, write_json_atomic, DataLayout};
use onboard_record::{CustomerProfile, RequestorProfile};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default auto-save idle interval in milliseconds
pub const DEFAULT_AUTO_SAVE_DEBOUNCE_MS: u64 = 750;

/// Persisted application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Schema version tag
    pub schema_version: String,
    /// Idle time before an automatic save
    pub auto_save_debounce_ms: u64,
    /// Where the last draft package was written
    pub last_draft_export_directory: Option<PathBuf>,
    /// Where the last draft package was read from
    pub last_draft_import_directory: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            auto_save_debounce_ms: DEFAULT_AUTO_SAVE_DEBOUNCE_MS,
            last_draft_export_directory: None,
            last_draft_import_directory: None,
        }
    }
}

impl AppSettings {
    /// Auto-save interval; zero falls back to the default
    #[must_use]
    pub fn auto_save_interval(&self) -> Duration {
        match self.auto_save_debounce_ms {
            0 => Duration::from_millis(DEFAULT_AUTO_SAVE_DEBOUNCE_MS),
            ms => Duration::from_millis(ms),
        }
    }
}

/// Load `path`, or create it from `T::default()`
///
/// A corrupt file is replaced with defaults. IO failures are returned.
pub fn load_or_create<T>(path: &Path) -> StoreResult<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    match read_json(path) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            let value = T::default();
            write_json_atomic(path, &value)?;
            tracing::debug!(path = %path.display(), "created default config file");
            Ok(value)
        }
        Err(StoreError::Format { message, .. }) => {
            tracing::warn!(path = %path.display(), %message, "config file corrupt, restoring defaults");
            let value = T::default();
            write_json_atomic(path, &value)?;
            Ok(value)
        }
        Err(e) => Err(e),
    }
}

/// Customer profile under `layout`, created with defaults when missing
pub fn load_customer_profile(layout: &DataLayout) -> StoreResult<CustomerProfile> {
    load_or_create(&layout.customer_profile_path())
}

/// Requestor profile under `layout`, created blank when missing
pub fn load_requestor_profile(layout: &DataLayout) -> StoreResult<RequestorProfile> {
    load_or_create(&layout.requestor_path())
}

/// Persist the requestor profile offered to new drafts
pub fn save_requestor_profile(layout: &DataLayout, profile: &RequestorProfile) -> StoreResult<()> {
    write_json_atomic(&layout.requestor_path(), profile)?;
    tracing::info!(name = %profile.name, "requestor profile saved");
    Ok(())
}

/// Shared, persisted [`AppSettings`]
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Load `settings.json` under `layout`, creating it when missing
    pub fn open(layout: &DataLayout) -> StoreResult<Self> {
        let path = layout.settings_path();
        let current = load_or_create(&path)?;
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    /// Copy of the current settings
    #[must_use]
    pub fn get(&self) -> AppSettings {
        self.current.read().clone()
    }

    /// Auto-save idle interval
    #[must_use]
    pub fn auto_save_interval(&self) -> Duration {
        self.current.read().auto_save_interval()
    }

    /// Apply `edit` and persist the result
    ///
    /// The in-memory copy only changes when the write succeeds.
    pub fn update(&self, edit: impl FnOnce(&mut AppSettings)) -> StoreResult<()> {
        let mut current = self.current.write();
        let mut next = current.clone();
        edit(&mut next);
        if next != *current {
            write_json_atomic(&self.path, &next)?;
            *current = next;
        }
        Ok(())
    }

    /// Remember the directory a package was exported to
    pub fn remember_export_dir(&self, dir: &Path) -> StoreResult<()> {
        self.update(|s| s.last_draft_export_directory = Some(dir.to_path_buf()))
    }

    /// Remember the directory a package was imported from
    pub fn remember_import_dir(&self, dir: &Path) -> StoreResult<()> {
        self.update(|s| s.last_draft_import_directory = Some(dir.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_record::EmailFormat;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_settings_are_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        let store = SettingsStore::open(&layout).unwrap();

        assert_eq!(store.get(), AppSettings::default());
        assert_eq!(store.auto_save_interval(), Duration::from_millis(750));
        assert!(layout.settings_path().exists());
    }

    #[test]
    fn corrupt_settings_load_as_defaults_and_are_rewritten() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::write(layout.settings_path(), "{ oops").unwrap();

        let store = SettingsStore::open(&layout).unwrap();
        assert_eq!(store.get(), AppSettings::default());

        let raw = std::fs::read_to_string(layout.settings_path()).unwrap();
        let reparsed: AppSettings = serde_json::from_str(&raw).unwrap();
        assert_eq!(reparsed, AppSettings::default());
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let settings = AppSettings {
            auto_save_debounce_ms: 0,
            ..AppSettings::default()
        };
        assert_eq!(settings.auto_save_interval(), Duration::from_millis(750));
    }

    #[test]
    fn updates_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        let store = SettingsStore::open(&layout).unwrap();

        store.remember_export_dir(Path::new("/exports")).unwrap();
        store.update(|s| s.auto_save_debounce_ms = 1500).unwrap();

        let reopened = SettingsStore::open(&layout).unwrap().get();
        assert_eq!(reopened.last_draft_export_directory, Some(PathBuf::from("/exports")));
        assert_eq!(reopened.auto_save_debounce_ms, 1500);
    }

    #[test]
    fn requestor_profile_is_created_blank_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());

        let blank = load_requestor_profile(&layout).unwrap();
        assert!(blank.is_blank());
        assert!(layout.requestor_path().exists());

        let profile = RequestorProfile {
            name: "Pat Manager".to_string(),
            department: "Property Management".to_string(),
            ..RequestorProfile::default()
        };
        save_requestor_profile(&layout, &profile).unwrap();
        assert_eq!(load_requestor_profile(&layout).unwrap(), profile);

        std::fs::write(layout.requestor_path(), "[").unwrap();
        assert_eq!(load_requestor_profile(&layout).unwrap(), RequestorProfile::default());
    }

    #[test]
    fn customer_profile_is_loaded_or_created() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        assert_eq!(load_customer_profile(&layout).unwrap(), CustomerProfile::default());

        let custom = CustomerProfile::new("corp.test", EmailFormat::FirstDotLast);
        write_json_atomic(&layout.customer_profile_path(), &custom).unwrap();
        assert_eq!(load_customer_profile(&layout).unwrap(), custom);
    }
}
