//! On-disk layout of the data directory
//!
//! ```text
//! <data>/
//!   Drafts/<id>_draft.json
//!   draft-index.json
//!   record-index.json
//!   settings.json
//!   customer-profile.json
//!   requestor.json
//! ```

use crate::error::{StoreError, StoreResult};
use onboard_record::RecordId;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix shared by every draft file name
pub const DRAFT_FILE_SUFFIX: &str = "_draft.json";

const DRAFTS_DIR: &str = "Drafts";
const DRAFT_INDEX_FILE: &str = "draft-index.json";
const RECORD_INDEX_FILE: &str = "record-index.json";
const SETTINGS_FILE: &str = "settings.json";
const CUSTOMER_PROFILE_FILE: &str = "customer-profile.json";
const REQUESTOR_FILE: &str = "requestor.json";

/// Resolves every well-known path under one data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding draft files
    #[must_use]
    pub fn drafts_dir(&self) -> PathBuf {
        self.root.join(DRAFTS_DIR)
    }

    /// Draft file for `id`
    #[must_use]
    pub fn draft_path(&self, id: RecordId) -> PathBuf {
        self.drafts_dir().join(draft_file_name(id))
    }

    /// Draft index document
    #[must_use]
    pub fn draft_index_path(&self) -> PathBuf {
        self.root.join(DRAFT_INDEX_FILE)
    }

    /// Finalized record index document
    #[must_use]
    pub fn record_index_path(&self) -> PathBuf {
        self.root.join(RECORD_INDEX_FILE)
    }

    /// Application settings
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Customer naming profile
    #[must_use]
    pub fn customer_profile_path(&self) -> PathBuf {
        self.root.join(CUSTOMER_PROFILE_FILE)
    }

    /// Saved requestor profile
    #[must_use]
    pub fn requestor_path(&self) -> PathBuf {
        self.root.join(REQUESTOR_FILE)
    }

    /// Create the root and drafts directories if missing
    pub fn ensure_dirs(&self) -> StoreResult<()> {
        let drafts = self.drafts_dir();
        fs::create_dir_all(&drafts).map_err(|e| StoreError::io(drafts, e))
    }
}

/// `<id>_draft.json`
#[must_use]
pub fn draft_file_name(id: RecordId) -> String {
    format!("{id}{DRAFT_FILE_SUFFIX}")
}

/// True when `path` has a draft-shaped file name
#[must_use]
pub fn is_draft_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > DRAFT_FILE_SUFFIX.len() && n.ends_with(DRAFT_FILE_SUFFIX))
}

/// Make a name fragment safe for use in a file name
///
/// Drops characters that are invalid on common filesystems, trims, and turns
/// inner whitespace into `_`. An empty result becomes `Unknown`.
#[must_use]
pub fn make_safe(input: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let kept: String = input
        .chars()
        .filter(|c| !c.is_control() && !INVALID.contains(c))
        .collect();
    let safe = kept
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    if safe.is_empty() {
        "Unknown".to_string()
    } else {
        safe
    }
}

/// Write `value` as pretty JSON, replacing `path` atomically
///
/// The content goes to a temp file in the same directory which is then
/// renamed over the target, so readers see either the old or the new file.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".tmp-")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(|e| StoreError::io(dir, e))?;

    serde_json::to_writer_pretty(tmp.as_file_mut(), value).map_err(|e| StoreError::json(path, e))?;
    tmp.as_file_mut()
        .flush()
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io(path, e))?;

    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

/// Read JSON from `path`; `Ok(None)` when the file does not exist
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::json(path, e))
}

/// Remove a file, treating "already gone" as success
pub(crate) fn remove_if_exists(path: &Path) -> StoreResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn paths_hang_off_the_root() {
        let layout = DataLayout::new("/data");
        let id: RecordId = "6f1c1b0e-4a8e-4d6e-9a63-1f2d3c4b5a69".parse().unwrap();

        assert_eq!(layout.drafts_dir(), PathBuf::from("/data/Drafts"));
        assert_eq!(
            layout.draft_path(id),
            PathBuf::from("/data/Drafts/6f1c1b0e-4a8e-4d6e-9a63-1f2d3c4b5a69_draft.json")
        );
        assert_eq!(layout.draft_index_path(), PathBuf::from("/data/draft-index.json"));
        assert_eq!(layout.record_index_path(), PathBuf::from("/data/record-index.json"));
    }

    #[test]
    fn draft_file_detection() {
        assert!(is_draft_file(Path::new("x/abc_draft.json")));
        assert!(!is_draft_file(Path::new("x/_draft.json")));
        assert!(!is_draft_file(Path::new("x/abc.json")));
        assert!(!is_draft_file(Path::new("x/draft-index.json")));
    }

    #[test]
    fn make_safe_examples() {
        assert_eq!(make_safe("Smith"), "Smith");
        assert_eq!(make_safe("  Van der Berg "), "Van_der_Berg");
        assert_eq!(make_safe("O'Neil/Jr?"), "O'NeilJr");
        assert_eq!(make_safe("   "), "Unknown");
        assert_eq!(make_safe("***"), "Unknown");
    }

    #[test]
    fn atomic_write_replaces_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("value.json");

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_json_atomic(&path, &vec![4]).unwrap();

        let back: Option<Vec<i32>> = read_json(&path).unwrap();
        assert_eq!(back, Some(vec![4]));

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn read_json_distinguishes_missing_from_corrupt() {
        let dir = TempDir::new().unwrap();
        let missing: Option<Vec<i32>> = read_json(&dir.path().join("none.json")).unwrap();
        assert!(missing.is_none());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        let err = read_json::<Vec<i32>>(&bad).unwrap_err();
        assert!(err.is_format());
    }

    proptest! {
        #[test]
        fn make_safe_output_is_file_name_friendly(input in ".{0,40}") {
            let safe = make_safe(&input);
            prop_assert!(!safe.is_empty());
            prop_assert!(!safe.chars().any(char::is_whitespace));
            prop_assert!(!safe.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']));
        }
    }
}
