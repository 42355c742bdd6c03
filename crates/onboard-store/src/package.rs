//! Portable Package
//!
//! A draft travels between machines as a zip archive holding exactly one
//! entry, `<id>_draft.json`. Archives are named
//! `Onboarding_Draft_<Last>_<First>_<yyyyMMdd>.zip`; a name that is already
//! taken gets a `_1`, `_2`, ... suffix.
//!
//! Importing never reuses the packaged identity: the record is reborn as a
//! fresh draft with a new id, so importing the same archive twice yields two
//! independent drafts.

use crate::draft::DraftStore;
use crate::error::{StoreError, StoreResult};
use crate::layout::{draft_file_name, is_draft_file, make_safe, remove_if_exists};
use chrono::{Local, NaiveDate};
use onboard_record::{Record, RecordId};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

/// File name prefix of exported archives
pub const PACKAGE_PREFIX: &str = "Onboarding_Draft";

/// Archive file extension
pub const PACKAGE_EXTENSION: &str = "zip";

const STAGING_PREFIX: &str = "onboard-import-";

/// File name for a package of `record` dated `date`
///
/// `attempt` 0 is the plain name; later attempts add a `_<n>` suffix.
#[must_use]
pub fn package_file_name(record: &Record, date: NaiveDate, attempt: u32) -> String {
    let last = make_safe(&record.employee.last_name);
    let first = make_safe(&record.employee.first_name);
    let stem = format!("{PACKAGE_PREFIX}_{last}_{first}_{}", date.format("%Y%m%d"));
    if attempt == 0 {
        format!("{stem}.{PACKAGE_EXTENSION}")
    } else {
        format!("{stem}_{attempt}.{PACKAGE_EXTENSION}")
    }
}

impl DraftStore {
    /// Package draft `id` into `destination_dir`
    ///
    /// Returns the path of the new archive. Existing files are never
    /// overwritten.
    pub fn export_package(&self, id: RecordId, destination_dir: &Path) -> StoreResult<PathBuf> {
        let source = self.draft_path(id);
        let record = self
            .load(id)?
            .ok_or_else(|| StoreError::not_found("draft", &source))?;
        let contents = fs::read(&source).map_err(|e| StoreError::io(&source, e))?;

        fs::create_dir_all(destination_dir).map_err(|e| StoreError::io(destination_dir, e))?;
        let today = Local::now().date_naive();
        let (path, file) = create_unique(destination_dir, |attempt| {
            package_file_name(&record, today, attempt)
        })?;

        if let Err(e) = write_archive(file, &draft_file_name(id), &contents) {
            if let Err(cleanup) = remove_if_exists(&path) {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove partial package");
            }
            return Err(StoreError::archive(&path, e));
        }

        tracing::info!(record_id = %id, path = %path.display(), "draft exported");
        Ok(path)
    }

    /// Import a packaged draft as a brand-new draft
    ///
    /// The archive is extracted into a temporary directory that is removed on
    /// every path. On failure no draft file and no index row are left behind.
    pub fn import_package(&self, archive_path: &Path) -> StoreResult<Record> {
        self.import_package_in(archive_path, &std::env::temp_dir())
    }

    /// [`DraftStore::import_package`] staging the extraction under
    /// `staging_parent`
    pub fn import_package_in(
        &self,
        archive_path: &Path,
        staging_parent: &Path,
    ) -> StoreResult<Record> {
        if !archive_path.is_file() {
            return Err(StoreError::not_found("archive", archive_path));
        }

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(staging_parent)
            .map_err(|e| StoreError::io(staging_parent, e))?;

        let file = File::open(archive_path).map_err(|e| StoreError::io(archive_path, e))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| StoreError::archive(archive_path, e))?;
        archive
            .extract(staging.path())
            .map_err(|e| StoreError::archive(archive_path, e))?;

        let draft_file = find_draft_file(staging.path())?
            .ok_or_else(|| StoreError::format(archive_path, "archive contains no draft file"))?;
        let packaged = self
            .load_from_path(&draft_file)?
            .ok_or_else(|| StoreError::format(archive_path, "draft entry vanished during import"))?;

        let original_id = packaged.id();
        let mut record = packaged.into_fresh_draft();
        self.save_new(&mut record, 0)?;

        tracing::info!(
            record_id = %record.id(),
            original_id = %original_id,
            archive = %archive_path.display(),
            "draft imported"
        );
        Ok(record)
    }
}

/// Create a file that did not exist before, trying names from `name_for`
fn create_unique(
    dir: &Path,
    name_for: impl Fn(u32) -> String,
) -> StoreResult<(PathBuf, File)> {
    for attempt in 0..u32::MAX {
        let path = dir.join(name_for(attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(StoreError::io(path, e)),
        }
    }
    Err(StoreError::io(
        dir,
        io::Error::new(io::ErrorKind::AlreadyExists, "no free package name"),
    ))
}

fn write_archive(file: File, entry_name: &str, contents: &[u8]) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options)?;
    zip.write_all(contents)?;
    let mut file = zip.finish()?;
    file.flush()?;
    Ok(())
}

/// First `*_draft.json` directly under `dir`, in name order
fn find_draft_file(dir: &Path) -> StoreResult<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| StoreError::io(dir, e))?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_draft_file(p))
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}
