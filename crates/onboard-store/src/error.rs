//! Error types for draft storage
//!
//! Three kinds of failure reach callers:
//! - Not found: a draft or archive is absent (recoverable, shown to the user)
//! - Format: content exists but cannot be understood
//! - Io: the disk refused a read or write (never swallowed)

use std::path::{Path, PathBuf};

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Draft, archive or index target is absent
    #[error("{what} not found: {}", path.display())]
    NotFound {
        /// What was being looked up
        what: &'static str,
        /// Where it was expected
        path: PathBuf,
    },

    /// Corrupt or unrecognized serialized content
    #[error("invalid format in {}: {message}", path.display())]
    Format {
        /// Offending file
        path: PathBuf,
        /// Parser diagnostic
        message: String,
    },

    /// Filesystem failure
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Create not-found error
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }

    /// Create format error
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map a JSON error, keeping IO failures distinct from bad content
    pub(crate) fn json(path: &Path, err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::io(path, err.into())
        } else {
            Self::format(path, err.to_string())
        }
    }

    /// Map an archive error, keeping IO failures distinct from bad content
    pub(crate) fn archive(path: &Path, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => Self::io(path, source),
            other => Self::format(path, other.to_string()),
        }
    }

    /// True for [`StoreError::NotFound`]
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`StoreError::Format`]
    #[inline]
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_path() {
        let err = StoreError::not_found("draft", "/tmp/x_draft.json");
        assert!(err.to_string().contains("draft not found"));
        assert!(err.to_string().contains("x_draft.json"));
        assert!(err.is_not_found());
        assert!(!err.is_format());
    }

    #[test]
    fn json_syntax_errors_are_format_errors() {
        let parse = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err = StoreError::json(Path::new("a.json"), parse);
        assert!(err.is_format());
    }

    #[test]
    fn zip_io_errors_stay_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::archive(Path::new("a.zip"), zip::result::ZipError::Io(io));
        assert!(matches!(err, StoreError::Io { .. }));

        let bad = StoreError::archive(
            Path::new("a.zip"),
            zip::result::ZipError::InvalidArchive("bad"),
        );
        assert!(bad.is_format());
    }
}
