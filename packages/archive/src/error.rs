//! Error types for the archive layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or enumerating a module package.
///
/// All of these are fatal for the archive: nothing is retried.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No file exists at the given path.
    #[error("archive not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but is not a well-formed archive, or an entry
    /// could not be decompressed.
    #[error("corrupt archive {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The file could not be opened for a reason other than absence.
    #[error("failed to read archive {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry exceeds the configured size limit.
    #[error(
        "entry `{entry}` in {} is larger than the {limit} byte limit",
        .path.display()
    )]
    EntryTooLarge {
        path: PathBuf,
        entry: String,
        limit: u64,
    },
}

impl ArchiveError {
    /// The archive path this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ArchiveError::NotFound { path }
            | ArchiveError::Corrupt { path, .. }
            | ArchiveError::Io { path, .. }
            | ArchiveError::EntryTooLarge { path, .. } => path,
        }
    }
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
