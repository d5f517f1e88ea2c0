//! Error types for the loader.

use std::path::{Path, PathBuf};

use modpack_archive::ArchiveError;
use thiserror::Error;

use crate::capability::CapabilityKind;

/// Construction of a [`ModuleLoader`](crate::ModuleLoader) failed; the
/// archive is not a usable module package.
#[derive(Debug, Error)]
pub enum InvalidModuleError {
    /// The archive could not be opened or enumerated.
    #[error("not a valid module package: {}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// Every entry was processed and none satisfies the module contract.
    #[error(
        "not a valid module package: {}: no module implementation found for contract `{contract}`",
        .path.display()
    )]
    NoModuleFound { path: PathBuf, contract: String },
}

impl InvalidModuleError {
    /// The archive path this error refers to.
    pub fn path(&self) -> &Path {
        match self {
            InvalidModuleError::Archive { path, .. }
            | InvalidModuleError::NoModuleFound { path, .. } => path,
        }
    }

    /// The underlying archive error, when the archive itself was unreadable.
    pub fn archive_error(&self) -> Option<&ArchiveError> {
        match self {
            InvalidModuleError::Archive { source, .. } => Some(source),
            InvalidModuleError::NoModuleFound { .. } => None,
        }
    }
}

/// Why a single entry produced no resolved type.
///
/// Failures are recorded per entry and never abort loading the rest of
/// the archive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    /// The bytecode is not a valid unit.
    #[error("malformed unit `{name}`: {reason}")]
    Malformed { name: String, reason: String },

    /// An import names something neither this namespace nor the parent
    /// environment can supply.
    #[error("unit `{name}` cannot resolve import `{module}::{item}`: {issue}")]
    UnresolvedDependency {
        name: String,
        module: String,
        item: String,
        issue: DependencyIssue,
    },
}

impl ResolutionFailure {
    /// The qualified name of the entry that failed.
    pub fn name(&self) -> &str {
        match self {
            ResolutionFailure::Malformed { name, .. }
            | ResolutionFailure::UnresolvedDependency { name, .. } => name,
        }
    }
}

/// The specific reason an import could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyIssue {
    #[error("not provided by this archive or the parent environment")]
    Missing,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: CapabilityKind,
        found: CapabilityKind,
    },

    #[error("circular import")]
    Circular,

    #[error("the providing unit failed to resolve")]
    DependencyFailed,
}

/// Result type alias for loader construction.
pub type Result<T> = std::result::Result<T, InvalidModuleError>;
