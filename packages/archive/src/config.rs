//! Reader configuration.

use serde::Deserialize;

/// Default upper bound on a single extracted entry (64 MiB).
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// Configuration for [`ArchiveReader`](crate::ArchiveReader).
///
/// Every field has a default, so a host can deserialize a partial table
/// from its own configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Suffix that marks an entry as executable code.
    pub code_suffix: String,

    /// Separator used between path components inside the archive.
    pub path_separator: char,

    /// Separator used between components of a qualified name.
    pub namespace_separator: char,

    /// Largest entry, in uncompressed bytes, the reader will extract.
    pub max_entry_bytes: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            code_suffix: ".wasm".to_string(),
            path_separator: '/',
            namespace_separator: '.',
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }
}
